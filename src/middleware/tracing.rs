use std::time::Duration;

use tracing::info;

use super::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Logs one structured event per request with status and latency.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn after(&self, req: &Request, res: &mut Response, latency: Duration) {
        info!(
            method = %req.method,
            path = %req.path,
            status = res.status,
            latency_ms = latency.as_millis() as u64,
            "Request handled"
        );
    }
}
