use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::request::Request;
use crate::response::Response;

/// Hook points around request handling.
///
/// `before` may short-circuit the request by returning a response; `after`
/// observes the final response and the handling latency.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &Request) -> Option<Response> {
        None
    }
    fn after(&self, _req: &Request, _res: &mut Response, _latency: Duration) {}
}

/// Run a middleware chain around `handler`.
///
/// `before` hooks run in registration order; the first one that returns a
/// response stops the chain and the handler never runs. `after` hooks run in
/// reverse order on whichever response was produced.
pub fn run_chain(
    middlewares: &[Arc<dyn Middleware>],
    req: &Request,
    handler: impl FnOnce(&Request) -> Response,
) -> Response {
    let start = Instant::now();
    let mut short_circuit = None;
    let mut ran = 0;
    for mw in middlewares {
        ran += 1;
        if let Some(res) = mw.before(req) {
            short_circuit = Some(res);
            break;
        }
    }
    let mut res = match short_circuit {
        Some(res) => res,
        None => handler(req),
    };
    let latency = start.elapsed();
    for mw in middlewares[..ran].iter().rev() {
        mw.after(req, &mut res, latency);
    }
    res
}
