use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{ErrorContentType, Middleware, ValidationOptions};
use crate::error::ValidationFailure;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::security::{validate_security_requirements, SecurityRequest};
use crate::spec::{load_spec, RouteMeta, SecurityScheme};
use crate::validator::{collect_violations, validate_request, ValidatorCache};

/// Middleware that validates requests against an OpenAPI document.
///
/// Every incoming request is matched to an operation, checked against the
/// operation's security requirements, then checked for conformance
/// (parameters and request body). Requests that fail any stage are rejected
/// before the handler runs:
///
/// * no matching operation: `400`
/// * security requirements not satisfied: `401`
/// * parameter or body violations: `400` with the first violation's summary
/// * internal failures, or any failure in multi-error mode: `500`
pub struct RequestValidator {
    router: Router,
    security_schemes: HashMap<String, SecurityScheme>,
    cache: ValidatorCache,
    options: ValidationOptions,
}

impl RequestValidator {
    /// Build a validator with default options.
    pub fn new(
        routes: Vec<RouteMeta>,
        security_schemes: HashMap<String, SecurityScheme>,
    ) -> anyhow::Result<Self> {
        Self::with_options(routes, security_schemes, ValidationOptions::default())
    }

    /// Build a validator, precompiling every schema the routes declare.
    ///
    /// Fails if any route has a malformed path template or an uncompilable
    /// schema, so a misconfigured document is caught at startup rather than
    /// on the first request.
    pub fn with_options(
        routes: Vec<RouteMeta>,
        security_schemes: HashMap<String, SecurityScheme>,
        options: ValidationOptions,
    ) -> anyhow::Result<Self> {
        let cache = ValidatorCache::from_env();
        let compiled = cache.precompile(&routes)?;
        let router = Router::new(routes)?;
        info!(
            routes = router.len(),
            schemas = compiled,
            "Request validator initialized"
        );
        Ok(Self {
            router,
            security_schemes,
            cache,
            options,
        })
    }

    /// Load an OpenAPI document from disk and build a validator for it.
    pub fn from_file(path: &str, options: ValidationOptions) -> anyhow::Result<Self> {
        let (routes, security_schemes) = load_spec(path)?;
        Self::with_options(routes, security_schemes, options)
    }

    fn reject(&self, failure: &ValidationFailure) -> Response {
        let status = failure.status_code();
        warn!(status, error = %failure, "Rejecting request");
        let message = failure.client_message();
        let mut res = Response::new(status);
        res.set_header(
            "Content-Type",
            format!("{}; charset=utf-8", self.options.error_content_type.mime()),
        );
        res.set_header("X-Content-Type-Options", "nosniff");
        let mut body = match self.options.error_content_type {
            ErrorContentType::Plain => message,
            ErrorContentType::Json => Value::String(message).to_string(),
            ErrorContentType::Xml => format!("<string>{}</string>", xml_escape(&message)),
        };
        body.push('\n');
        res.body = body;
        res
    }
}

impl Middleware for RequestValidator {
    fn before(&self, req: &Request) -> Option<Response> {
        let matched = match self.router.find_route(&req.method, &req.path) {
            Ok(m) => m,
            Err(e) => {
                return Some(self.reject(&ValidationFailure::RouteNotFound(e.to_string())))
            }
        };
        debug!(operation = %matched.route.operation_key(), "Validating request");

        let sec = SecurityRequest::from_request(req);
        if self.options.multi_error {
            // Collect everything, security failures included, into one
            // aggregate report.
            let mut reports = Vec::new();
            if let Err(f) = validate_security_requirements(
                &matched.route.security,
                &self.security_schemes,
                &self.options.providers,
                &sec,
            ) {
                reports.push(f.to_string());
            }
            match collect_violations(req, &matched, self.options.exclude_request_body, &self.cache)
            {
                Ok(violations) => reports.extend(violations),
                Err(f) => return Some(self.reject(&f)),
            }
            if !reports.is_empty() {
                return Some(self.reject(&ValidationFailure::Aggregate(reports.join(" | "))));
            }
        } else {
            if let Err(f) = validate_security_requirements(
                &matched.route.security,
                &self.security_schemes,
                &self.options.providers,
                &sec,
            ) {
                return Some(self.reject(&f));
            }
            if let Err(f) =
                validate_request(req, &matched, self.options.exclude_request_body, &self.cache)
            {
                return Some(self.reject(&f));
            }
        }
        None
    }
}

/// Minimal XML text escaping, matching what an XML marshaller emits for a
/// string element.
fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(c),
        }
    }
    out
}
