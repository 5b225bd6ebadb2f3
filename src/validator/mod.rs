//! Request conformance checking against the matched operation.
//!
//! Parameters are decoded from their raw wire form, then every declared
//! constraint (presence, type, schema) is checked with precompiled
//! validators. The fail-fast entry point stops at the first violation;
//! multi-error hosts collect everything via [`collect_violations`].

mod cache;
mod params;

pub use cache::ValidatorCache;
pub use params::{decode_exploded_values, decode_param_value};

use crate::error::ValidationFailure;
use crate::request::Request;
use crate::router::RouteMatch;
use crate::spec::{ParameterLocation, ParameterMeta, ParameterStyle};
use tracing::debug;

/// One conformance violation: a single-line summary plus optional schema
/// detail lines. Only the summary ever reaches a client.
#[derive(Debug)]
struct Violation {
    summary: String,
    detail: Vec<String>,
}

impl Violation {
    fn new(summary: String) -> Self {
        Self {
            summary,
            detail: Vec::new(),
        }
    }

    fn message(&self) -> String {
        if self.detail.is_empty() {
            self.summary.clone()
        } else {
            let mut msg = self.summary.clone();
            for line in &self.detail {
                msg.push('\n');
                msg.push_str(line);
            }
            msg
        }
    }
}

fn lookup_raw<'a>(req: &'a Request, matched: &'a RouteMatch, param: &ParameterMeta) -> Option<&'a str> {
    match param.location {
        ParameterLocation::Path => matched.get_path_param(&param.name),
        ParameterLocation::Query => req.get_query_param(&param.name),
        ParameterLocation::Header => req.get_header(&param.name),
        ParameterLocation::Cookie => req.get_cookie(&param.name),
    }
}

/// Form-style array query parameters explode by default: `?tags=a&tags=b`
/// carries one item per key occurrence, so every occurrence must be read,
/// not just the last.
fn is_exploded_array_query(param: &ParameterMeta) -> bool {
    param.location == ParameterLocation::Query
        && param.explode != Some(false)
        && matches!(param.style, None | Some(ParameterStyle::Form))
        && param
            .schema
            .as_ref()
            .and_then(|s| s.get("type"))
            .and_then(|t| t.as_str())
            == Some("array")
}

/// Walk every declared constraint and collect violations in spec order:
/// parameters first, then the request body.
fn check(
    req: &Request,
    matched: &RouteMatch,
    exclude_request_body: bool,
    cache: &ValidatorCache,
) -> Result<Vec<Violation>, ValidationFailure> {
    let route = &matched.route;
    let mut violations = Vec::new();

    for param in &route.parameters {
        let decoded = if is_exploded_array_query(param) {
            let values = req.get_query_params_all(&param.name);
            if values.is_empty() {
                None
            } else {
                Some(decode_exploded_values(&values, param.schema.as_ref()))
            }
        } else {
            lookup_raw(req, matched, param)
                .map(|raw| decode_param_value(raw, param.schema.as_ref(), param.style))
        };

        let decoded = match decoded {
            Some(v) => v,
            None => {
                if param.required {
                    violations.push(Violation::new(format!(
                        "parameter \"{}\" in {} is required but missing",
                        param.name, param.location
                    )));
                }
                continue;
            }
        };

        let schema = match &param.schema {
            Some(s) => s,
            None => continue,
        };
        let key = ValidatorCache::param_key(route, &param.location.to_string(), &param.name);
        let validator = cache
            .get_or_compile(&key, schema)
            .map_err(|e| ValidationFailure::Aggregate(e.to_string()))?;

        let errors: Vec<String> = validator.iter_errors(&decoded).map(|e| e.to_string()).collect();
        if let Some((first, rest)) = errors.split_first() {
            debug!(
                parameter = %param.name,
                location = %param.location,
                error_count = errors.len(),
                "Parameter failed schema validation"
            );
            let mut v = Violation::new(format!(
                "parameter \"{}\" in {}: {}",
                param.name, param.location, first
            ));
            v.detail = rest.to_vec();
            violations.push(v);
        }
    }

    if !exclude_request_body {
        if route.request_body_required && req.body.is_none() {
            violations.push(Violation::new(
                "request body is required but missing".to_string(),
            ));
        }
        if let (Some(schema), Some(body)) = (&route.request_schema, &req.body) {
            let key = ValidatorCache::body_key(route);
            let validator = cache
                .get_or_compile(&key, schema)
                .map_err(|e| ValidationFailure::Aggregate(e.to_string()))?;
            let errors: Vec<String> = validator.iter_errors(body).map(|e| e.to_string()).collect();
            if let Some((first, rest)) = errors.split_first() {
                debug!(error_count = errors.len(), "Request body failed schema validation");
                let mut v = Violation::new(format!("request body: {first}"));
                v.detail = rest.to_vec();
                violations.push(v);
            }
        }
    }

    Ok(violations)
}

/// Fail-fast request validation: the first violation rejects the request.
pub fn validate_request(
    req: &Request,
    matched: &RouteMatch,
    exclude_request_body: bool,
    cache: &ValidatorCache,
) -> Result<(), ValidationFailure> {
    let violations = check(req, matched, exclude_request_body, cache)?;
    match violations.first() {
        Some(first) => Err(ValidationFailure::RequestConformanceFailed(first.message())),
        None => Ok(()),
    }
}

/// Collect every conformance violation as a one-line summary each.
///
/// Used in multi-error mode, where the middleware aggregates these together
/// with any security failure into a single report.
pub fn collect_violations(
    req: &Request,
    matched: &RouteMatch,
    exclude_request_body: bool,
    cache: &ValidatorCache,
) -> Result<Vec<String>, ValidationFailure> {
    let violations = check(req, matched, exclude_request_body, cache)?;
    Ok(violations.into_iter().map(|v| v.summary).collect())
}
