mod common;

use std::sync::Arc;

use http::Method;
use oasgate::middleware::{ErrorContentType, Middleware, RequestValidator, ValidationOptions};
use oasgate::security::ApiKeyProvider;
use oasgate::Request;
use tracing_util::TestTracing;

fn validator_with(options: ValidationOptions) -> RequestValidator {
    let (routes, schemes) = common::petstore_spec();
    let options = options.provider("apiKeyAuth", Arc::new(ApiKeyProvider::new("k-123")));
    RequestValidator::with_options(routes, schemes, options).expect("validator builds")
}

fn validator() -> RequestValidator {
    validator_with(ValidationOptions::new())
}

#[test]
fn test_conforming_request_passes_through() {
    let _tracing = TestTracing::init();
    let v = validator();
    let req = Request::new(Method::GET, "/pets?limit=5");
    assert!(v.before(&req).is_none());
}

#[test]
fn test_unmatched_route_gets_400() {
    let _tracing = TestTracing::init();
    let v = validator();
    let req = Request::new(Method::GET, "/unknown");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 400);
    assert_eq!(
        res.body,
        "no matching operation was found for GET /unknown\n"
    );
    assert_eq!(
        res.get_header("Content-Type"),
        Some("text/plain; charset=utf-8")
    );
    assert_eq!(res.get_header("X-Content-Type-Options"), Some("nosniff"));
}

#[test]
fn test_bad_path_param_gets_400_first_line_only() {
    let v = validator();
    let req = Request::new(Method::GET, "/pets/not-a-number");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 400);
    assert!(
        res.body.starts_with("parameter \"id\" in path:"),
        "body: {}",
        res.body
    );
    // Only the first line of the violation plus the trailing newline.
    assert_eq!(res.body.matches('\n').count(), 1);
    assert!(res.body.ends_with('\n'));
}

#[test]
fn test_bad_query_param_gets_400() {
    let v = validator();
    let req = Request::new(Method::GET, "/pets?limit=zero");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 400);
    assert!(res.body.starts_with("parameter \"limit\" in query:"));
}

#[test]
fn test_query_param_minimum_enforced() {
    let v = validator();
    let req = Request::new(Method::GET, "/pets?limit=0");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 400);
}

#[test]
fn test_exploded_array_query_param_accepted() {
    let v = validator();
    // Form-style arrays explode by default: one item per key occurrence.
    let req = Request::new(Method::GET, "/pets?tags=dog&tags=cat");
    assert!(v.before(&req).is_none());
}

#[test]
fn test_exploded_array_query_param_min_items_enforced() {
    let v = validator();
    let req = Request::new(Method::GET, "/pets?tags=dog");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 400);
    assert!(res.body.starts_with("parameter \"tags\" in query:"));
}

#[test]
fn test_missing_required_header_gets_400() {
    let v = validator();
    let req = Request::new(Method::GET, "/admin/stats").with_header("X-API-Key", "k-123");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 400);
    assert_eq!(
        res.body,
        "parameter \"X-Trace-Id\" in header is required but missing\n"
    );
}

#[test]
fn test_missing_required_body_gets_400() {
    let v = validator_with(ValidationOptions::new().provider(
        "bearerAuth",
        Arc::new(oasgate::security::BearerProvider::new("tok")),
    ));
    let req = Request::new(Method::POST, "/pets").with_header("Authorization", "Bearer tok");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 400);
    assert_eq!(res.body, "request body is required but missing\n");
}

#[test]
fn test_body_schema_violation_gets_400() {
    let v = validator_with(
        ValidationOptions::new().provider(
            "bearerAuth",
            Arc::new(oasgate::security::BearerProvider::new("tok")),
        ),
    );
    let req = Request::new(Method::POST, "/pets")
        .with_header("Authorization", "Bearer tok")
        .with_body(serde_json::json!({"tag": "small"}));
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 400);
    assert!(res.body.starts_with("request body:"), "body: {}", res.body);
}

#[test]
fn test_exclude_request_body_skips_body_checks() {
    let v = validator_with(
        ValidationOptions::new()
            .exclude_request_body()
            .provider(
                "bearerAuth",
                Arc::new(oasgate::security::BearerProvider::new("tok")),
            ),
    );
    let req = Request::new(Method::POST, "/pets").with_header("Authorization", "Bearer tok");
    assert!(v.before(&req).is_none());
}

#[test]
fn test_json_error_body_is_encoded_string() {
    let v = validator_with(ValidationOptions::new().error_content_type(ErrorContentType::Json));
    let req = Request::new(Method::GET, "/unknown");
    let res = v.before(&req).expect("rejected");
    assert_eq!(
        res.get_header("Content-Type"),
        Some("application/json; charset=utf-8")
    );
    assert_eq!(
        res.body,
        "\"no matching operation was found for GET /unknown\"\n"
    );
    // The body parses back to the plain message.
    let decoded: String = serde_json::from_str(res.body.trim_end()).unwrap();
    assert_eq!(decoded, "no matching operation was found for GET /unknown");
}

#[test]
fn test_xml_error_body_is_encoded_string() {
    let v = validator_with(ValidationOptions::new().error_content_type(ErrorContentType::Xml));
    let req = Request::new(Method::GET, "/unknown");
    let res = v.before(&req).expect("rejected");
    assert_eq!(
        res.get_header("Content-Type"),
        Some("application/xml; charset=utf-8")
    );
    assert_eq!(
        res.body,
        "<string>no matching operation was found for GET /unknown</string>\n"
    );
}

#[test]
fn test_multi_error_mode_aggregates_to_500() {
    let v = validator_with(ValidationOptions::new().multi_error(true));
    // Wrong type for id; adminStats would also report its missing header,
    // but this route has a single violation.
    let req = Request::new(Method::GET, "/pets/not-a-number");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 500);
    assert!(
        res.body.starts_with("error validating route:"),
        "body: {}",
        res.body
    );
}

#[test]
fn test_multi_error_mode_joins_all_violations() {
    let v = validator_with(ValidationOptions::new().multi_error(true));
    // Missing credential AND missing required header: both show up.
    let req = Request::new(Method::GET, "/admin/stats");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 500);
    assert!(res.body.contains("security requirements failed"));
    assert!(res.body.contains("X-Trace-Id"));
    assert!(res.body.contains(" | "));
}

#[test]
fn test_multi_error_mode_route_not_found_still_400() {
    let v = validator_with(ValidationOptions::new().multi_error(true));
    let req = Request::new(Method::GET, "/unknown");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 400);
}

#[test]
fn test_chain_short_circuits_on_rejection() {
    use oasgate::middleware::{run_chain, TracingMiddleware};

    let chain: Vec<Arc<dyn oasgate::middleware::Middleware>> =
        vec![Arc::new(TracingMiddleware), Arc::new(validator())];
    let req = Request::new(Method::GET, "/unknown");
    let res = run_chain(&chain, &req, |_| panic!("handler must not run"));
    assert_eq!(res.status, 400);

    let ok_req = Request::new(Method::GET, "/pets/7");
    let res = run_chain(&chain, &ok_req, |_| oasgate::Response::new(200));
    assert_eq!(res.status, 200);
}

#[test]
fn test_multi_error_mode_conforming_request_passes() {
    let v = validator_with(ValidationOptions::new().multi_error(true));
    let req = Request::new(Method::GET, "/pets/7");
    assert!(v.before(&req).is_none());
}
