mod common;

use std::sync::Arc;

use http::Method;
use oasgate::middleware::{Middleware, RequestValidator, ValidationOptions};
use oasgate::security::{ApiKeyProvider, BearerProvider};
use oasgate::Request;
use tracing_util::TestTracing;

fn validator() -> RequestValidator {
    let (routes, schemes) = common::petstore_spec();
    let options = ValidationOptions::new()
        .provider("apiKeyAuth", Arc::new(ApiKeyProvider::new("k-123")))
        .provider("bearerAuth", Arc::new(BearerProvider::new("tok-456")));
    RequestValidator::with_options(routes, schemes, options).expect("validator builds")
}

#[test]
fn test_unsecured_operation_needs_no_credentials() {
    let _tracing = TestTracing::init();
    let v = validator();
    let req = Request::new(Method::GET, "/pets/7");
    assert!(v.before(&req).is_none());
}

#[test]
fn test_missing_api_key_gets_401() {
    let _tracing = TestTracing::init();
    let v = validator();
    let req = Request::new(Method::DELETE, "/pets/7");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 401);
    assert!(res.body.starts_with("security requirements failed:"));
    assert!(res.body.ends_with('\n'));
}

#[test]
fn test_valid_api_key_passes() {
    let v = validator();
    let req = Request::new(Method::DELETE, "/pets/7").with_header("X-API-Key", "k-123");
    assert!(v.before(&req).is_none());
}

#[test]
fn test_wrong_api_key_gets_401() {
    let v = validator();
    let req = Request::new(Method::DELETE, "/pets/7").with_header("X-API-Key", "wrong");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 401);
}

#[test]
fn test_bearer_token_passes() {
    let v = validator();
    let req = Request::new(Method::POST, "/pets")
        .with_header("Authorization", "Bearer tok-456")
        .with_body(serde_json::json!({"name": "rex"}));
    assert!(v.before(&req).is_none());
}

#[test]
fn test_alternative_requirements_accept_either_scheme() {
    let v = validator();
    // adminStats accepts apiKeyAuth OR bearerAuth.
    let with_key = Request::new(Method::GET, "/admin/stats")
        .with_header("X-API-Key", "k-123")
        .with_header("X-Trace-Id", "t-1");
    assert!(v.before(&with_key).is_none());

    let with_token = Request::new(Method::GET, "/admin/stats")
        .with_header("Authorization", "Bearer tok-456")
        .with_header("X-Trace-Id", "t-1");
    assert!(v.before(&with_token).is_none());

    let with_neither =
        Request::new(Method::GET, "/admin/stats").with_header("X-Trace-Id", "t-1");
    let res = v.before(&with_neither).expect("rejected");
    assert_eq!(res.status, 401);
}

#[test]
fn test_security_checked_before_conformance() {
    let v = validator();
    // The id parameter is malformed too, but the missing credential wins.
    let req = Request::new(Method::DELETE, "/pets/not-a-number");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 401);
}

#[test]
fn test_no_provider_registered_gets_401() {
    let (routes, schemes) = common::petstore_spec();
    let v = RequestValidator::new(routes, schemes).expect("validator builds");
    let req = Request::new(Method::DELETE, "/pets/7").with_header("X-API-Key", "k-123");
    let res = v.before(&req).expect("rejected");
    assert_eq!(res.status, 401);
    assert!(res.body.contains("apiKeyAuth"));
}
