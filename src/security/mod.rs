//! Authentication providers and security requirement enforcement.
//!
//! Providers implement the [`SecurityProvider`] trait for the schemes an
//! OpenAPI document declares under `components.securitySchemes`. A route is
//! authorized when at least one of its security requirements is satisfied;
//! every scheme named inside a single requirement must pass.

mod api_key;
mod bearer;

pub use api_key::ApiKeyProvider;
pub use bearer::BearerProvider;

use crate::error::ValidationFailure;
use crate::request::{HeaderVec, ParamVec, Request};
use crate::spec::{SecurityRequirement, SecurityScheme};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Credential sources extracted from an incoming request.
pub struct SecurityRequest<'a> {
    pub headers: &'a HeaderVec,
    pub query: &'a ParamVec,
    pub cookies: &'a HeaderVec,
}

impl<'a> SecurityRequest<'a> {
    pub fn from_request(req: &'a Request) -> Self {
        Self {
            headers: &req.headers,
            query: &req.query_params,
            cookies: &req.cookies,
        }
    }

    /// Case-insensitive header lookup.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Trait for validating a request against one security scheme.
///
/// Implementations receive the scheme definition from the document, the
/// scopes the operation demands, and the request's credential sources.
pub trait SecurityProvider: Send + Sync {
    /// Returns `true` if the request carries valid credentials for `scheme`.
    fn validate(&self, scheme: &SecurityScheme, scopes: &[String], req: &SecurityRequest) -> bool;
}

/// Registered providers keyed by scheme name.
pub type ProviderMap = HashMap<String, Arc<dyn SecurityProvider>>;

/// Enforce a route's security requirements.
///
/// Requirements are alternatives: the first one whose schemes all validate
/// authorizes the request. An empty requirement list passes trivially. A
/// scheme with no registered provider or no definition in the document fails
/// its requirement.
pub fn validate_security_requirements(
    requirements: &[SecurityRequirement],
    schemes: &HashMap<String, SecurityScheme>,
    providers: &ProviderMap,
    req: &SecurityRequest,
) -> Result<(), ValidationFailure> {
    if requirements.is_empty() {
        return Ok(());
    }

    let mut reasons = Vec::new();
    for requirement in requirements {
        let mut failure = None;
        for (scheme_name, scopes) in &requirement.0 {
            let scheme = match schemes.get(scheme_name) {
                Some(s) => s,
                None => {
                    failure = Some(format!("security scheme \"{scheme_name}\" is not defined"));
                    break;
                }
            };
            let provider = match providers.get(scheme_name) {
                Some(p) => p,
                None => {
                    failure = Some(format!(
                        "no authentication provider registered for scheme \"{scheme_name}\""
                    ));
                    break;
                }
            };
            if !provider.validate(scheme, scopes, req) {
                debug!(scheme = %scheme_name, "Authentication provider rejected request");
                failure = Some(format!("authentication failed for scheme \"{scheme_name}\""));
                break;
            }
        }
        match failure {
            None => return Ok(()),
            Some(reason) => reasons.push(reason),
        }
    }

    Err(ValidationFailure::SecurityRequirementFailed(
        reasons.join(" | "),
    ))
}
