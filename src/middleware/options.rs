use std::sync::Arc;

use crate::security::{ProviderMap, SecurityProvider};

/// Content type used for rejection bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorContentType {
    #[default]
    Plain,
    Json,
    Xml,
}

impl ErrorContentType {
    pub fn mime(self) -> &'static str {
        match self {
            ErrorContentType::Plain => "text/plain",
            ErrorContentType::Json => "application/json",
            ErrorContentType::Xml => "application/xml",
        }
    }
}

/// Tuning knobs for [`RequestValidator`](super::RequestValidator).
#[derive(Default)]
pub struct ValidationOptions {
    /// Collect every violation into one aggregate report instead of
    /// rejecting on the first.
    pub multi_error: bool,
    /// Skip request body conformance checks.
    pub exclude_request_body: bool,
    /// Skip response body conformance checks.
    pub exclude_response_body: bool,
    /// Content type for rejection bodies.
    pub error_content_type: ErrorContentType,
    /// Authentication providers keyed by security scheme name.
    pub providers: ProviderMap,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn multi_error(mut self, enabled: bool) -> Self {
        self.multi_error = enabled;
        self
    }

    pub fn exclude_request_body(mut self) -> Self {
        self.exclude_request_body = true;
        self
    }

    pub fn exclude_response_body(mut self) -> Self {
        self.exclude_response_body = true;
        self
    }

    pub fn error_content_type(mut self, content_type: ErrorContentType) -> Self {
        self.error_content_type = content_type;
        self
    }

    /// Register an authentication provider for the named security scheme.
    pub fn provider(mut self, scheme_name: &str, provider: Arc<dyn SecurityProvider>) -> Self {
        self.providers.insert(scheme_name.to_string(), provider);
        self
    }
}
