//! Closed error taxonomy for request validation.
//!
//! Every way a request can be rejected is a variant here, and the HTTP
//! status mapping lives next to the variants so the compiler forces the
//! middleware to handle all of them.

use thiserror::Error;

/// Outcome of a failed request validation.
///
/// Conformance messages may span several lines (summary first, schema
/// detail after); [`ValidationFailure::client_message`] keeps only the
/// first line for the client, deliberately discarding the rest.
#[derive(Debug, Error)]
pub enum ValidationFailure {
    /// No operation in the specification matches the request path/method.
    #[error("{0}")]
    RouteNotFound(String),

    /// The request does not satisfy any of the operation's security
    /// requirements.
    #[error("security requirements failed: {0}")]
    SecurityRequirementFailed(String),

    /// A parameter, header, or body does not conform to its schema.
    #[error("{0}")]
    RequestConformanceFailed(String),

    /// Aggregate of every violation, produced in multi-error mode.
    #[error("error validating route: {0}")]
    Aggregate(String),
}

impl ValidationFailure {
    /// HTTP status code a rejection with this failure carries.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            ValidationFailure::RouteNotFound(_) => 400,
            ValidationFailure::SecurityRequirementFailed(_) => 401,
            ValidationFailure::RequestConformanceFailed(_) => 400,
            ValidationFailure::Aggregate(_) => 500,
        }
    }

    /// User-facing text for the rejection body.
    ///
    /// Conformance errors are truncated to their first line; the schema
    /// detail on the following lines is dropped.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            ValidationFailure::RequestConformanceFailed(msg) => {
                msg.lines().next().unwrap_or_default().to_string()
            }
            other => other.to_string(),
        }
    }
}
