//! # oasgate
//!
//! **oasgate** validates HTTP requests against an [OpenAPI 3.0](https://spec.openapis.org/oas/v3.0.3)
//! document before they reach application handlers.
//!
//! ## Overview
//!
//! Given a loaded OpenAPI document, oasgate matches each incoming request to
//! an operation, enforces the operation's security requirements, and checks
//! the request's parameters and body for conformance with the declared
//! schemas. Non-conforming requests are rejected with an appropriate status
//! code and a configurable error body; conforming requests pass through
//! untouched.
//!
//! ## Architecture
//!
//! - **[`spec`]** - OpenAPI document parsing and route metadata extraction
//! - **[`router`]** - Path matching and route resolution using regex-based matchers
//! - **[`validator`]** - Parameter and body conformance checking with cached schema validators
//! - **[`security`]** - Security provider trait and built-in providers (API keys, bearer tokens)
//! - **[`middleware`]** - The [`RequestValidator`](middleware::RequestValidator) middleware and chain plumbing
//!
//! ## Example
//!
//! ```rust,no_run
//! use oasgate::middleware::{Middleware, RequestValidator, ValidationOptions};
//! use oasgate::request::Request;
//! use http::Method;
//!
//! # fn main() -> anyhow::Result<()> {
//! let validator = RequestValidator::from_file("openapi.yaml", ValidationOptions::new())?;
//!
//! let req = Request::new(Method::GET, "/pets/42");
//! match validator.before(&req) {
//!     None => { /* request conforms, hand off to the application */ }
//!     Some(rejection) => {
//!         println!("{} {}", rejection.status, rejection.body);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod middleware;
pub mod request;
pub mod response;
pub mod router;
pub mod security;
pub mod spec;
pub mod validator;

pub use error::ValidationFailure;
pub use middleware::{ErrorContentType, RequestValidator, ValidationOptions};
pub use request::Request;
pub use response::Response;
pub use router::{RouteError, RouteMatch, Router};
pub use security::{SecurityProvider, SecurityRequest};
