mod core;
mod options;
mod tracing;
mod validation;

pub use core::{run_chain, Middleware};
pub use options::{ErrorContentType, ValidationOptions};
pub use validation::RequestValidator;

pub use self::tracing::TracingMiddleware;
