//! Route resolution: maps an incoming method + path to a spec operation.

mod core;

pub use core::{RouteError, RouteMatch, Router};
