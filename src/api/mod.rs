//! HTTP layer: route builders, handlers and middleware.

pub mod middleware;
pub mod services;
