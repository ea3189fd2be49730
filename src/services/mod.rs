//! Service layer for business logic
//!
//! Shared by the HTTP handlers; storage details stay behind `LinkStore`.

mod link_service;

pub use link_service::*;
