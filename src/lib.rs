//! Snaplink - a short-link service
//!
//! Maps long destination URLs to short random codes, redirects visitors and
//! counts every resolution without losing increments under concurrency.
//!
//! # Architecture
//! - `utils`: code generation and destination URL validation
//! - `storage`: the `LinkStore` trait with in-memory and SeaORM backends
//! - `services`: `LinkService`, the create/resolve/update/remove operations
//! - `api`: HTTP routes and middleware
//! - `config`: layered configuration (TOML + environment)
//! - `runtime`: server startup and execution modes
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
