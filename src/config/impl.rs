use std::sync::{Arc, OnceLock};

use super::AppConfig;
use crate::errors::Result;

static CONFIG: OnceLock<Arc<AppConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// The configuration is fixed for the life of the process; the returned
/// `Arc` is cheap to clone.
pub fn get_config() -> Arc<AppConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call init_config() first.")
        .clone()
}

/// Initialize the global configuration
///
/// Loads configuration from `path` (or "config.toml" in the current directory)
/// and the `SNAPLINK__*` environment. Calling it again after a successful
/// initialization keeps the first configuration.
pub fn init_config(path: Option<&str>) -> Result<()> {
    if CONFIG.get().is_some() {
        return Ok(());
    }
    let config = AppConfig::load(path)?;
    CONFIG.get_or_init(|| Arc::new(config));
    Ok(())
}

