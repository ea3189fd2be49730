//! Mode routing
//!
//! `serve` runs the HTTP server; `generate-config` writes a sample
//! configuration file. No subcommand means `serve`.

pub mod server;

pub use server::run_server;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::AppConfig;

/// Print the sample configuration, or write it when `output` is given
pub fn generate_config(output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            AppConfig::default()
                .save_to_file(path)
                .with_context(|| format!("Failed to write sample config to {}", path))?;
            info!("Sample configuration written to {}", path);
        }
        None => {
            println!("{}", AppConfig::generate_sample_config());
        }
    }
    Ok(())
}
