//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for snaplink using clap's derive macros.

use clap::{Parser, Subcommand};

/// Snaplink - a short-link service
#[derive(Parser, Debug)]
#[command(name = "snaplink")]
#[command(version)]
#[command(about = "A short-link service with lossless click counting", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to config.toml in the working directory)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Print a sample configuration file
    GenerateConfig {
        /// Write to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_serve() {
        let cli = Cli::parse_from(["snaplink"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_config_flag_and_generate_config() {
        let cli = Cli::parse_from([
            "snaplink",
            "-c",
            "custom.toml",
            "generate-config",
            "--output",
            "out.toml",
        ]);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        assert_eq!(
            cli.command,
            Some(Commands::GenerateConfig {
                output: Some("out.toml".to_string())
            })
        );
    }

    #[test]
    fn test_serve_subcommand() {
        let cli = Cli::parse_from(["snaplink", "serve", "--config", "a.toml"]);
        assert_eq!(cli.command, Some(Commands::Serve));
        assert_eq!(cli.config.as_deref(), Some("a.toml"));
    }
}
