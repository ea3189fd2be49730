use anyhow::{Context, Result};
use clap::Parser;

use snaplink::cli::{Cli, Commands};
use snaplink::config::{get_config, init_config};
use snaplink::runtime::modes;
use snaplink::system::logging::init_logging;

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::GenerateConfig { output }) => modes::generate_config(output.as_deref()),
        Some(Commands::Serve) | None => {
            init_config(cli.config.as_deref()).context("Failed to load configuration")?;
            let config = get_config();

            // guard 必须活到进程结束，否则日志可能丢失
            let _log_guard =
                init_logging(&config.logging).context("Failed to initialize logging")?;

            modes::run_server(&config).await
        }
    }
}
