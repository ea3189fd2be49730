use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::api::services::AppStartTime;
use crate::config::AppConfig;
use crate::services::LinkService;
use crate::storage::StorageFactory;

pub struct StartupContext {
    pub link_service: LinkService,
    pub app_start_time: AppStartTime,
}

/// 准备服务器启动的上下文
/// 包括存储后端（含数据库迁移）和链接服务
pub async fn prepare_server_startup(config: &AppConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let store = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", store.backend_name());

    let link_service = LinkService::from_config(store, &config.codes);
    info!(
        "Short codes: length {}, at most {} attempts per create",
        config.codes.length, config.codes.max_attempts
    );

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        link_service,
        app_start_time: AppStartTime::now(),
    })
}
