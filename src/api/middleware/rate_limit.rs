//! Per-IP rate limiting for the redirect route

use std::time::Duration;

use actix_governor::{GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor};
use governor::middleware::NoOpMiddleware;
use tracing::debug;

use crate::errors::{Result, SnaplinkError};

/// Shared limiter state; clone it into every worker so they draw from one quota.
pub type RedirectRateLimit = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// 构建重定向限流配置，`per_minute == 0` 时返回 None（不限流）
///
/// 令牌按 `60s / per_minute` 匀速补充，突发最多 `per_minute` 次请求
/// 超限返回 HTTP 429 Too Many Requests
pub fn redirect_rate_limit(per_minute: u32) -> Result<Option<RedirectRateLimit>> {
    if per_minute == 0 {
        return Ok(None);
    }

    let period = Duration::from_millis((60_000 / u64::from(per_minute)).max(1));
    let config = GovernorConfigBuilder::default()
        .period(period)
        .burst_size(per_minute)
        .finish()
        .ok_or_else(|| {
            SnaplinkError::config(format!(
                "Invalid redirect rate limit: {} requests per minute",
                per_minute
            ))
        })?;

    debug!(
        "Redirect rate limiter created: {}/min per IP, refill every {:?}",
        per_minute, period
    );
    Ok(Some(config))
}
