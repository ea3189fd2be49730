use actix_web::http::StatusCode;
use actix_web::{Responder, web};
use std::time::Duration;
use tracing::{error, trace};

use crate::services::LinkService;

use super::helpers::json_response;
use super::types::HealthResponse;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

/// Health Service
///
/// 只查 count，不加载全表；存储 5 秒内无响应即视为不可用
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        service: web::Data<LinkService>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        trace!("Received health check request");
        let store = service.store();

        let links_count = match tokio::time::timeout(Duration::from_secs(5), store.count()).await
        {
            Ok(Ok(count)) => {
                trace!("Storage health check passed, {} links found", count);
                Some(count)
            }
            Ok(Err(e)) => {
                error!("Storage health check failed: {}", e);
                None
            }
            Err(_) => {
                error!("Storage health check timeout");
                None
            }
        };

        let uptime_secs = (chrono::Utc::now() - app_start_time.start_datetime)
            .num_seconds()
            .max(0) as u64;

        let (status, label) = match links_count {
            Some(_) => (StatusCode::OK, "healthy"),
            None => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
        };

        json_response(
            status,
            &HealthResponse {
                status: label.to_string(),
                storage: store.backend_name().to_string(),
                links_count,
                uptime_secs,
            },
        )
    }
}

pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
}
