//! API 帮助函数

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::{debug, error};

use crate::errors::SnaplinkError;

use super::types::ErrorResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(status: StatusCode, data: &T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(data)
}

/// 构建错误响应，body 固定为 `{"detail": ...}`
pub fn error_response(status: StatusCode, detail: impl Into<String>) -> HttpResponse {
    json_response(
        status,
        &ErrorResponse {
            detail: detail.into(),
        },
    )
}

/// 从 SnaplinkError 构建错误响应（自动映射 HTTP 状态码）
pub fn error_from_snaplink(err: &SnaplinkError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        error!("API error {}: {}", err.code(), err.format_simple());
    } else {
        debug!("API rejection {}: {}", err.code(), err.format_simple());
    }
    error_response(status, err.message())
}

/// JSON body extractor config: malformed bodies become 400 with the error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| {
            let response = error_from_snaplink(&SnaplinkError::validation(format!(
                "Invalid request body: {}",
                err
            )));
            actix_web::error::InternalError::from_response(err, response).into()
        })
}
