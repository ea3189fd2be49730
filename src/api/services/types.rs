//! Request and response bodies of the JSON API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::LinkRecord;

/// Body of create and update requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

/// Record shape returned by every link endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub url: String,
    pub short_code: String,
    pub access_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LinkRecord> for LinkResponse {
    fn from(record: LinkRecord) -> Self {
        Self {
            id: record.id,
            url: record.destination,
            short_code: record.code,
            access_count: record.access_count,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// 健康检查响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub links_count: Option<u64>,
    pub uptime_secs: u64,
}
