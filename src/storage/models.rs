use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A live short link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: Uuid,
    pub code: String,
    pub destination: String,
    pub access_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Current time at microsecond precision, the finest every SQL backend keeps.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

impl LinkRecord {
    /// A fresh record: new id, zero clicks, `updated_at == created_at`.
    pub fn new(code: impl Into<String>, destination: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            destination: destination.into(),
            access_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}
