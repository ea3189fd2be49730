use crate::storage::LinkRecord;
use migration::entities::short_link;

/// 将 Sea-ORM Model 转换为 LinkRecord
pub fn model_to_record(model: short_link::Model) -> LinkRecord {
    LinkRecord {
        id: model.id,
        code: model.short_code,
        destination: model.target_url,
        access_count: model.access_count.max(0) as u64,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// 将 LinkRecord 转换为 ActiveModel（仅用于插入）
pub fn record_to_active_model(record: &LinkRecord) -> short_link::ActiveModel {
    use sea_orm::ActiveValue::Set;

    short_link::ActiveModel {
        short_code: Set(record.code.clone()),
        id: Set(record.id),
        target_url: Set(record.destination.clone()),
        access_count: Set(record.access_count.min(i64::MAX as u64) as i64),
        created_at: Set(record.created_at),
        updated_at: Set(record.updated_at),
    }
}
