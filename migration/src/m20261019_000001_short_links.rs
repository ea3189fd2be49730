use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DbBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 short_links 表
        let backend = manager.get_database_backend();
        manager.create_table(short_links_table(backend)).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_links_created_at")
                    .table(ShortLink::Table)
                    .col(ShortLink::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_short_links_created_at").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ShortLink::Table).to_owned())
            .await
    }
}

/// 时间戳列需要微秒精度；MySQL 的 `timestamp` 默认只保留到秒
fn timestamp_column(backend: DbBackend, column: ShortLink) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    match backend {
        DbBackend::MySql => def.custom(Alias::new("DATETIME(6)")),
        _ => def.timestamp_with_time_zone(),
    };
    def.not_null();
    def
}

fn short_links_table(backend: DbBackend) -> TableCreateStatement {
    Table::create()
        .table(ShortLink::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(ShortLink::ShortCode)
                .string_len(64)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(ShortLink::Id).uuid().not_null())
        .col(ColumnDef::new(ShortLink::TargetUrl).text().not_null())
        .col(
            ColumnDef::new(ShortLink::AccessCount)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(timestamp_column(backend, ShortLink::CreatedAt))
        .col(timestamp_column(backend, ShortLink::UpdatedAt))
        .to_owned()
}

#[derive(DeriveIden)]
enum ShortLink {
    #[sea_orm(iden = "short_links")]
    Table,
    ShortCode,
    Id,
    TargetUrl,
    AccessCount,
    CreatedAt,
    UpdatedAt,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_sql(backend: DbBackend) -> String {
        backend.build(&short_links_table(backend)).sql
    }

    #[test]
    fn test_mysql_timestamps_keep_microseconds() {
        let sql = create_sql(DbBackend::MySql);
        assert_eq!(sql.matches("DATETIME(6)").count(), 2, "{}", sql);
    }

    #[test]
    fn test_other_backends_use_timestamp_with_time_zone() {
        for backend in [DbBackend::Postgres, DbBackend::Sqlite] {
            let sql = create_sql(backend);
            assert!(!sql.contains("DATETIME(6)"), "{:?}: {}", backend, sql);
            assert!(sql.contains("created_at"), "{:?}: {}", backend, sql);
            assert!(sql.contains("updated_at"), "{:?}: {}", backend, sql);
        }
    }
}
