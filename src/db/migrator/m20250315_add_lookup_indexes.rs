use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Sub-table lookups are always `WHERE service_id IN (...)`.
const SERVICE_ID_INDEXES: [(&str, &str); 5] = [
    ("idx_features_service_id", "features"),
    ("idx_models_service_id", "models"),
    ("idx_use_cases_service_id", "use_cases"),
    ("idx_tools_service_id", "tools"),
    ("idx_service_categories_service_id", "service_categories"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in SERVICE_ID_INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Alias::new(table))
                        .col(Alias::new("service_id"))
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_index(
                Index::create()
                    .name("idx_service_types_type")
                    .table(Alias::new("service_types"))
                    .col(Alias::new("type"))
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_service_types_type")
                    .table(Alias::new("service_types"))
                    .to_owned(),
            )
            .await?;

        for (name, table) in SERVICE_ID_INDEXES {
            manager
                .drop_index(
                    Index::drop()
                        .name(name)
                        .table(Alias::new(table))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}
