use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "service_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub service_id: String,
    /// One of `api`, `individual`, `code-editor`.
    #[sea_orm(primary_key, auto_increment = false, column_name = "type")]
    pub service_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ai_services::Entity",
        from = "Column::ServiceId",
        to = "super::ai_services::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    AiService,
}

impl Related<super::ai_services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AiService.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
