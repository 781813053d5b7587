use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "models")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub service_id: String,
    pub name: String,
    pub description_es: Option<String>,
    pub description_en: Option<String>,
    pub price_input: Option<String>,
    pub price_cached_input: Option<String>,
    pub price_output: Option<String>,
    pub context_length: Option<String>,
    pub rating: f64,
    /// JSON object of extra price components, merged over the fixed columns.
    #[sea_orm(column_type = "Text", nullable)]
    pub additional_price_data: Option<String>,
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
