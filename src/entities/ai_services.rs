use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ai_services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description_es: Option<String>,
    pub description_en: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub price_details: String,
    pub has_free: bool,
    pub has_api: bool,
    pub commercial_use: bool,
    pub custom_models: bool,
    pub is_new: bool,
    pub release_year: i32,
    pub security_es: Option<String>,
    pub security_en: Option<String>,
    pub support_es: Option<String>,
    pub support_en: Option<String>,
    pub integrations_es: Option<String>,
    pub integrations_en: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_categories::Entity")]
    ServiceCategories,
    #[sea_orm(has_many = "super::service_types::Entity")]
    ServiceTypes,
    #[sea_orm(has_many = "super::features::Entity")]
    Features,
    #[sea_orm(has_many = "super::models::Entity")]
    Models,
    #[sea_orm(has_many = "super::use_cases::Entity")]
    UseCases,
    #[sea_orm(has_many = "super::tools::Entity")]
    Tools,
}

impl Related<super::service_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceTypes.def()
    }
}

impl Related<super::features::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Features.def()
    }
}

impl Related<super::models::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Models.def()
    }
}

impl Related<super::use_cases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UseCases.def()
    }
}

impl Related<super::tools::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tools.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        super::service_categories::Relation::Category.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::service_categories::Relation::AiService.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
