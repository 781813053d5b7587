use crate::catalog::query::{Pagination, WhereClause, count_query, placeholders, services_query};
use crate::catalog::rows::{
    CategoryRow, CountRow, FeatureRow, ModelRow, NameRow, ServiceRow, ToolRow, TypeRow,
    UseCaseRow,
};
use crate::domain::{Locale, LocalizedText};
use crate::entities::{
    ai_services, categories, features, models, prelude::*, service_categories, service_types,
    tools, use_cases,
};
use crate::models::service::{AiModel, Service};
use anyhow::{Result, bail};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, QueryFilter, Set, Statement, TransactionTrait, Value,
};

/// Price keys stored in dedicated model columns; everything else goes to
/// `additional_price_data`.
const FIXED_PRICE_KEYS: [&str; 3] = ["input", "cached_input", "output"];

pub struct CatalogRepository {
    conn: DatabaseConnection,
}

impl CatalogRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn query_all<T: FromQueryResult>(&self, sql: String, values: Vec<Value>) -> Result<Vec<T>> {
        let backend = self.conn.get_database_backend();
        let stmt = Statement::from_sql_and_values(backend, sql, values);
        Ok(T::find_by_statement(stmt).all(&self.conn).await?)
    }

    /// Runs `SELECT {columns} FROM {from} WHERE {id_column} IN (...) ORDER BY {order}`.
    async fn query_by_ids<T: FromQueryResult>(
        &self,
        select: &str,
        id_column: &str,
        order: &str,
        ids: &[String],
    ) -> Result<Vec<T>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{select} WHERE {id_column} IN ({}) ORDER BY {order}",
            placeholders(ids.len())
        );
        let values = ids.iter().map(|id| Value::from(id.as_str())).collect();
        self.query_all(sql, values).await
    }

    pub async fn count(&self, clause: &WhereClause) -> Result<u64> {
        let (sql, values) = count_query(clause);
        let rows: Vec<CountRow> = self.query_all(sql, values).await?;
        let total = rows.first().map_or(0, |r| r.total);
        Ok(u64::try_from(total).unwrap_or(0))
    }

    pub async fn list(&self, clause: &WhereClause, page: Option<Pagination>) -> Result<Vec<ServiceRow>> {
        let (sql, values) = services_query(clause, page);
        self.query_all(sql, values).await
    }

    pub async fn categories_for(&self, ids: &[String]) -> Result<Vec<CategoryRow>> {
        self.query_by_ids(
            "SELECT sc.service_id, c.name FROM service_categories sc \
             JOIN categories c ON c.id = sc.category_id",
            "sc.service_id",
            "sc.service_id, c.name",
            ids,
        )
        .await
    }

    pub async fn types_for(&self, ids: &[String]) -> Result<Vec<TypeRow>> {
        self.query_by_ids(
            "SELECT st.service_id, st.type AS service_type FROM service_types st",
            "st.service_id",
            "st.service_id, st.type",
            ids,
        )
        .await
    }

    pub async fn features_for(&self, ids: &[String]) -> Result<Vec<FeatureRow>> {
        self.query_by_ids(
            "SELECT f.service_id, f.feature_es, f.feature_en FROM features f",
            "f.service_id",
            "f.service_id, f.id",
            ids,
        )
        .await
    }

    pub async fn models_for(&self, ids: &[String]) -> Result<Vec<ModelRow>> {
        self.query_by_ids(
            "SELECT m.service_id, m.name, m.description_es, m.description_en, m.price_input, \
             m.price_cached_input, m.price_output, m.context_length, m.rating, \
             m.additional_price_data FROM models m",
            "m.service_id",
            "m.service_id, m.id",
            ids,
        )
        .await
    }

    pub async fn use_cases_for(&self, ids: &[String]) -> Result<Vec<UseCaseRow>> {
        self.query_by_ids(
            "SELECT u.service_id, u.use_case_es, u.use_case_en FROM use_cases u",
            "u.service_id",
            "u.service_id, u.id",
            ids,
        )
        .await
    }

    pub async fn tools_for(&self, ids: &[String]) -> Result<Vec<ToolRow>> {
        self.query_by_ids(
            "SELECT t.service_id, t.tool_name, t.tool_data FROM tools t",
            "t.service_id",
            "t.service_id, t.tool_name",
            ids,
        )
        .await
    }

    pub async fn category_names(&self) -> Result<Vec<String>> {
        let rows: Vec<NameRow> = self
            .query_all(
                "SELECT DISTINCT name FROM categories ORDER BY name".to_string(),
                Vec::new(),
            )
            .await?;
        Ok(rows.into_iter().map(|r| r.name).collect())
    }

    /// Replaces a service and all of its related rows in one transaction.
    pub async fn upsert(&self, service: &Service) -> Result<()> {
        if service.types.is_empty() {
            bail!("service {} has no type", service.id);
        }

        let id = service.id.as_str().to_string();
        let txn = self.conn.begin().await?;

        ServiceCategories::delete_many()
            .filter(service_categories::Column::ServiceId.eq(&id))
            .exec(&txn)
            .await?;
        ServiceTypes::delete_many()
            .filter(service_types::Column::ServiceId.eq(&id))
            .exec(&txn)
            .await?;
        Features::delete_many()
            .filter(features::Column::ServiceId.eq(&id))
            .exec(&txn)
            .await?;
        Models::delete_many()
            .filter(models::Column::ServiceId.eq(&id))
            .exec(&txn)
            .await?;
        UseCases::delete_many()
            .filter(use_cases::Column::ServiceId.eq(&id))
            .exec(&txn)
            .await?;
        Tools::delete_many()
            .filter(tools::Column::ServiceId.eq(&id))
            .exec(&txn)
            .await?;
        AiServices::delete_by_id(id.clone()).exec(&txn).await?;

        let text = |t: &Option<LocalizedText>, locale: Locale| {
            t.as_ref().and_then(|t| t.get(locale)).map(str::to_string)
        };

        ai_services::ActiveModel {
            id: Set(id.clone()),
            name: Set(service.name.clone()),
            description_es: Set(service.description.get(Locale::Es).map(str::to_string)),
            description_en: Set(service.description.get(Locale::En).map(str::to_string)),
            price_details: Set(service.price_details.clone()),
            has_free: Set(service.has_free),
            has_api: Set(service.has_api),
            commercial_use: Set(service.commercial_use),
            custom_models: Set(service.custom_models),
            is_new: Set(service.is_new),
            release_year: Set(service.release_year),
            security_es: Set(text(&service.security, Locale::Es)),
            security_en: Set(text(&service.security, Locale::En)),
            support_es: Set(text(&service.support, Locale::Es)),
            support_en: Set(text(&service.support, Locale::En)),
            integrations_es: Set(text(&service.integrations, Locale::Es)),
            integrations_en: Set(text(&service.integrations, Locale::En)),
        }
        .insert(&txn)
        .await?;

        let mut category_names = service.categories.clone();
        category_names.sort();
        category_names.dedup();

        for name in category_names {
            let existing = Categories::find()
                .filter(categories::Column::Name.eq(&name))
                .one(&txn)
                .await?;

            let category_id = match existing {
                Some(category) => category.id,
                None => {
                    categories::ActiveModel {
                        name: Set(name),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await?
                    .id
                }
            };

            ServiceCategories::insert(service_categories::ActiveModel {
                service_id: Set(id.clone()),
                category_id: Set(category_id),
            })
            .exec_without_returning(&txn)
            .await?;
        }

        let mut types = service.types.clone();
        types.sort();
        types.dedup();

        for ty in types {
            ServiceTypes::insert(service_types::ActiveModel {
                service_id: Set(id.clone()),
                service_type: Set(ty.as_str().to_string()),
            })
            .exec_without_returning(&txn)
            .await?;
        }

        for (es, en) in paired(&service.features.es, &service.features.en) {
            features::ActiveModel {
                service_id: Set(id.clone()),
                feature_es: Set(es),
                feature_en: Set(en),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        for (es, en) in paired(&service.use_cases.es, &service.use_cases.en) {
            use_cases::ActiveModel {
                service_id: Set(id.clone()),
                use_case_es: Set(es),
                use_case_en: Set(en),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        for model in &service.models {
            model_active(&id, model)?.insert(&txn).await?;
        }

        if let Some(tool_map) = &service.tools {
            for (name, data) in tool_map.iter() {
                tools::ActiveModel {
                    service_id: Set(id.clone()),
                    tool_name: Set(name.clone()),
                    tool_data: Set(serde_json::to_string(data)?),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
        }

        txn.commit().await?;
        Ok(())
    }
}

/// Zips the two locale lists, padding the shorter one with empty strings.
fn paired(es: &[String], en: &[String]) -> Vec<(String, String)> {
    let len = es.len().max(en.len());
    (0..len)
        .map(|i| {
            (
                es.get(i).cloned().unwrap_or_default(),
                en.get(i).cloned().unwrap_or_default(),
            )
        })
        .collect()
}

fn model_active(service_id: &str, model: &AiModel) -> Result<models::ActiveModel> {
    let extra: serde_json::Map<String, serde_json::Value> = model
        .price
        .iter()
        .filter(|(key, _)| !FIXED_PRICE_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
        .collect();

    let additional_price_data = if extra.is_empty() {
        None
    } else {
        Some(serde_json::to_string(&extra)?)
    };

    Ok(models::ActiveModel {
        service_id: Set(service_id.to_string()),
        name: Set(model.name.clone()),
        description_es: Set(model.description.get(Locale::Es).map(str::to_string)),
        description_en: Set(model.description.get(Locale::En).map(str::to_string)),
        price_input: Set(model.price.get("input").cloned()),
        price_cached_input: Set(model.price.get("cached_input").cloned()),
        price_output: Set(model.price.get("output").cloned()),
        context_length: Set(model.context_length.clone()),
        rating: Set(model.rating),
        additional_price_data: Set(additional_price_data),
        ..Default::default()
    })
}
