mod common;

use anyhow::Result;
use common::{model, service, test_config};
use pricing_hub::catalog::CatalogSource;
use pricing_hub::catalog::query::{Pagination, ServiceFilters, WhereClause};
use pricing_hub::catalog::rows::{
    CategoryRow, FeatureRow, ModelRow, ServiceRow, ToolRow, TypeRow, UseCaseRow,
};
use pricing_hub::db::Store;
use pricing_hub::domain::{Locale, LocalizedList, LocalizedText, ServiceId, ServiceType};
use pricing_hub::models::service::ToolMetadata;
use pricing_hub::services::{CatalogError, CatalogService, SeaOrmCatalogService};
use sea_orm::{ConnectionTrait, Statement};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Wraps a store and counts the queries issued per table.
struct CountingSource {
    store: Store,
    counts: AtomicUsize,
    services: AtomicUsize,
    categories: AtomicUsize,
    types: AtomicUsize,
    features: AtomicUsize,
    models: AtomicUsize,
    use_cases: AtomicUsize,
    tools: AtomicUsize,
}

impl CountingSource {
    fn new(store: Store) -> Self {
        Self {
            store,
            counts: AtomicUsize::new(0),
            services: AtomicUsize::new(0),
            categories: AtomicUsize::new(0),
            types: AtomicUsize::new(0),
            features: AtomicUsize::new(0),
            models: AtomicUsize::new(0),
            use_cases: AtomicUsize::new(0),
            tools: AtomicUsize::new(0),
        }
    }

    fn sub_table_calls(&self) -> [usize; 6] {
        [
            self.categories.load(Ordering::SeqCst),
            self.types.load(Ordering::SeqCst),
            self.features.load(Ordering::SeqCst),
            self.models.load(Ordering::SeqCst),
            self.use_cases.load(Ordering::SeqCst),
            self.tools.load(Ordering::SeqCst),
        ]
    }

    fn total_calls(&self) -> usize {
        self.counts.load(Ordering::SeqCst)
            + self.services.load(Ordering::SeqCst)
            + self.sub_table_calls().iter().sum::<usize>()
    }
}

#[async_trait::async_trait]
impl CatalogSource for CountingSource {
    async fn count_services(&self, clause: &WhereClause) -> Result<u64> {
        self.counts.fetch_add(1, Ordering::SeqCst);
        self.store.count_services(clause).await
    }

    async fn fetch_services(
        &self,
        clause: &WhereClause,
        page: Option<Pagination>,
    ) -> Result<Vec<ServiceRow>> {
        self.services.fetch_add(1, Ordering::SeqCst);
        self.store.fetch_services(clause, page).await
    }

    async fn fetch_service_categories(&self, ids: &[String]) -> Result<Vec<CategoryRow>> {
        self.categories.fetch_add(1, Ordering::SeqCst);
        self.store.fetch_service_categories(ids).await
    }

    async fn fetch_service_types(&self, ids: &[String]) -> Result<Vec<TypeRow>> {
        self.types.fetch_add(1, Ordering::SeqCst);
        self.store.fetch_service_types(ids).await
    }

    async fn fetch_service_features(&self, ids: &[String]) -> Result<Vec<FeatureRow>> {
        self.features.fetch_add(1, Ordering::SeqCst);
        self.store.fetch_service_features(ids).await
    }

    async fn fetch_service_models(&self, ids: &[String]) -> Result<Vec<ModelRow>> {
        self.models.fetch_add(1, Ordering::SeqCst);
        self.store.fetch_service_models(ids).await
    }

    async fn fetch_service_use_cases(&self, ids: &[String]) -> Result<Vec<UseCaseRow>> {
        self.use_cases.fetch_add(1, Ordering::SeqCst);
        self.store.fetch_service_use_cases(ids).await
    }

    async fn fetch_service_tools(&self, ids: &[String]) -> Result<Vec<ToolRow>> {
        self.tools.fetch_add(1, Ordering::SeqCst);
        self.store.fetch_service_tools(ids).await
    }

    async fn fetch_all_categories(&self) -> Result<Vec<String>> {
        self.store.fetch_all_categories().await
    }
}

async fn seeded_store() -> Store {
    let store = Store::new(&test_config().general.database_path)
        .await
        .expect("Failed to open store");

    let mut chat = service("chat", "Chat Pro", &[ServiceType::Individual], &["Text"]);
    chat.models.push(model("chat-large", 4.6));
    chat.models.push(model("chat-mini", 3.9));

    let mut coder = service(
        "coder",
        "Coder",
        &[ServiceType::Api, ServiceType::CodeEditor],
        &["Code", "Text"],
    );
    coder.has_free = true;
    coder.use_cases = LocalizedList {
        es: vec!["Refactorizar".into()],
        en: vec!["Refactoring".into()],
    };

    for s in [chat, coder] {
        store.upsert_service(&s).await.expect("Failed to seed service");
    }
    store
}

fn facade(source: Arc<CountingSource>) -> SeaOrmCatalogService {
    SeaOrmCatalogService::new(source, &test_config().cache)
}

#[tokio::test]
async fn test_listing_is_stable_across_loads() {
    let store = seeded_store().await;

    let first_source = Arc::new(CountingSource::new(store.clone()));
    let first = facade(Arc::clone(&first_source))
        .list_services(None, None, None, None)
        .await
        .unwrap();

    // One query per sub-table, regardless of how many services matched.
    assert_eq!(first_source.sub_table_calls(), [1; 6]);
    assert_eq!(first.total, 2);

    let second = facade(Arc::new(CountingSource::new(store)))
        .list_services(None, None, None, None)
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_string(&*first).unwrap(),
        serde_json::to_string(&*second).unwrap()
    );
}

#[tokio::test]
async fn test_repeated_list_is_served_from_cache() {
    let source = Arc::new(CountingSource::new(seeded_store().await));
    let catalog = facade(Arc::clone(&source));

    let filters = ServiceFilters {
        has_free: true,
        ..ServiceFilters::default()
    };
    let a = catalog
        .list_services(Some(ServiceType::Api), Some(1), Some(9), Some(&filters))
        .await
        .unwrap();
    let calls = source.total_calls();

    let b = catalog
        .list_services(Some(ServiceType::Api), Some(1), Some(9), Some(&filters))
        .await
        .unwrap();

    assert_eq!(source.total_calls(), calls);
    assert_eq!(a, b);
    assert_eq!(a.services.len(), 1);
    assert_eq!(a.services[0].id.as_str(), "coder");
}

#[tokio::test]
async fn test_empty_result_skips_sub_tables() {
    let source = Arc::new(CountingSource::new(seeded_store().await));
    let catalog = facade(Arc::clone(&source));

    let filters = ServiceFilters {
        categories: vec!["Nonexistent".into()],
        ..ServiceFilters::default()
    };
    let page = catalog
        .list_services(None, None, None, Some(&filters))
        .await
        .unwrap();

    assert!(page.services.is_empty());
    assert_eq!(page.total, 0);
    assert_eq!(source.counts.load(Ordering::SeqCst), 1);
    assert_eq!(source.sub_table_calls(), [0; 6]);
}

#[tokio::test]
async fn test_pagination_total_counts_all_matches() {
    let source = Arc::new(CountingSource::new(seeded_store().await));
    let catalog = facade(source);

    let page = catalog
        .list_services(None, Some(2), Some(1), None)
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.services.len(), 1);
    assert_eq!(page.services[0].id.as_str(), "coder");
}

#[tokio::test]
async fn test_lookup_after_full_listing_uses_snapshot() {
    let source = Arc::new(CountingSource::new(seeded_store().await));
    let catalog = facade(Arc::clone(&source));

    catalog.list_services(None, None, None, None).await.unwrap();
    let calls = source.total_calls();

    let chat = catalog
        .get_service_by_id(&ServiceId::from("chat"))
        .await
        .unwrap()
        .expect("chat should exist");
    assert_eq!(chat.models.len(), 2);
    assert_eq!(source.total_calls(), calls);
}

#[tokio::test]
async fn test_upsert_round_trips() {
    let store = Store::new("sqlite::memory:").await.unwrap();

    let mut original = service(
        "studio",
        "Studio",
        &[ServiceType::Api, ServiceType::Individual],
        &["Audio", "Video"],
    );
    let mut voice = model("voice-v2", 4.4);
    voice.price.insert("per_minute".into(), "$0.02".into());
    original.models.push(voice);
    original.use_cases = LocalizedList {
        es: vec!["Doblaje".into(), "Podcasts".into()],
        en: vec!["Dubbing".into(), "Podcasts".into()],
    };
    original.security = Some(LocalizedText::from_columns(
        Some("Cifrado en reposo".into()),
        Some("Encryption at rest".into()),
    ));

    let mut tools = ToolMetadata::new();
    let mut editor = serde_json::Map::new();
    editor.insert("formats".into(), serde_json::json!(["wav", "mp3"]));
    tools.insert("editor".into(), editor);
    original.tools = Some(tools);

    store.upsert_service(&original).await.unwrap();
    // A second upsert replaces rather than appends.
    store.upsert_service(&original).await.unwrap();

    let catalog = facade(Arc::new(CountingSource::new(store)));
    let loaded = catalog
        .get_service_by_id(&original.id)
        .await
        .unwrap()
        .expect("studio should exist");

    assert_eq!(loaded, original);
    assert_eq!(catalog.get_categories().await.unwrap(), vec!["Audio", "Video"]);
}

#[tokio::test]
async fn test_upsert_rejects_service_without_types() {
    let store = Store::new("sqlite::memory:").await.unwrap();
    let untyped = service("ghost", "Ghost", &[], &["Text"]);

    assert!(store.upsert_service(&untyped).await.is_err());

    let catalog = facade(Arc::new(CountingSource::new(store)));
    assert!(
        catalog
            .get_service_by_id(&ServiceId::from("ghost"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_malformed_tool_data_is_reported() {
    let store = seeded_store().await;
    let backend = store.conn.get_database_backend();
    store
        .conn
        .execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO tools (service_id, tool_name, tool_data) VALUES (?, ?, ?)",
            ["chat".into(), "browser".into(), "[1, 2]".into()],
        ))
        .await
        .unwrap();

    let catalog = facade(Arc::new(CountingSource::new(store)));
    let err = catalog
        .get_service_by_id(&ServiceId::from("chat"))
        .await
        .unwrap_err();

    match err {
        CatalogError::Decode {
            service_id, field, ..
        } => {
            assert_eq!(service_id, "chat");
            assert_eq!(field, "tool_data");
        }
        other => panic!("expected a decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_id_is_none() {
    let catalog = facade(Arc::new(CountingSource::new(seeded_store().await)));
    let found = catalog
        .get_service_by_id(&ServiceId::from("missing"))
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_partial_translations_fall_back_to_english() {
    let store = Store::new("sqlite::memory:").await.unwrap();

    let mut dubbing = service("dub", "Dub", &[ServiceType::Individual], &["Audio"]);
    dubbing.features = LocalizedList {
        es: vec![],
        en: vec!["Voice cloning".into()],
    };
    dubbing.use_cases = LocalizedList {
        es: vec!["Doblaje".into()],
        en: vec!["Dubbing".into(), "Audiobooks".into()],
    };
    store.upsert_service(&dubbing).await.unwrap();

    let catalog = facade(Arc::new(CountingSource::new(store)));
    let loaded = catalog
        .get_service_by_id(&dubbing.id)
        .await
        .unwrap()
        .expect("dub should exist");

    assert!(loaded.features.es.is_empty());
    assert_eq!(loaded.features.resolve(Locale::Es), ["Voice cloning".to_string()]);
    assert_eq!(loaded.use_cases.es, vec!["Doblaje".to_string()]);
    assert_eq!(loaded.use_cases.en.len(), 2);
    assert!(loaded.use_cases.iter_all().all(|item| !item.is_empty()));
}
