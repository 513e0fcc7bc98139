//! Read-only access to the alerts and analytics collections

use crate::config::Settings;
use crate::errors::StoreError;
use crate::mock::MockDataGenerator;
use crate::models::{Alert, AnalyticsPoint};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::ErrorKind;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_millis(3000);

/// Source of the most recent alerts
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// At most `limit` alerts, newest first.
    async fn fetch_alerts(&self, limit: usize) -> StoreResult<Vec<Alert>>;

    /// `database.collection` shown in the UI footer
    fn alerts_source(&self) -> String;
}

/// Source of the analytics history
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// At most `limit` points, newest first.
    async fn fetch_history(&self, limit: usize) -> StoreResult<Vec<AnalyticsPoint>>;

    fn analytics_source(&self) -> String;
}

/// MongoDB-backed store. The client is created on first use and shared.
pub struct MongoStore {
    uri: String,
    database: String,
    alerts_collection: String,
    analytics_collection: String,
    client: OnceCell<Client>,
}

impl MongoStore {
    pub fn new(uri: &str, database: &str, alerts_collection: &str, analytics_collection: &str) -> Self {
        Self {
            uri: uri.to_string(),
            database: database.to_string(),
            alerts_collection: alerts_collection.to_string(),
            analytics_collection: analytics_collection.to_string(),
            client: OnceCell::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.mongo_uri,
            &settings.mongo_database,
            &settings.mongo_alerts_collection,
            &settings.mongo_analytics_collection,
        )
    }

    async fn client(&self) -> StoreResult<&Client> {
        self.client
            .get_or_try_init(|| async {
                info!("Creating MongoDB client connection");
                let mut options = ClientOptions::parse(&self.uri)
                    .await
                    .map_err(|e| StoreError::Connection(e.to_string()))?;
                options.server_selection_timeout.get_or_insert(SERVER_SELECTION_TIMEOUT);
                options.app_name.get_or_insert_with(|| "iot_dashboard".to_string());
                Client::with_options(options).map_err(|e| StoreError::Connection(e.to_string()))
            })
            .await
    }

    async fn collection(&self, name: &str) -> StoreResult<Collection<Document>> {
        Ok(self.client().await?.database(&self.database).collection(name))
    }

    async fn newest(
        &self,
        collection: &Collection<Document>,
        sort_field: &str,
        limit: usize,
    ) -> StoreResult<Vec<Document>> {
        let mut sort = Document::new();
        sort.insert(sort_field, -1);

        let cursor = collection
            .find(doc! {})
            .sort(sort)
            .limit(limit as i64)
            .await
            .map_err(store_error)?;

        cursor.try_collect().await.map_err(store_error)
    }
}

#[async_trait]
impl AlertStore for MongoStore {
    async fn fetch_alerts(&self, limit: usize) -> StoreResult<Vec<Alert>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let collection = self.collection(&self.alerts_collection).await?;

        let sample = collection.find_one(doc! {}).await.map_err(store_error)?;
        let sort_field = sample.as_ref().map(sort_field_for).unwrap_or("receivedAt");
        debug!(
            "Fetching {} alerts from {}, sorted by {}",
            limit, self.alerts_collection, sort_field
        );

        let docs = self.newest(&collection, sort_field, limit).await?;
        info!("Fetched {} alerts from {}", docs.len(), self.alerts_collection);

        Ok(docs.into_iter().map(|d| Alert::from_document(&to_json(d))).collect())
    }

    fn alerts_source(&self) -> String {
        format!("{}.{}", self.database, self.alerts_collection)
    }
}

#[async_trait]
impl AnalyticsStore for MongoStore {
    async fn fetch_history(&self, limit: usize) -> StoreResult<Vec<AnalyticsPoint>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let collection = self.collection(&self.analytics_collection).await?;
        let docs = self.newest(&collection, "timestamp", limit).await?;
        debug!("Fetched {} analytics points from {}", docs.len(), self.analytics_collection);

        Ok(docs
            .into_iter()
            .map(|d| AnalyticsPoint::from_document(&to_json(d)))
            .collect())
    }

    fn analytics_source(&self) -> String {
        format!("{}.{}", self.database, self.analytics_collection)
    }
}

/// Prefer `receivedAt`, then `alertTimestamp`, then `timestamp`, else `_id`.
fn sort_field_for(sample: &Document) -> &'static str {
    ["receivedAt", "alertTimestamp", "timestamp"]
        .into_iter()
        .find(|field| sample.contains_key(field))
        .unwrap_or("_id")
}

fn to_json(doc: Document) -> serde_json::Value {
    Bson::Document(doc).into_relaxed_extjson()
}

fn store_error(err: mongodb::error::Error) -> StoreError {
    error!("MongoDB error: {}", err);
    match *err.kind {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => StoreError::Connection(err.to_string()),
        _ => StoreError::Query(err.to_string()),
    }
}

/// Store answering from the mock data generator
#[derive(Debug, Default)]
pub struct MockStore {
    generator: MockDataGenerator,
}

impl MockStore {
    pub fn new(generator: MockDataGenerator) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl AlertStore for MockStore {
    async fn fetch_alerts(&self, limit: usize) -> StoreResult<Vec<Alert>> {
        info!("[MOCK] Fetching {} alerts", limit);
        Ok(self.generator.alerts(limit))
    }

    fn alerts_source(&self) -> String {
        "mock.alerts".to_string()
    }
}

#[async_trait]
impl AnalyticsStore for MockStore {
    async fn fetch_history(&self, limit: usize) -> StoreResult<Vec<AnalyticsPoint>> {
        info!("[MOCK] Fetching {} analytics points", limit);
        Ok(self.generator.analytics(limit))
    }

    fn analytics_source(&self) -> String {
        "mock.analytics".to_string()
    }
}

/// Factory for the datastore clients
pub struct StoreFactory;

impl StoreFactory {
    pub fn create(settings: &Settings) -> (Arc<dyn AlertStore>, Arc<dyn AnalyticsStore>) {
        if settings.mock_mode {
            info!("Initializing datastore in MOCK mode");
            let store = Arc::new(MockStore::default());
            let alerts: Arc<dyn AlertStore> = store.clone();
            let analytics: Arc<dyn AnalyticsStore> = store;
            (alerts, analytics)
        } else {
            info!("Initializing datastore in REAL mode");
            let store = Arc::new(MongoStore::from_settings(settings));
            let alerts: Arc<dyn AlertStore> = store.clone();
            let analytics: Arc<dyn AnalyticsStore> = store;
            (alerts, analytics)
        }
    }
}
