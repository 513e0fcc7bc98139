//! The capability shared by the real HTTP client and the in-process mock

use crate::config::Settings;
use crate::errors::{ClientError, Result};
use crate::mock::MockClient;
use crate::models::{RunState, Service};
use crate::transport::RealClient;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Calls a dashboard panel can make against a backend service.
///
/// Exactly one implementation serves a whole process: `RealClient` talks to
/// the configured base URLs, `MockClient` answers from memory.
#[async_trait]
pub trait ServiceClient: Send + Sync {
    /// `GET /api/{service}/status`
    async fn get_status(&self, service: Service) -> ClientResult<Value>;

    /// `POST /api/{service}/config` with `payload` as the JSON body
    async fn set_config(&self, service: Service, payload: &Value) -> ClientResult<Value>;

    /// `POST /api/{service}/start` or `/stop`
    async fn start_stop(&self, service: Service, desired: RunState) -> ClientResult<Value>;

    /// Label shown in the UI next to the service status.
    fn mode(&self) -> &'static str;
}

/// Factory for the service client
pub struct ServiceClientFactory;

impl ServiceClientFactory {
    pub fn create(settings: &Settings) -> Result<Arc<dyn ServiceClient>> {
        if settings.mock_mode {
            info!("Initializing service client in MOCK mode");
            Ok(Arc::new(MockClient::new()))
        } else {
            info!("Initializing service client in REAL mode");
            Ok(Arc::new(RealClient::from_settings(settings)?))
        }
    }
}

/// Backend path for a call, relative to the service base URL.
pub fn endpoint(service: Service, action: &str) -> String {
    format!("/api/{}/{}", service.as_str(), action)
}
