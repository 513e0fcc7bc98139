//! HTTP transport layer for calling the backend services

use crate::client::{ClientResult, ServiceClient, endpoint};
use crate::config::Settings;
use crate::errors::{ClientError, DashboardError, Result};
use crate::models::{RunState, Service};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, warn};

/// HTTP client for the simulator, analytics and controller APIs
#[derive(Debug, Clone)]
pub struct RealClient {
    client: Client,
    simulator_url: String,
    analytics_url: String,
    controller_url: String,
    timeout: Duration,
}

impl RealClient {
    /// Create a new client
    pub fn new(
        simulator_url: &str,
        analytics_url: &str,
        controller_url: &str,
        http_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(http_timeout)
            .user_agent(format!("iot_dashboard/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DashboardError::Other(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            simulator_url: simulator_url.trim_end_matches('/').to_string(),
            analytics_url: analytics_url.trim_end_matches('/').to_string(),
            controller_url: controller_url.trim_end_matches('/').to_string(),
            timeout: http_timeout,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.simulator_url,
            &settings.analytics_url,
            &settings.controller_url,
            settings.http_timeout,
        )
    }

    fn url(&self, service: Service, action: &str) -> String {
        let base = match service {
            Service::Simulator => &self.simulator_url,
            Service::Analytics => &self.analytics_url,
            Service::Controller => &self.controller_url,
        };
        format!("{}{}", base, endpoint(service, action))
    }

    async fn get(&self, url: String) -> ClientResult<Value> {
        debug!("GET {}", url);
        let response = timeout(self.timeout, self.client.get(&url).send())
            .await
            .map_err(|_| ClientError::Timeout { url: url.clone() })?
            .map_err(|e| classify(&url, e))?;

        self.handle_response(url, response).await
    }

    async fn post(&self, url: String, body: Option<&Value>) -> ClientResult<Value> {
        debug!("POST {}", url);
        let request = match body {
            Some(body) => self.client.post(&url).json(body),
            None => self.client.post(&url),
        };

        let response = timeout(self.timeout, request.send())
            .await
            .map_err(|_| ClientError::Timeout { url: url.clone() })?
            .map_err(|e| classify(&url, e))?;

        self.handle_response(url, response).await
    }

    /// Turn a response into parsed JSON or a `ClientError`
    async fn handle_response(&self, url: String, response: Response) -> ClientResult<Value> {
        let status = response.status();

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) if status.is_success() => return Err(classify(&url, e)),
            Err(_) => String::new(),
        };

        if !status.is_success() {
            warn!("Request failed: {} - status {}", url, status);
            return Err(ClientError::BadStatus {
                url,
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!("Malformed body from {}: {}", url, e);
            ClientError::MalformedBody { url, message: e.to_string() }
        })
    }
}

/// Fold a reqwest failure into one of the uniform error kinds
fn classify(url: &str, err: reqwest::Error) -> ClientError {
    let url = url.to_string();
    if err.is_timeout() {
        error!("Request timeout: {}", url);
        ClientError::Timeout { url }
    } else if err.is_decode() || err.is_body() {
        ClientError::MalformedBody { url, message: err.to_string() }
    } else {
        error!("Connection error: {} - {}", url, err);
        ClientError::ConnectionRefused { url, message: err.to_string() }
    }
}

#[async_trait]
impl ServiceClient for RealClient {
    async fn get_status(&self, service: Service) -> ClientResult<Value> {
        self.get(self.url(service, "status")).await
    }

    async fn set_config(&self, service: Service, payload: &Value) -> ClientResult<Value> {
        self.post(self.url(service, "config"), Some(payload)).await
    }

    async fn start_stop(&self, service: Service, desired: RunState) -> ClientResult<Value> {
        self.post(self.url(service, desired.action()), None).await
    }

    fn mode(&self) -> &'static str {
        "real"
    }
}
