//! API control panel: status, configuration and start/stop per service

use super::Banner;
use crate::client::ServiceClient;
use crate::errors::ClientError;
use crate::models::{AnalyticsConfig, RunState, Service, ServiceStatus, SimulatorConfig};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// What the control panel renders for one service
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceView {
    pub service: Service,
    pub mode: &'static str,
    /// Last successfully fetched status, kept when a later call fails
    pub status: Option<ServiceStatus>,
    pub banner: Option<Banner>,
    pub toggle_label: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ServiceView {
    fn empty(service: Service, mode: &'static str) -> Self {
        Self {
            service,
            mode,
            status: None,
            banner: None,
            toggle_label: toggle_label(service, RunState::Unknown),
            updated_at: None,
        }
    }

    fn state(&self) -> RunState {
        self.status.as_ref().map(|s| s.state).unwrap_or(RunState::Unknown)
    }
}

fn toggle_label(service: Service, state: RunState) -> String {
    if state.is_running() {
        format!("Stop {}", service)
    } else {
        format!("Start {}", service)
    }
}

pub struct ControlPanel {
    client: Arc<dyn ServiceClient>,
    views: RwLock<HashMap<Service, ServiceView>>,
    /// Serializes user actions so a second click waits for the first
    actions: Mutex<()>,
}

impl ControlPanel {
    pub fn new(client: Arc<dyn ServiceClient>) -> Self {
        let mode = client.mode();
        let views = Service::ALL
            .into_iter()
            .map(|s| (s, ServiceView::empty(s, mode)))
            .collect();

        Self {
            client,
            views: RwLock::new(views),
            actions: Mutex::new(()),
        }
    }

    pub fn mode(&self) -> &'static str {
        self.client.mode()
    }

    /// Re-fetch one service's status.
    pub async fn refresh(&self, service: Service) -> ServiceView {
        let _guard = self.actions.lock().await;
        let banner = match self.fetch_status(service).await {
            Ok(field_warning) => field_warning,
            Err(banner) => Some(banner),
        };
        self.finish(service, banner).await
    }

    pub async fn refresh_all(&self) -> Vec<ServiceView> {
        let mut views = Vec::with_capacity(Service::ALL.len());
        for service in Service::ALL {
            views.push(self.refresh(service).await);
        }
        views
    }

    /// Validate a configuration form and send it to the service.
    ///
    /// Nothing is sent when validation fails. On success the status is
    /// fetched again so the panel shows what the service accepted.
    pub async fn submit_config(&self, service: Service, form: Value) -> ServiceView {
        let _guard = self.actions.lock().await;

        let payload = match validate_form(service, form) {
            Ok(payload) => payload,
            Err(message) => {
                warn!("Rejected {} configuration: {}", service, message);
                return self.finish(service, Some(Banner::error("validation", message))).await;
            }
        };

        let banner = match self.client.set_config(service, &payload).await {
            Ok(_) => {
                info!("Applied {} configuration: {}", service, payload);
                match self.fetch_status(service).await {
                    Ok(None) => Some(Banner::success(format!("{} configuration applied", service))),
                    Ok(Some(field_warning)) => Some(field_warning),
                    Err(banner) => Some(banner),
                }
            }
            Err(e) => Some(failure_banner(service, "configure", &e)),
        };

        self.finish(service, banner).await
    }

    /// Start a stopped service or stop a running one.
    ///
    /// The displayed state only changes once the backend has confirmed the call.
    pub async fn toggle(&self, service: Service) -> ServiceView {
        let _guard = self.actions.lock().await;

        let current = self.current_state(service).await;
        let desired = RunState::from(!current.is_running());

        let banner = match self.client.start_stop(service, desired).await {
            Ok(_) => {
                info!("{} {} succeeded", desired.action(), service);
                match self.fetch_status(service).await {
                    Ok(None) => Some(Banner::success(format!("{} {}", service, past_tense(desired)))),
                    // The backend's reported state stands even when other fields are unusable
                    Ok(Some(field_warning)) => Some(field_warning),
                    Err(banner) => {
                        // The call went through even though the status could not be re-read
                        self.set_state(service, desired).await;
                        Some(banner)
                    }
                }
            }
            Err(e) => Some(failure_banner(service, desired.action(), &e)),
        };

        self.finish(service, banner).await
    }

    async fn current_state(&self, service: Service) -> RunState {
        self.views
            .read()
            .await
            .get(&service)
            .map(ServiceView::state)
            .unwrap_or(RunState::Unknown)
    }

    /// Store a fresh status, or return the banner describing why there is none.
    ///
    /// A status that was read but had unusable fields is still stored; the
    /// field warning comes back as `Ok(Some(_))`.
    async fn fetch_status(&self, service: Service) -> Result<Option<Banner>, Banner> {
        let body = self
            .client
            .get_status(service)
            .await
            .map_err(|e| failure_banner(service, "read status of", &e))?;

        let status = ServiceStatus::from_json(&body).map_err(|message| {
            warn!("Unusable status from {}: {}", service, message);
            Banner::error("malformed-body", format!("{} status: {}", service, message))
        })?;

        let field_warning = (!status.warnings.is_empty())
            .then(|| Banner::warning("field", status.warnings.join("; ")));

        let mut views = self.views.write().await;
        let view = views
            .entry(service)
            .or_insert_with(|| ServiceView::empty(service, self.client.mode()));
        view.status = Some(status);
        view.updated_at = Some(Utc::now());

        Ok(field_warning)
    }

    async fn set_state(&self, service: Service, state: RunState) {
        let mut views = self.views.write().await;
        if let Some(view) = views.get_mut(&service) {
            view.status.get_or_insert_with(ServiceStatus::default).state = state;
            view.updated_at = Some(Utc::now());
        }
    }

    async fn finish(&self, service: Service, banner: Option<Banner>) -> ServiceView {
        let mut views = self.views.write().await;
        let view = views
            .entry(service)
            .or_insert_with(|| ServiceView::empty(service, self.client.mode()));
        view.banner = banner;
        view.toggle_label = toggle_label(service, view.state());
        view.clone()
    }
}

fn failure_banner(service: Service, action: &str, err: &ClientError) -> Banner {
    warn!("Failed to {} {}: {}", action, service, err);
    Banner::error(err.kind(), format!("Failed to {} {}: {}", action, service, err))
}

fn past_tense(state: RunState) -> &'static str {
    if state.is_running() { "started" } else { "stopped" }
}

/// Turn a submitted form into the payload sent to the service.
fn validate_form(service: Service, form: Value) -> Result<Value, String> {
    match service {
        Service::Simulator => {
            let config: SimulatorConfig =
                serde_json::from_value(form).map_err(|e| format!("invalid simulator configuration: {}", e))?;
            config.validate()?;
            serde_json::to_value(config).map_err(|e| e.to_string())
        }
        Service::Analytics => {
            let config: AnalyticsConfig =
                serde_json::from_value(form).map_err(|e| format!("invalid analytics configuration: {}", e))?;
            config.validate()?;
            serde_json::to_value(config).map_err(|e| e.to_string())
        }
        Service::Controller if form.is_object() => Ok(form),
        Service::Controller => Err("controller configuration must be a JSON object".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientResult;
    use crate::mock::MockClient;
    use crate::panels::BannerLevel;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports a running simulator but refuses every write
    struct RefusingClient {
        writes: AtomicUsize,
    }

    #[async_trait]
    impl ServiceClient for RefusingClient {
        async fn get_status(&self, _service: Service) -> ClientResult<Value> {
            Ok(json!({"state": "RUNNING", "deviceCount": 3, "rate": 2}))
        }

        async fn set_config(&self, service: Service, _payload: &Value) -> ClientResult<Value> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::ConnectionRefused {
                url: format!("http://down{}", crate::client::endpoint(service, "config")),
                message: "connection refused".to_string(),
            })
        }

        async fn start_stop(&self, service: Service, desired: RunState) -> ClientResult<Value> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Timeout {
                url: format!("http://down{}", crate::client::endpoint(service, desired.action())),
            })
        }

        fn mode(&self) -> &'static str {
            "real"
        }
    }

    fn refusing() -> (Arc<RefusingClient>, ControlPanel) {
        let client = Arc::new(RefusingClient { writes: AtomicUsize::new(0) });
        let panel = ControlPanel::new(client.clone());
        (client, panel)
    }

    #[tokio::test]
    async fn test_refresh_reads_status() {
        let panel = ControlPanel::new(Arc::new(MockClient::new()));
        let view = panel.refresh(Service::Simulator).await;

        let status = view.status.unwrap();
        assert_eq!(status.state, RunState::Stopped);
        assert_eq!(status.device_count, Some(10));
        assert_eq!(view.toggle_label, "Start simulator");
        assert_eq!(view.mode, "mock");
        assert!(view.banner.is_none());
    }

    #[tokio::test]
    async fn test_toggle_flips_state_after_success() {
        let panel = ControlPanel::new(Arc::new(MockClient::new()));
        panel.refresh(Service::Analytics).await;

        let view = panel.toggle(Service::Analytics).await;
        assert_eq!(view.status.unwrap().state, RunState::Running);
        assert_eq!(view.toggle_label, "Stop analytics");
        assert_eq!(view.banner.unwrap().level, BannerLevel::Success);

        let view = panel.toggle(Service::Analytics).await;
        assert_eq!(view.status.unwrap().state, RunState::Stopped);
    }

    #[tokio::test]
    async fn test_failed_toggle_keeps_state() {
        let (_, panel) = refusing();
        panel.refresh(Service::Simulator).await;

        let view = panel.toggle(Service::Simulator).await;
        assert_eq!(view.status.unwrap().state, RunState::Running);
        assert_eq!(view.toggle_label, "Stop simulator");

        let banner = view.banner.unwrap();
        assert_eq!(banner.level, BannerLevel::Error);
        assert_eq!(banner.kind, "timeout");
    }

    #[tokio::test]
    async fn test_config_round_trip() {
        let panel = ControlPanel::new(Arc::new(MockClient::new()));
        let view = panel
            .submit_config(Service::Analytics, json!({"method": "ParallelStream", "batchSize": 250}))
            .await;

        let status = view.status.unwrap();
        assert_eq!(status.method, Some(crate::models::ProcessingMethod::ParallelStream));
        assert_eq!(status.batch_size, Some(250));
        assert_eq!(view.banner.unwrap().level, BannerLevel::Success);
    }

    #[tokio::test]
    async fn test_invalid_config_is_not_sent() {
        let (client, panel) = refusing();

        let view = panel
            .submit_config(Service::Simulator, json!({"deviceCount": 0, "rate": 5}))
            .await;
        assert_eq!(view.banner.unwrap().kind, "validation");

        let view = panel.submit_config(Service::Analytics, json!({"method": "Reactive", "batchSize": 5})).await;
        assert_eq!(view.banner.unwrap().kind, "validation");

        let view = panel.submit_config(Service::Controller, json!("on")).await;
        assert_eq!(view.banner.unwrap().kind, "validation");

        assert_eq!(client.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_config_keeps_last_status() {
        let (client, panel) = refusing();
        panel.refresh(Service::Simulator).await;

        let view = panel
            .submit_config(Service::Simulator, json!({"deviceCount": 50, "rate": 5}))
            .await;

        assert_eq!(client.writes.load(Ordering::SeqCst), 1);
        assert_eq!(view.status.unwrap().device_count, Some(3));
        assert_eq!(view.banner.unwrap().kind, "connection-refused");
    }

    /// Accepts every start/stop but always reports a stopped service with a bad field
    struct StuckClient;

    #[async_trait]
    impl ServiceClient for StuckClient {
        async fn get_status(&self, _service: Service) -> ClientResult<Value> {
            Ok(json!({"state": "STOPPED", "deviceCount": "many"}))
        }

        async fn set_config(&self, _service: Service, payload: &Value) -> ClientResult<Value> {
            Ok(payload.clone())
        }

        async fn start_stop(&self, _service: Service, _desired: RunState) -> ClientResult<Value> {
            Ok(Value::Null)
        }

        fn mode(&self) -> &'static str {
            "real"
        }
    }

    #[tokio::test]
    async fn test_toggle_shows_reported_state_despite_field_warning() {
        let panel = ControlPanel::new(Arc::new(StuckClient));

        let view = panel.toggle(Service::Simulator).await;
        let status = view.status.unwrap();
        assert_eq!(status.state, RunState::Stopped);
        assert_eq!(status.device_count, None);
        assert_eq!(view.toggle_label, "Start simulator");

        let banner = view.banner.unwrap();
        assert_eq!(banner.level, BannerLevel::Warning);
        assert_eq!(banner.kind, "field");
    }

    #[test]
    fn test_controller_accepts_any_object() {
        let form = json!({"autoScale": true});
        assert_eq!(validate_form(Service::Controller, form.clone()), Ok(form));
    }
}
