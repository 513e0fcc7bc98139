//! In-process stand-in for the backend services and the datastore
//!
//! Used when mock mode is on. Answers the same call shapes as the real
//! services without any network I/O, and generates synthetic alerts and
//! analytics history.

use crate::client::{ClientResult, ServiceClient, endpoint};
use crate::errors::ClientError;
use crate::models::{Alert, AnalyticsPoint, RunState, Service, Severity};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

/// Upper bound on generated alerts per query
pub const MAX_MOCK_ALERTS: usize = 50;

const ALERT_SPACING_MINUTES: i64 = 5;

const RULES: [(&str, &str); 5] = [
    ("LOW_BATTERY", "Battery level below threshold"),
    ("HIGH_TEMPERATURE", "Temperature exceeds safe limits"),
    ("SUSTAINED_LOW_SIGNAL", "Signal strength critically low"),
    ("RAPID_BATTERY_DRAIN", "Battery draining faster than normal"),
    ("SIGNAL_LOSS", "Complete signal loss detected"),
];

#[derive(Debug, Clone)]
struct MockServiceState {
    state: RunState,
    config: Map<String, Value>,
}

impl MockServiceState {
    fn initial(service: Service) -> Self {
        let config = match service {
            Service::Simulator => json!({"deviceCount": 10, "rate": 5}),
            Service::Analytics => json!({"method": "Sequential", "batchSize": 100}),
            Service::Controller => json!({}),
        };

        Self {
            state: RunState::Stopped,
            config: match config {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    fn status(&self) -> Value {
        let mut body = self.config.clone();
        body.insert("state".to_string(), json!(self.state));
        Value::Object(body)
    }
}

/// Mock service client holding a toggle state and the last configuration per service
#[derive(Debug)]
pub struct MockClient {
    services: RwLock<HashMap<Service, MockServiceState>>,
}

impl MockClient {
    pub fn new() -> Self {
        let services = Service::ALL
            .into_iter()
            .map(|s| (s, MockServiceState::initial(s)))
            .collect();

        Self {
            services: RwLock::new(services),
        }
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceClient for MockClient {
    async fn get_status(&self, service: Service) -> ClientResult<Value> {
        info!("[MOCK] GET {}", endpoint(service, "status"));
        let services = self.services.read().await;
        Ok(services
            .get(&service)
            .map(MockServiceState::status)
            .unwrap_or_else(|| MockServiceState::initial(service).status()))
    }

    async fn set_config(&self, service: Service, payload: &Value) -> ClientResult<Value> {
        let url = endpoint(service, "config");
        info!("[MOCK] POST {}", url);

        let Some(fields) = payload.as_object() else {
            return Err(ClientError::BadStatus {
                url,
                status: 400,
                body: "configuration must be a JSON object".to_string(),
            });
        };

        let mut services = self.services.write().await;
        let entry = services
            .entry(service)
            .or_insert_with(|| MockServiceState::initial(service));
        for (key, value) in fields {
            entry.config.insert(key.clone(), value.clone());
        }

        Ok(Value::Object(entry.config.clone()))
    }

    async fn start_stop(&self, service: Service, desired: RunState) -> ClientResult<Value> {
        info!("[MOCK] POST {}", endpoint(service, desired.action()));
        let mut services = self.services.write().await;
        let entry = services
            .entry(service)
            .or_insert_with(|| MockServiceState::initial(service));
        entry.state = RunState::from(desired.is_running());

        Ok(json!({
            "state": entry.state,
            "message": format!("{} {} (MOCK)", service, if desired.is_running() { "started" } else { "stopped" }),
        }))
    }

    fn mode(&self) -> &'static str {
        "mock"
    }
}

/// Generates synthetic alerts and analytics history
#[derive(Debug, Clone)]
pub struct MockDataGenerator {
    device_pool: Vec<String>,
}

impl Default for MockDataGenerator {
    fn default() -> Self {
        Self::with_device_pool((1..=20).map(|n| format!("device-{:03}", n)).collect())
    }
}

impl MockDataGenerator {
    pub fn with_device_pool(device_pool: Vec<String>) -> Self {
        Self { device_pool }
    }

    pub fn device_pool(&self) -> &[String] {
        &self.device_pool
    }

    /// Newest-first list of at most `min(limit, MAX_MOCK_ALERTS)` alerts.
    pub fn alerts(&self, limit: usize) -> Vec<Alert> {
        let mut rng = rand::rng();
        let now = Utc::now();

        (0..limit.min(MAX_MOCK_ALERTS))
            .map(|index| {
                let (rule_id, message) = *RULES.choose(&mut rng).unwrap_or(&RULES[0]);
                let device_id = self
                    .device_pool
                    .choose(&mut rng)
                    .cloned()
                    .unwrap_or_else(|| "device-000".to_string());

                Alert {
                    id: Some(format!("mock_{:03}", index)),
                    device_id,
                    severity: weighted_severity(&mut rng),
                    message: message.to_string(),
                    timestamp: Some(alert_time(now, index, rng.random_range(0..60))),
                    rule_id: Some(rule_id.to_string()),
                    value: Some(round2(rng.random_range(0.0..100.0))),
                    threshold: Some(round2(rng.random_range(50.0..90.0))),
                }
            })
            .collect()
    }

    /// Newest-first analytics history, one point per minute.
    pub fn analytics(&self, limit: usize) -> Vec<AnalyticsPoint> {
        let mut rng = rand::rng();
        let now = Utc::now();
        let total = self.device_pool.len().max(1) as f64;

        (0..limit)
            .map(|index| {
                let offline = rng.random_range(0..=(total as u32 / 4)) as f64;
                AnalyticsPoint {
                    timestamp: Some(now - Duration::minutes(index as i64)),
                    total_devices: total,
                    online_devices: total - offline,
                    battery_avg: round2(rng.random_range(50.0..95.0) - index as f64 * 0.1),
                    signal_avg: round2(rng.random_range(55.0..95.0)),
                }
            })
            .collect()
    }
}

/// INFO 50%, WARNING 35%, CRITICAL 15%
fn weighted_severity<R: Rng>(rng: &mut R) -> Severity {
    match rng.random_range(0..100) {
        0..50 => Severity::Info,
        50..85 => Severity::Warning,
        _ => Severity::Critical,
    }
}

/// Jitter stays below the spacing so the list remains strictly descending.
fn alert_time(now: DateTime<Utc>, index: usize, jitter_secs: i64) -> DateTime<Utc> {
    now - Duration::minutes(index as i64 * ALERT_SPACING_MINUTES) - Duration::seconds(jitter_secs)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceStatus;

    #[tokio::test]
    async fn test_initial_status() {
        let client = MockClient::new();
        let status = client.get_status(Service::Simulator).await.unwrap();

        assert_eq!(status["state"], "STOPPED");
        assert_eq!(status["deviceCount"], 10);
        assert_eq!(status["rate"], 5);
    }

    #[tokio::test]
    async fn test_set_config_round_trip() {
        let client = MockClient::new();
        let payload = json!({"method": "ParallelStream", "batchSize": 250});

        let echoed = client.set_config(Service::Analytics, &payload).await.unwrap();
        assert_eq!(echoed["method"], "ParallelStream");
        assert_eq!(echoed["batchSize"], 250);

        let status = client.get_status(Service::Analytics).await.unwrap();
        for (key, value) in payload.as_object().unwrap() {
            assert_eq!(&status[key], value);
        }
    }

    #[tokio::test]
    async fn test_set_config_rejects_non_object() {
        let client = MockClient::new();
        let err = client.set_config(Service::Simulator, &json!([1])).await.unwrap_err();
        assert_eq!(err.kind(), "bad-status");
    }

    #[tokio::test]
    async fn test_start_stop_toggles_state() {
        let client = MockClient::new();

        client.start_stop(Service::Simulator, RunState::Running).await.unwrap();
        let status = ServiceStatus::from_json(&client.get_status(Service::Simulator).await.unwrap()).unwrap();
        assert_eq!(status.state, RunState::Running);

        // Other services keep their own state
        let analytics = client.get_status(Service::Analytics).await.unwrap();
        assert_eq!(analytics["state"], "STOPPED");

        client.start_stop(Service::Simulator, RunState::Stopped).await.unwrap();
        let status = client.get_status(Service::Simulator).await.unwrap();
        assert_eq!(status["state"], "STOPPED");
    }

    #[test]
    fn test_generated_alerts_shape() {
        let generator = MockDataGenerator::default();
        let alerts = generator.alerts(40);

        assert_eq!(alerts.len(), 40);
        for alert in &alerts {
            assert!(Severity::ALL.contains(&alert.severity));
            assert!(generator.device_pool().contains(&alert.device_id));
            assert!(alert.timestamp.is_some());
        }
        for pair in alerts.windows(2) {
            assert!(pair[0].timestamp > pair[1].timestamp);
        }
    }

    #[test]
    fn test_generated_alerts_are_bounded() {
        let generator = MockDataGenerator::default();
        assert_eq!(generator.alerts(500).len(), MAX_MOCK_ALERTS);
        assert!(generator.alerts(0).is_empty());
    }

    #[test]
    fn test_custom_device_pool() {
        let pool = vec!["a".to_string(), "b".to_string()];
        let generator = MockDataGenerator::with_device_pool(pool.clone());
        assert!(generator.alerts(30).iter().all(|a| pool.contains(&a.device_id)));
    }

    #[test]
    fn test_severity_weighting_favours_info() {
        let mut rng = rand::rng();
        let mut counts: HashMap<Severity, usize> = HashMap::new();
        for _ in 0..3000 {
            *counts.entry(weighted_severity(&mut rng)).or_default() += 1;
        }

        let critical = counts.get(&Severity::Critical).copied().unwrap_or(0);
        let info = counts.get(&Severity::Info).copied().unwrap_or(0);
        assert!(critical > 0);
        assert!(info > critical);
    }

    #[test]
    fn test_generated_analytics() {
        let points = MockDataGenerator::default().analytics(10);
        assert_eq!(points.len(), 10);
        assert!(points.iter().all(|p| p.online_devices <= p.total_devices));
    }
}
