use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One of the controllable backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Simulator,
    Analytics,
    Controller,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Simulator, Service::Analytics, Service::Controller];

    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Simulator => "simulator",
            Service::Analytics => "analytics",
            Service::Controller => "controller",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simulator" => Ok(Service::Simulator),
            "analytics" => Ok(Service::Analytics),
            "controller" => Ok(Service::Controller),
            other => Err(format!("unknown service '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunState {
    Running,
    Stopped,
    Unknown,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }

    /// Path segment of the backend call that moves a service into this state.
    pub fn action(&self) -> &'static str {
        match self {
            RunState::Running => "start",
            _ => "stop",
        }
    }
}

impl From<&str> for RunState {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "RUNNING" | "STARTED" | "ACTIVE" | "UP" => RunState::Running,
            "STOPPED" | "IDLE" | "INACTIVE" | "DOWN" => RunState::Stopped,
            _ => RunState::Unknown,
        }
    }
}

impl From<bool> for RunState {
    fn from(running: bool) -> Self {
        if running { RunState::Running } else { RunState::Stopped }
    }
}

/// Processing strategies the analytics engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingMethod {
    Sequential,
    Flowable,
    Observable,
    CustomCollector,
    ParallelStream,
}

impl ProcessingMethod {
    pub const ALL: [ProcessingMethod; 5] = [
        ProcessingMethod::Sequential,
        ProcessingMethod::Flowable,
        ProcessingMethod::Observable,
        ProcessingMethod::CustomCollector,
        ProcessingMethod::ParallelStream,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMethod::Sequential => "Sequential",
            ProcessingMethod::Flowable => "Flowable",
            ProcessingMethod::Observable => "Observable",
            ProcessingMethod::CustomCollector => "CustomCollector",
            ProcessingMethod::ParallelStream => "ParallelStream",
        }
    }
}

impl fmt::Display for ProcessingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['_', '-'], "").to_lowercase();
        ProcessingMethod::ALL
            .into_iter()
            .find(|m| m.as_str().to_lowercase() == wanted)
            .ok_or_else(|| format!("unsupported processing method '{}'", s))
    }
}

pub const DEVICE_COUNT_RANGE: (u32, u32) = (1, 10_000);
pub const RATE_RANGE: (u32, u32) = (1, 1_000);
pub const BATCH_SIZE_RANGE: (u32, u32) = (1, 100_000);

fn check_range(name: &str, value: u32, (min, max): (u32, u32)) -> Result<(), String> {
    if value < min || value > max {
        return Err(format!("{} must be between {} and {}, got {}", name, min, max, value));
    }
    Ok(())
}

/// Settable fields of the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorConfig {
    pub device_count: u32,
    pub rate: u32,
}

impl SimulatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_range("deviceCount", self.device_count, DEVICE_COUNT_RANGE)?;
        check_range("rate", self.rate, RATE_RANGE)
    }
}

/// Settable fields of the analytics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsConfig {
    pub method: ProcessingMethod,
    pub batch_size: u32,
}

impl AnalyticsConfig {
    pub fn validate(&self) -> Result<(), String> {
        check_range("batchSize", self.batch_size, BATCH_SIZE_RANGE)
    }
}

/// Last reported state of a backend service.
///
/// Every field besides `state` is optional because each service reports a
/// different subset. Fields that were present but unusable are listed in
/// `warnings` instead of failing the whole status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub state: RunState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<ProcessingMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

impl Default for ServiceStatus {
    fn default() -> Self {
        Self {
            state: RunState::Unknown,
            device_count: None,
            rate: None,
            method: None,
            batch_size: None,
            warnings: Vec::new(),
        }
    }
}

impl ServiceStatus {
    /// Parse a status body. Only a non-object body is an error.
    pub fn from_json(body: &Value) -> Result<Self, String> {
        let obj = body
            .as_object()
            .ok_or_else(|| format!("expected a JSON object, got {}", json_type(body)))?;

        let mut status = ServiceStatus::default();

        if let Some(state) = obj.get("state") {
            match state {
                Value::String(s) => status.state = RunState::from(s.as_str()),
                Value::Bool(b) => status.state = RunState::from(*b),
                other => status.warn("state", other),
            }
        } else if let Some(running) = obj.get("running") {
            match running {
                Value::Bool(b) => status.state = RunState::from(*b),
                other => status.warn("running", other),
            }
        }

        status.device_count = status.read_u32(obj, &["deviceCount"]);
        status.rate = status.read_u32(obj, &["rate", "messagesPerSecond"]);
        status.batch_size = status.read_u32(obj, &["batchSize"]);

        if let Some(method) = obj.get("method") {
            match method.as_str().map(ProcessingMethod::from_str) {
                Some(Ok(m)) => status.method = Some(m),
                _ => status.warn("method", method),
            }
        }

        Ok(status)
    }

    fn read_u32(&mut self, obj: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
        let (key, value) = keys.iter().find_map(|k| obj.get(*k).map(|v| (*k, v)))?;
        let parsed = match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        if parsed.is_none() && !value.is_null() {
            self.warn(key, value);
        }
        parsed
    }

    fn warn(&mut self, field: &str, value: &Value) {
        self.warnings
            .push(format!("field '{}' has unusable value {}", field, value));
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_from_str() {
        assert_eq!("Simulator".parse::<Service>(), Ok(Service::Simulator));
        assert_eq!(" analytics ".parse::<Service>(), Ok(Service::Analytics));
        assert!("database".parse::<Service>().is_err());
    }

    #[test]
    fn test_processing_method_is_case_insensitive() {
        assert_eq!("SEQUENTIAL".parse::<ProcessingMethod>(), Ok(ProcessingMethod::Sequential));
        assert_eq!("parallel_stream".parse::<ProcessingMethod>(), Ok(ProcessingMethod::ParallelStream));
        assert_eq!("CustomCollector".parse::<ProcessingMethod>(), Ok(ProcessingMethod::CustomCollector));
        assert!("Reactive".parse::<ProcessingMethod>().is_err());
    }

    #[test]
    fn test_status_from_state_shape() {
        let status = ServiceStatus::from_json(&json!({
            "state": "RUNNING",
            "deviceCount": 12,
            "rate": 4
        }))
        .unwrap();

        assert_eq!(status.state, RunState::Running);
        assert_eq!(status.device_count, Some(12));
        assert_eq!(status.rate, Some(4));
        assert!(status.warnings.is_empty());
    }

    #[test]
    fn test_status_from_legacy_shape() {
        let status = ServiceStatus::from_json(&json!({
            "running": false,
            "method": "FLOWABLE",
            "batchSize": "250"
        }))
        .unwrap();

        assert_eq!(status.state, RunState::Stopped);
        assert_eq!(status.method, Some(ProcessingMethod::Flowable));
        assert_eq!(status.batch_size, Some(250));
    }

    #[test]
    fn test_status_field_level_warnings() {
        let status = ServiceStatus::from_json(&json!({
            "state": "RUNNING",
            "deviceCount": "many",
            "method": 7
        }))
        .unwrap();

        assert_eq!(status.state, RunState::Running);
        assert_eq!(status.device_count, None);
        assert_eq!(status.warnings.len(), 2);
    }

    #[test]
    fn test_status_rejects_non_object() {
        let err = ServiceStatus::from_json(&json!([1, 2])).unwrap_err();
        assert!(err.contains("an array"));
    }

    #[test]
    fn test_config_validation() {
        assert!(SimulatorConfig { device_count: 10, rate: 5 }.validate().is_ok());
        assert!(SimulatorConfig { device_count: 0, rate: 5 }.validate().is_err());
        assert!(SimulatorConfig { device_count: 10, rate: 1001 }.validate().is_err());
        assert!(
            AnalyticsConfig { method: ProcessingMethod::Observable, batch_size: 0 }
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_analytics_config_wire_shape() {
        let cfg = AnalyticsConfig { method: ProcessingMethod::ParallelStream, batch_size: 20 };
        assert_eq!(
            serde_json::to_value(&cfg).unwrap(),
            json!({"method": "ParallelStream", "batchSize": 20})
        );
    }
}
