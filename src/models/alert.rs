use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Critical, Severity::Warning, Severity::Info];

    /// Row background used by the alerts table.
    pub fn color(&self) -> RowColor {
        match self {
            Severity::Critical => RowColor::Red,
            Severity::Warning => RowColor::Yellow,
            Severity::Info => RowColor::Green,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

impl From<&str> for Severity {
    fn from(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "INFO" | "INFORMATION" => Severity::Info,
            "WARNING" | "WARN" => Severity::Warning,
            // Anything unrecognised is surfaced as critical
            _ => Severity::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowColor {
    Red,
    Yellow,
    Green,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub device_id: String,
    pub severity: Severity,
    pub message: String,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl Alert {
    /// Map a stored alert document (as extended JSON) into an `Alert`.
    pub fn from_document(doc: &Value) -> Self {
        let severity = doc["severity"].as_str().map(Severity::from).unwrap_or(Severity::Critical);

        let timestamp = ["receivedAt", "alertTimestamp", "timestamp"]
            .iter()
            .find_map(|k| parse_timestamp(&doc[*k]));

        Alert {
            id: id_string(&doc["_id"]),
            device_id: id_string(&doc["deviceId"]).unwrap_or_else(|| "unknown".to_string()),
            severity,
            message: doc["message"].as_str().unwrap_or("").to_string(),
            timestamp,
            rule_id: doc["ruleId"].as_str().map(str::to_string),
            value: number(&doc["value"]).or_else(|| number(&doc["currentValue"])),
            threshold: number(&doc["threshold"]),
        }
    }
}

/// One point of the analytics history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsPoint {
    pub timestamp: Option<DateTime<Utc>>,
    pub total_devices: f64,
    pub online_devices: f64,
    pub battery_avg: f64,
    pub signal_avg: f64,
}

impl AnalyticsPoint {
    pub fn from_document(doc: &Value) -> Self {
        let metrics = &doc["metrics"];
        AnalyticsPoint {
            timestamp: parse_timestamp(&doc["timestamp"]),
            total_devices: number(&metrics["totalDevices"]).unwrap_or(0.0),
            online_devices: number(&metrics["onlineDevices"]).unwrap_or(0.0),
            battery_avg: number(&metrics["battery"]["avg"]).unwrap_or(0.0),
            signal_avg: number(&metrics["signal"]["avg"]).unwrap_or(0.0),
        }
    }
}

/// Accepts RFC 3339 strings, naive ISO strings (taken as UTC), epoch millis,
/// and the extended-JSON `{"$date": ...}` wrapper.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            }),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::Object(map) => map.get("$date").and_then(|inner| match inner {
            Value::Object(wrapped) => wrapped
                .get("$numberLong")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
                .and_then(DateTime::from_timestamp_millis),
            other => parse_timestamp(other),
        }),
        _ => None,
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map
            .get("$oid")
            .or_else(|| map.get("$numberLong"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        Value::Object(map) => ["$numberDouble", "$numberLong", "$numberInt"]
            .iter()
            .find_map(|k| map.get(*k))
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok()),
        _ => None,
    }
}
