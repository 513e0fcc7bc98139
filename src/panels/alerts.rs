//! Alerts monitor: newest alerts as severity-colored rows plus summary counts

use super::{Banner, Tick, Ticker, clamp_limit, clamp_refresh};
use crate::models::{Alert, RowColor, Severity};
use crate::store::AlertStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRow {
    pub severity: Severity,
    pub color: RowColor,
    pub device_id: String,
    pub message: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub rule_id: Option<String>,
    pub value: Option<f64>,
    pub threshold: Option<f64>,
}

impl From<Alert> for AlertRow {
    fn from(alert: Alert) -> Self {
        Self {
            color: alert.severity.color(),
            severity: alert.severity,
            device_id: alert.device_id,
            message: alert.message,
            timestamp: alert.timestamp,
            rule_id: alert.rule_id,
            value: alert.value,
            threshold: alert.threshold,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertSummary {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    /// Distinct devices among the displayed alerts
    pub devices: usize,
    pub rules: usize,
}

impl AlertSummary {
    pub fn from_rows(rows: &[AlertRow]) -> Self {
        let count = |severity: Severity| rows.iter().filter(|r| r.severity == severity).count();
        let devices: HashSet<&str> = rows.iter().map(|r| r.device_id.as_str()).collect();
        let rules: HashSet<&str> = rows.iter().filter_map(|r| r.rule_id.as_deref()).collect();

        Self {
            total: rows.len(),
            critical: count(Severity::Critical),
            warning: count(Severity::Warning),
            info: count(Severity::Info),
            devices: devices.len(),
            rules: rules.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertsView {
    pub rows: Vec<AlertRow>,
    pub summary: AlertSummary,
    pub banner: Option<Banner>,
    pub source: String,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub refresh_seconds: u64,
    pub limit: usize,
    /// True when this tick was dropped because the previous one was still running
    pub skipped: bool,
}

pub struct AlertsPanel {
    store: Arc<dyn AlertStore>,
    refresh_default: u64,
    limit_default: usize,
    ticker: Ticker<AlertsView>,
}

impl AlertsPanel {
    pub fn new(store: Arc<dyn AlertStore>, refresh_default: u64, limit_default: usize) -> Self {
        Self {
            store,
            refresh_default: clamp_refresh(refresh_default),
            limit_default: clamp_limit(limit_default),
            ticker: Ticker::new(),
        }
    }

    pub fn refresh_default(&self) -> u64 {
        self.refresh_default
    }

    pub fn limit_default(&self) -> usize {
        self.limit_default
    }

    /// One refresh cycle: query, map to rows, summarize.
    ///
    /// A store failure yields an empty table with an error banner; the next
    /// tick tries again.
    pub async fn tick(&self, limit: Option<usize>, refresh_seconds: Option<u64>) -> AlertsView {
        let limit = clamp_limit(limit.unwrap_or(self.limit_default));
        let refresh_seconds = clamp_refresh(refresh_seconds.unwrap_or(self.refresh_default));

        let cycle = async {
            match self.store.fetch_alerts(limit).await {
                Ok(alerts) => self.render(alerts, limit, refresh_seconds),
                Err(e) => {
                    warn!("Alerts refresh failed: {}", e);
                    AlertsView {
                        banner: Some(Banner::from(&e)),
                        ..self.blank(limit, refresh_seconds)
                    }
                }
            }
        };

        match self.ticker.run(cycle).await {
            Tick::Fresh(view) => view,
            Tick::Skipped(last) => AlertsView {
                skipped: true,
                ..last.unwrap_or_else(|| self.blank(limit, refresh_seconds))
            },
        }
    }

    fn render(&self, alerts: Vec<Alert>, limit: usize, refresh_seconds: u64) -> AlertsView {
        let mut rows: Vec<AlertRow> = alerts.into_iter().map(AlertRow::from).collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows.truncate(limit);

        let summary = AlertSummary::from_rows(&rows);
        debug!(
            "Rendered {} alerts ({} critical, {} warning, {} info)",
            summary.total, summary.critical, summary.warning, summary.info
        );

        AlertsView {
            rows,
            summary,
            refreshed_at: Some(Utc::now()),
            ..self.blank(limit, refresh_seconds)
        }
    }

    fn blank(&self, limit: usize, refresh_seconds: u64) -> AlertsView {
        AlertsView {
            rows: Vec::new(),
            summary: AlertSummary::default(),
            banner: None,
            source: self.store.alerts_source(),
            refreshed_at: None,
            refresh_seconds,
            limit,
            skipped: false,
        }
    }
}
