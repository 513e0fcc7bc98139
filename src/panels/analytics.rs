//! Analytics trend: fleet size, availability and averages over time

use super::{Banner, Tick, Ticker, clamp_limit, clamp_refresh};
use crate::models::AnalyticsPoint;
use crate::store::AnalyticsStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendView {
    /// Oldest first, ready to plot
    pub points: Vec<AnalyticsPoint>,
    pub latest: Option<AnalyticsPoint>,
    /// Percentage of devices online at the latest point
    pub availability: Option<f64>,
    pub banner: Option<Banner>,
    pub source: String,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub refresh_seconds: u64,
    pub limit: usize,
    pub skipped: bool,
}

pub struct AnalyticsPanel {
    store: Arc<dyn AnalyticsStore>,
    refresh_default: u64,
    limit_default: usize,
    ticker: Ticker<TrendView>,
}

impl AnalyticsPanel {
    pub fn new(store: Arc<dyn AnalyticsStore>, refresh_default: u64, limit_default: usize) -> Self {
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

    /// One refresh cycle, skipped while the previous one is still running.
    pub async fn tick(&self, limit: Option<usize>, refresh_seconds: Option<u64>) -> TrendView {
        let limit = clamp_limit(limit.unwrap_or(self.limit_default));
        let refresh_seconds = clamp_refresh(refresh_seconds.unwrap_or(self.refresh_default));

        let cycle = async {
            match self.store.fetch_history(limit).await {
                Ok(points) => self.render(points, limit, refresh_seconds),
                Err(e) => {
                    warn!("Analytics history refresh failed: {}", e);
                    TrendView {
                        banner: Some(Banner::from(&e)),
                        ..self.blank(limit, refresh_seconds)
                    }
                }
            }
        };

        match self.ticker.run(cycle).await {
            Tick::Fresh(view) => view,
            Tick::Skipped(last) => TrendView {
                skipped: true,
                ..last.unwrap_or_else(|| self.blank(limit, refresh_seconds))
            },
        }
    }

    fn render(&self, mut points: Vec<AnalyticsPoint>, limit: usize, refresh_seconds: u64) -> TrendView {
        // Points without a timestamp cannot be placed on the time axis
        points.retain(|p| p.timestamp.is_some());
        points.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        if points.len() > limit {
            points.drain(..points.len() - limit);
        }

        let latest = points.last().cloned();
        let availability = latest
            .as_ref()
            .filter(|p| p.total_devices > 0.0)
            .map(|p| (p.online_devices / p.total_devices * 1000.0).round() / 10.0);

        TrendView {
            points,
            latest,
            availability,
            refreshed_at: Some(Utc::now()),
            ..self.blank(limit, refresh_seconds)
        }
    }

    fn blank(&self, limit: usize, refresh_seconds: u64) -> TrendView {
        TrendView {
            points: Vec::new(),
            latest: None,
            availability: None,
            banner: None,
            source: self.store.analytics_source(),
            refreshed_at: None,
            refresh_seconds,
            limit,
            skipped: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::store::{MockStore, StoreResult};
    use async_trait::async_trait;
    use chrono::Duration;

    struct HistoryStore(Vec<AnalyticsPoint>);

    #[async_trait]
    impl AnalyticsStore for HistoryStore {
        async fn fetch_history(&self, _limit: usize) -> StoreResult<Vec<AnalyticsPoint>> {
            Ok(self.0.clone())
        }

        fn analytics_source(&self) -> String {
            "test.analytics".to_string()
        }
    }

    struct SlowStore;

    #[async_trait]
    impl AnalyticsStore for SlowStore {
        async fn fetch_history(&self, _limit: usize) -> StoreResult<Vec<AnalyticsPoint>> {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            Ok(vec![point(Some(1), 4.0)])
        }

        fn analytics_source(&self) -> String {
            "test.analytics".to_string()
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl AnalyticsStore for BrokenStore {
        async fn fetch_history(&self, _limit: usize) -> StoreResult<Vec<AnalyticsPoint>> {
            Err(StoreError::Query("unknown collection".to_string()))
        }

        fn analytics_source(&self) -> String {
            "iot.analytics".to_string()
        }
    }

    fn point(minutes_ago: Option<i64>, online: f64) -> AnalyticsPoint {
        AnalyticsPoint {
            timestamp: minutes_ago.map(|m| Utc::now() - Duration::minutes(m)),
            total_devices: 8.0,
            online_devices: online,
            battery_avg: 70.0,
            signal_avg: 80.0,
        }
    }

    #[tokio::test]
    async fn test_trend_is_chronological() {
        let panel = AnalyticsPanel::new(
            Arc::new(HistoryStore(vec![point(Some(1), 6.0), point(Some(3), 8.0), point(None, 1.0), point(Some(2), 7.0)])),
            5,
            100,
        );

        let view = panel.tick(None, None).await;
        let online: Vec<f64> = view.points.iter().map(|p| p.online_devices).collect();
        assert_eq!(online, vec![8.0, 7.0, 6.0]);
        assert_eq!(view.latest.unwrap().online_devices, 6.0);
        assert_eq!(view.availability, Some(75.0));
    }

    #[tokio::test]
    async fn test_failure_shows_banner() {
        let view = AnalyticsPanel::new(Arc::new(BrokenStore), 5, 100).tick(None, None).await;
        assert!(view.points.is_empty());
        assert_eq!(view.banner.unwrap().kind, "datastore-query");
    }

    #[tokio::test]
    async fn test_mock_history_respects_limit() {
        let view = AnalyticsPanel::new(Arc::new(MockStore::default()), 5, 100).tick(Some(15), None).await;
        assert_eq!(view.points.len(), 15);
        assert_eq!(view.source, "mock.analytics");
        assert!(view.points.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_overlapping_tick_is_skipped() {
        let panel = Arc::new(AnalyticsPanel::new(Arc::new(SlowStore), 5, 100));

        let first = {
            let panel = panel.clone();
            tokio::spawn(async move { panel.tick(None, None).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let skipped = panel.tick(None, None).await;
        assert!(skipped.skipped);
        assert!(skipped.points.is_empty());

        let first = first.await.unwrap();
        assert!(!first.skipped);
        assert_eq!(first.points.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_interval_is_clamped() {
        let panel = AnalyticsPanel::new(Arc::new(MockStore::default()), 0, 100);
        assert_eq!(panel.refresh_default(), 1);

        assert_eq!(panel.tick(Some(5), None).await.refresh_seconds, 1);
        assert_eq!(panel.tick(Some(5), Some(300)).await.refresh_seconds, 60);
        assert_eq!(panel.tick(Some(5), Some(12)).await.refresh_seconds, 12);
    }
}
