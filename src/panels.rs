//! Server-side state and view models of the dashboard panels
//!
//! Each panel owns its own mutable view and replaces it wholesale on every
//! refresh. The only thing shared between panels is the immutable `Settings`.

pub mod alerts;
pub mod analytics;
pub mod control;

pub use alerts::{AlertRow, AlertSummary, AlertsPanel, AlertsView};
pub use analytics::{AnalyticsPanel, TrendView};
pub use control::{ControlPanel, ServiceView};

use crate::errors::{ClientError, StoreError};
use serde::Serialize;
use std::future::Future;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

pub const REFRESH_SECONDS_RANGE: (u64, u64) = (1, 60);
pub const LIMIT_RANGE: (usize, usize) = (1, 1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerLevel {
    Success,
    Warning,
    Error,
}

/// User-facing message rendered above a panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub level: BannerLevel,
    pub kind: String,
    pub message: String,
}

impl Banner {
    pub fn new(level: BannerLevel, kind: &str, message: impl Into<String>) -> Self {
        Self {
            level,
            kind: kind.to_string(),
            message: message.into(),
        }
    }

    pub fn error(kind: &str, message: impl Into<String>) -> Self {
        Self::new(BannerLevel::Error, kind, message)
    }

    pub fn warning(kind: &str, message: impl Into<String>) -> Self {
        Self::new(BannerLevel::Warning, kind, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(BannerLevel::Success, "ok", message)
    }
}

impl From<&ClientError> for Banner {
    fn from(err: &ClientError) -> Self {
        Banner::error(err.kind(), err.to_string())
    }
}

impl From<&StoreError> for Banner {
    fn from(err: &StoreError) -> Self {
        let kind = match err {
            StoreError::Connection(_) => "datastore-unreachable",
            StoreError::Query(_) => "datastore-query",
        };
        Banner::error(kind, err.to_string())
    }
}

pub enum Tick<V> {
    Fresh(V),
    /// A previous tick was still in flight; carries the last rendered view
    Skipped(Option<V>),
}

/// One fetch-and-render cycle at a time, remembering the last rendered view
pub struct Ticker<V> {
    in_flight: Mutex<()>,
    last: RwLock<Option<V>>,
}

impl<V: Clone> Ticker<V> {
    pub fn new() -> Self {
        Self {
            in_flight: Mutex::new(()),
            last: RwLock::new(None),
        }
    }

    pub async fn run<Fut>(&self, cycle: Fut) -> Tick<V>
    where
        Fut: Future<Output = V>,
    {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("Previous refresh still in flight, skipping tick");
            return Tick::Skipped(self.last.read().await.clone());
        };

        let view = cycle.await;
        *self.last.write().await = Some(view.clone());
        Tick::Fresh(view)
    }
}

impl<V: Clone> Default for Ticker<V> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn clamp_refresh(seconds: u64) -> u64 {
    seconds.clamp(REFRESH_SECONDS_RANGE.0, REFRESH_SECONDS_RANGE.1)
}

pub fn clamp_limit(limit: usize) -> usize {
    limit.clamp(LIMIT_RANGE.0, LIMIT_RANGE.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_clamping() {
        assert_eq!(clamp_refresh(0), 1);
        assert_eq!(clamp_refresh(30), 30);
        assert_eq!(clamp_refresh(600), 60);
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(5000), 1000);
    }

    #[test]
    fn test_banner_from_errors() {
        let banner = Banner::from(&ClientError::Timeout { url: "http://x".to_string() });
        assert_eq!(banner.level, BannerLevel::Error);
        assert_eq!(banner.kind, "timeout");

        let banner = Banner::from(&StoreError::Connection("refused".to_string()));
        assert_eq!(banner.kind, "datastore-unreachable");
    }

    #[tokio::test]
    async fn test_ticker_skips_overlapping_ticks() {
        let ticker = Arc::new(Ticker::<u32>::new());

        let slow = {
            let ticker = ticker.clone();
            tokio::spawn(async move {
                ticker
                    .run(async {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        1
                    })
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(matches!(ticker.run(async { 2 }).await, Tick::Skipped(None)));

        assert!(matches!(slow.await.unwrap(), Tick::Fresh(1)));
        assert!(matches!(ticker.run(async { 3 }).await, Tick::Fresh(3)));
        assert_eq!(*ticker.last.read().await, Some(3));
    }
}
