use std::sync::Arc;
use tracing::info;

use crate::client::ServiceClientFactory;
use crate::config::Settings;
use crate::errors::Result;
use crate::panels::{AlertsPanel, AnalyticsPanel, ControlPanel};
use crate::store::StoreFactory;

// App state
pub struct AppState {
    pub settings: Arc<Settings>,
    pub control: ControlPanel,
    pub alerts: AlertsPanel,
    pub analytics: AnalyticsPanel,
}

impl AppState {
    /// Wire the panels to the clients selected by `settings.mock_mode`.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let client = ServiceClientFactory::create(&settings)?;
        let (alert_store, analytics_store) = StoreFactory::create(&settings);

        info!(
            "Dashboard state ready - mode: {}, alerts: {}, analytics: {}",
            client.mode(),
            alert_store.alerts_source(),
            analytics_store.analytics_source()
        );

        Ok(Self {
            control: ControlPanel::new(client),
            alerts: AlertsPanel::new(
                alert_store,
                settings.refresh_seconds_default,
                settings.alerts_limit_default,
            ),
            analytics: AnalyticsPanel::new(
                analytics_store,
                settings.refresh_seconds_default,
                settings.analytics_limit_default,
            ),
            settings: Arc::new(settings),
        })
    }
}
