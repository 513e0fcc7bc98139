//! IoT Monitoring Dashboard Library
//!
//! This library provides the pieces behind the dashboard: configuration
//! resolution, clients for the simulator, analytics and controller services,
//! read access to the alert store, and the panels rendered by the web UI.

pub mod client;
pub mod config;
pub mod controllers;
pub mod errors;
pub mod frontend;
pub mod mock;
pub mod models;
pub mod panels;
pub mod state;
pub mod store;
pub mod transport;

pub use client::{ServiceClient, ServiceClientFactory};
pub use config::Settings;
pub use errors::{ClientError, DashboardError, Result, StoreError};
pub use state::AppState;
pub use store::{AlertStore, AnalyticsStore, StoreFactory};
