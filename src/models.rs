// Data models
pub mod alert;
pub mod service;

pub use alert::{Alert, AnalyticsPoint, RowColor, Severity};
pub use service::{
    AnalyticsConfig, ProcessingMethod, RunState, Service, ServiceStatus, SimulatorConfig,
};
