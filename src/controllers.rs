// HTTP handlers for the dashboard UI and its JSON API
pub mod alerts;
pub mod analytics;
pub mod control;
pub mod health;
pub mod settings;
pub mod ui;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use serde::Serialize;
use tracing::warn;

use crate::errors::DashboardError;
use crate::models::Service;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

impl ResponseError for DashboardError {
    fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::Validation(_) => StatusCode::BAD_REQUEST,
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::Config(_) | DashboardError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let kind = match self {
            DashboardError::Validation(_) => "bad-request",
            DashboardError::NotFound(_) => "not-found",
            DashboardError::Config(_) | DashboardError::Other(_) => "internal",
        };

        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            kind,
        })
    }
}

/// Resolve the `{service}` path segment.
pub(crate) fn parse_service(name: &str) -> Result<Service, DashboardError> {
    name.parse().map_err(DashboardError::NotFound)
}

/// Register every dashboard route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        warn!("Rejected request body: {}", err);
        DashboardError::Validation(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        warn!("Rejected query string: {}", err);
        DashboardError::Validation(err.to_string()).into()
    }))
    .service(ui::index)
    .service(health::health_check)
    .service(settings::get_settings)
    .service(control::list_services)
    .service(control::get_service)
    .service(control::submit_config)
    .service(control::toggle_service)
    .service(alerts::get_alerts)
    .service(analytics::get_history);
}
