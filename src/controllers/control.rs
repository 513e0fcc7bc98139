use actix_web::{HttpResponse, Responder, get, post, web};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::parse_service;
use crate::errors::DashboardError;
use crate::panels::ServiceView;
use crate::state::AppState;

#[derive(Serialize)]
struct ControlOverview {
    mode: &'static str,
    services: Vec<ServiceView>,
}

// Status of every service
#[get("/api/control")]
pub async fn list_services(data: web::Data<AppState>) -> impl Responder {
    info!("Request for the status of all services");
    let services = data.control.refresh_all().await;

    HttpResponse::Ok().json(ControlOverview {
        mode: data.control.mode(),
        services,
    })
}

// Refresh one service
#[get("/api/control/{service}")]
pub async fn get_service(
    data: web::Data<AppState>,
    service: web::Path<String>,
) -> Result<HttpResponse, DashboardError> {
    let service = parse_service(&service)?;
    info!("Request for the status of {}", service);

    Ok(HttpResponse::Ok().json(data.control.refresh(service).await))
}

// Submit a configuration form
#[post("/api/control/{service}/config")]
pub async fn submit_config(
    data: web::Data<AppState>,
    service: web::Path<String>,
    form: web::Json<Value>,
) -> Result<HttpResponse, DashboardError> {
    let service = parse_service(&service)?;
    info!("Request to configure {}", service);

    Ok(HttpResponse::Ok().json(data.control.submit_config(service, form.into_inner()).await))
}

// Start a stopped service or stop a running one
#[post("/api/control/{service}/toggle")]
pub async fn toggle_service(
    data: web::Data<AppState>,
    service: web::Path<String>,
) -> Result<HttpResponse, DashboardError> {
    let service = parse_service(&service)?;
    info!("Request to toggle {}", service);

    Ok(HttpResponse::Ok().json(data.control.toggle(service).await))
}
