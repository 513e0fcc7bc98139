use actix_web::{Responder, get, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    mode: &'static str,
    version: &'static str,
}

#[get("/health")]
pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    web::Json(HealthResponse {
        status: "OK".into(),
        mode: data.control.mode(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
