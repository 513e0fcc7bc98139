use actix_web::{HttpResponse, Responder, get, web};
use serde::Deserialize;
use tracing::debug;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub limit: Option<usize>,
    /// Interval the browser is currently refreshing at, echoed back clamped
    pub refresh: Option<u64>,
}

// Newest alerts as colored rows with summary counts
#[get("/api/alerts")]
pub async fn get_alerts(data: web::Data<AppState>, query: web::Query<AlertsQuery>) -> impl Responder {
    debug!("Request for alerts, limit {:?}", query.limit);
    let view = data.alerts.tick(query.limit, query.refresh).await;

    HttpResponse::Ok().json(view)
}
