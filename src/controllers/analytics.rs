use actix_web::{HttpResponse, Responder, get, web};
use serde::Deserialize;
use tracing::debug;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    /// Interval the browser is currently refreshing at, echoed back clamped
    pub refresh: Option<u64>,
}

#[get("/api/analytics/history")]
pub async fn get_history(data: web::Data<AppState>, query: web::Query<HistoryQuery>) -> impl Responder {
    debug!("Request for analytics history, limit {:?}", query.limit);

    HttpResponse::Ok().json(data.analytics.tick(query.limit, query.refresh).await)
}
