use actix_web::{HttpResponse, Responder, get};

use crate::frontend::INDEX_HTML;

/// Serve the embedded single-page dashboard.
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}
