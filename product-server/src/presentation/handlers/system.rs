use actix_web::{HttpResponse, Responder, web};
use chrono::{SecondsFormat, Utc};

use crate::data::connection::Readiness;
use crate::presentation::dto::{ApiTestResponse, HealthResponse};

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Liveness probe; never touches the datastore.
pub async fn api_test() -> impl Responder {
    HttpResponse::Ok().json(ApiTestResponse {
        message: "API is working",
        time: now_iso(),
    })
}

pub async fn health(readiness: web::Data<dyn Readiness>) -> impl Responder {
    let datastore = if readiness.is_ready() {
        "connected"
    } else {
        "disconnected"
    };
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        datastore,
        timestamp: now_iso(),
    })
}
