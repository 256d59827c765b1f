use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::application::product_service::ProductService;
use crate::data::connection::Readiness;
use crate::data::product_repository::ProductRepository;
use crate::domain::error::{DomainError, ErrorBody};
use crate::domain::product::{Product, ProductCandidate};
use crate::presentation::dto::{CreateFallbackResponse, LIST_FALLBACK_NOTE, ListFallbackResponse};
use crate::presentation::handlers::GatewaySettings;
use crate::presentation::middleware::request_id;
use crate::presentation::mock::{self, EchoReason};

pub async fn list_products<R: ProductRepository + 'static>(
    req: HttpRequest,
    service: web::Data<ProductService<R>>,
    readiness: web::Data<dyn Readiness>,
    settings: web::Data<GatewaySettings>,
) -> Result<HttpResponse, DomainError> {
    let request_id = request_id(&req);
    info!(request_id = %request_id, "GET /api/products called");

    if settings.degraded_mode && !readiness.is_ready() {
        info!(request_id = %request_id, "datastore not connected, returning mock data");
        return Ok(HttpResponse::Ok().json(mock::unavailable_products()));
    }

    match service.list_products().await {
        Ok(products) => {
            info!(request_id = %request_id, count = products.len(), "products found");
            Ok(HttpResponse::Ok().json(products))
        }
        Err(err) => {
            error!(request_id = %request_id, error = %err, "error finding products");
            if !settings.degraded_mode {
                return Err(err);
            }
            Ok(HttpResponse::InternalServerError().json(ListFallbackResponse {
                error: err.to_string(),
                note: LIST_FALLBACK_NOTE,
                mock_data: mock::error_products(),
            }))
        }
    }
}

pub async fn create_product<R: ProductRepository + 'static>(
    req: HttpRequest,
    service: web::Data<ProductService<R>>,
    readiness: web::Data<dyn Readiness>,
    settings: web::Data<GatewaySettings>,
    payload: web::Json<Value>,
) -> HttpResponse {
    let request_id = request_id(&req);
    let body = payload.into_inner();
    info!(request_id = %request_id, payload = %body, "POST /api/products called");

    if settings.degraded_mode && !readiness.is_ready() {
        info!(request_id = %request_id, "datastore not connected, returning mock response");
        let echoed = mock::echo(&body, EchoReason::NotConnected, Utc::now());
        return HttpResponse::Created().json(echoed);
    }

    match save(&service, &body).await {
        Ok(product) => {
            info!(request_id = %request_id, product_id = %product.id, "product saved");
            HttpResponse::Created().json(product)
        }
        Err(err) if err.is_validation() => {
            warn!(request_id = %request_id, error = %err, "rejected invalid product");
            bad_request(&err)
        }
        Err(err) => {
            error!(request_id = %request_id, error = %err, "error saving product");
            if !settings.degraded_mode {
                return bad_request(&err);
            }
            HttpResponse::BadRequest().json(CreateFallbackResponse {
                error: err.to_string(),
                mock_response: mock::echo(&body, EchoReason::StoreFailed, Utc::now()),
            })
        }
    }
}

async fn save<R: ProductRepository + 'static>(
    service: &ProductService<R>,
    body: &Value,
) -> Result<Product, DomainError> {
    let candidate = ProductCandidate::from_json(body)?;
    service.create_product(candidate).await
}

fn bad_request(err: &DomainError) -> HttpResponse {
    let message = err.to_string();
    HttpResponse::BadRequest().json(ErrorBody {
        error: message.as_str(),
    })
}
