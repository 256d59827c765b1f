use std::sync::Arc;

use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::middleware::DefaultHeaders;
use actix_web::{App, HttpResponse, HttpServer, web};
use tracing::{info, warn};

use crate::application::product_service::ProductService;
use crate::data::connection::Readiness;
use crate::data::product_repository::ProductRepository;
use crate::domain::error::ErrorBody;
use crate::infrastructure::config::AppConfig;
use crate::presentation::handlers::{self, GatewaySettings};
use crate::presentation::middleware::{RequestIdMiddleware, TimingMiddleware};

pub fn configure<R: ProductRepository + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/test", web::get().to(handlers::system::api_test))
            .route("/health", web::get().to(handlers::system::health))
            .service(
                web::resource("/products")
                    .route(web::get().to(handlers::product::list_products::<R>))
                    .route(web::post().to(handlers::product::create_product::<R>)),
            ),
    );
}

/// Bodies are parsed as JSON whatever their content type; malformed ones
/// become `400 {error}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .content_type(|_| true)
        .error_handler(|err, _req| {
            let message = err.to_string();
            warn!(error = %message, "rejected request body");
            let response = HttpResponse::BadRequest().json(ErrorBody {
                error: message.as_str(),
            });
            InternalError::from_response(err, response).into()
        })
}

pub async fn start_http_server<R: ProductRepository + 'static>(
    config: AppConfig,
    product_service: ProductService<R>,
    readiness: Arc<dyn Readiness>,
) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);
    let settings = GatewaySettings {
        degraded_mode: config.degraded_mode,
    };

    info!(
        host = %bind_address.0,
        port = bind_address.1,
        degraded_mode = settings.degraded_mode,
        "HTTP server starting"
    );

    HttpServer::new(move || {
        let cors = build_cors(&config);

        App::new()
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("Referrer-Policy", "no-referrer"))
                    .add(("Cross-Origin-Opener-Policy", "same-origin")),
            )
            .wrap(cors)
            .app_data(json_config())
            .app_data(web::Data::new(product_service.clone()))
            .app_data(web::Data::from(Arc::clone(&readiness)))
            .app_data(web::Data::new(settings))
            .configure(configure::<R>)
    })
    .bind(bind_address)?
    .run()
    .await
    .map_err(anyhow::Error::new)?;

    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![actix_web::http::header::CONTENT_TYPE])
        .max_age(3600);

    if config.cors_origins.is_empty() {
        cors = cors.allow_any_origin();
    }
    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}
