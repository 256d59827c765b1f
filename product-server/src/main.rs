mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use std::sync::Arc;

use application::product_service::ProductService;
use data::connection::{ConnectionManager, Readiness};
use data::product_repository::MongoProductRepository;
use infrastructure::config::{AppConfig, redact_uri};
use infrastructure::database::MongoConnector;
use infrastructure::logging::init_logging;
use infrastructure::panic::install_panic_handler;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env()?;
    install_panic_handler(config.swallow_uncaught_errors);

    info!(
        port = config.port,
        mongodb_uri = %redact_uri(&config.mongodb_uri),
        degraded_mode = config.degraded_mode,
        "starting product server"
    );

    let connector = MongoConnector::new(
        config.mongodb_uri.clone(),
        config.mongodb_database.clone(),
        config.server_selection_timeout,
    );
    let connections = Arc::new(ConnectionManager::new(
        connector,
        config.connection_policy(),
    ));
    let connection_task = connections.start();
    actix_web::rt::spawn(async move {
        if let Err(err) = connection_task.await {
            error!(error = %err, "datastore connection task stopped");
        }
    });

    let product_repo = Arc::new(MongoProductRepository::new(Arc::clone(&connections)));
    let product_service = ProductService::new(product_repo);
    let readiness: Arc<dyn Readiness> = connections;

    server::start_http_server(config, product_service, readiness).await
}
