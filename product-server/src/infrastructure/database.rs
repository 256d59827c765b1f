use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use tracing::info;

use crate::data::connection::Connector;
use crate::domain::error::DomainError;
use crate::infrastructure::config::redact_uri;

pub const DEFAULT_DATABASE: &str = "productdb";

pub struct MongoConnector {
    uri: String,
    database: Option<String>,
    server_selection_timeout: Duration,
}

impl MongoConnector {
    pub fn new(uri: String, database: Option<String>, server_selection_timeout: Duration) -> Self {
        Self {
            uri,
            database,
            server_selection_timeout,
        }
    }
}

#[async_trait]
impl Connector for MongoConnector {
    type Handle = Database;

    async fn connect(&self) -> Result<Database, DomainError> {
        let mut options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|e| DomainError::Connection(e.to_string()))?;
        options.server_selection_timeout = Some(self.server_selection_timeout);
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let name = self
            .database
            .clone()
            .or_else(|| options.default_database.clone())
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());
        let client =
            Client::with_options(options).map_err(|e| DomainError::Connection(e.to_string()))?;
        let database = client.database(&name);

        // The driver connects lazily; ping forces server selection.
        self.ping(&database).await?;
        info!(database = %name, "connected to MongoDB");
        Ok(database)
    }

    async fn ping(&self, handle: &Database) -> Result<(), DomainError> {
        handle
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| DomainError::Connection(e.to_string()))
    }

    fn describe(&self) -> String {
        redact_uri(&self.uri)
    }
}
