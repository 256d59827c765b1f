use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::data::connection::ConnectionManager;
use crate::domain::error::DomainError;
use crate::domain::product::{NewProduct, Product};
use crate::infrastructure::database::MongoConnector;

pub const PRODUCTS_COLLECTION: &str = "products";

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: NewProduct) -> Result<Product, DomainError>;
    async fn list_newest_first(&self) -> Result<Vec<Product>, DomainError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
}

impl ProductDocument {
    fn new(id: ObjectId, product: NewProduct) -> Self {
        Self {
            id,
            name: product.name,
            price: product.price,
            description: product.description,
            created_at: bson::DateTime::from_millis(product.created_at.timestamp_millis()),
        }
    }
}

impl TryFrom<ProductDocument> for Product {
    type Error = DomainError;

    fn try_from(document: ProductDocument) -> Result<Self, Self::Error> {
        let millis = document.created_at.timestamp_millis();
        let created_at = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            DomainError::Store(format!(
                "product {} has an out of range createdAt ({millis})",
                document.id
            ))
        })?;

        Ok(Product {
            id: document.id.to_hex(),
            name: document.name,
            price: document.price,
            description: document.description,
            created_at,
        })
    }
}

#[derive(Clone)]
pub struct MongoProductRepository {
    connections: Arc<ConnectionManager<MongoConnector>>,
}

impl MongoProductRepository {
    pub fn new(connections: Arc<ConnectionManager<MongoConnector>>) -> Self {
        Self { connections }
    }

    async fn collection(&self) -> Result<Collection<ProductDocument>, DomainError> {
        self.connections
            .handle()
            .await
            .map(|db: Database| db.collection(PRODUCTS_COLLECTION))
            .ok_or_else(|| DomainError::Store("MongoDB connection is not established".into()))
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    async fn insert(&self, product: NewProduct) -> Result<Product, DomainError> {
        let collection = self.collection().await?;
        let document = ProductDocument::new(ObjectId::new(), product);

        collection.insert_one(&document).await.map_err(|e| {
            error!("failed to save product: {}", e);
            DomainError::Store(e.to_string())
        })?;

        info!(product_id = %document.id, name = %document.name, "product saved");
        Product::try_from(document)
    }

    async fn list_newest_first(&self) -> Result<Vec<Product>, DomainError> {
        let collection = self.collection().await?;
        let documents: Vec<ProductDocument> = collection
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .await
            .map_err(|e| {
                error!("db error while finding products: {}", e);
                DomainError::Store(e.to_string())
            })?
            .try_collect()
            .await
            .map_err(|e| {
                error!("db error while reading products: {}", e);
                DomainError::Store(e.to_string())
            })?;

        documents.into_iter().map(Product::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn document_round_trips_to_millisecond_precision() {
        let created_at = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .unwrap()
            .checked_add_signed(chrono::Duration::microseconds(1_234_567))
            .unwrap();
        let id = ObjectId::new();
        let document = ProductDocument::new(
            id,
            NewProduct {
                name: "Widget".into(),
                price: 9.99,
                description: Some("blue".into()),
                created_at,
            },
        );

        let product = Product::try_from(document).unwrap();
        assert_eq!(product.id, id.to_hex());
        assert_eq!(product.description.as_deref(), Some("blue"));
        assert_eq!(
            product.created_at.timestamp_millis(),
            created_at.timestamp_millis()
        );
    }

    #[test]
    fn stored_document_uses_odm_field_names() {
        let document = ProductDocument::new(
            ObjectId::new(),
            NewProduct {
                name: "Widget".into(),
                price: 2.0,
                description: None,
                created_at: Utc::now(),
            },
        );
        let stored = bson::to_document(&document).unwrap();
        assert!(stored.contains_key("_id"));
        assert!(stored.contains_key("createdAt"));
        assert!(!stored.contains_key("description"));
    }

    #[test]
    fn legacy_documents_with_extra_fields_are_read() {
        let raw = doc! {
            "_id": ObjectId::new(),
            "name": "Old",
            "price": 5_i32,
            "createdAt": bson::DateTime::from_millis(0),
            "__v": 0,
        };
        let document: ProductDocument = bson::from_document(raw).unwrap();
        let product = Product::try_from(document).unwrap();
        assert_eq!(product.price, 5.0);
    }
}
