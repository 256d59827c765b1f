use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use crate::data::product_repository::ProductRepository;
use crate::domain::error::DomainError;
use crate::domain::product::{Product, ProductCandidate};

pub struct ProductService<R: ProductRepository + 'static> {
    repo: Arc<R>,
}

impl<R: ProductRepository + 'static> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R> ProductService<R>
where
    R: ProductRepository + 'static,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.repo.list_newest_first().await
    }

    /// Validates before touching the repository; invalid candidates never
    /// cause a write.
    #[instrument(skip(self))]
    pub async fn create_product(&self, candidate: ProductCandidate) -> Result<Product, DomainError> {
        let product = candidate.validate(Utc::now())?;
        self.repo.insert(product).await
    }
}
