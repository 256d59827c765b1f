use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::data::product_repository::ProductRepository;
use crate::domain::error::DomainError;
use crate::domain::product::{NewProduct, Product};

/// Test double with switchable read/write failures.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
    writes: AtomicUsize,
    reads: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn insert(&self, product: NewProduct) -> Result<Product, DomainError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::Store("write concern error".into()));
        }
        let product = product.with_id(Uuid::new_v4().simple().to_string());
        self.products.write().await.push(product.clone());
        Ok(product)
    }

    async fn list_newest_first(&self) -> Result<Vec<Product>, DomainError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::Store("connection reset by peer".into()));
        }
        let mut products = self.products.read().await.clone();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }
}
