pub mod connection;
#[cfg(test)]
pub mod memory_repository;
pub mod product_repository;
