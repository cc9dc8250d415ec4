pub mod app_config;
pub mod database;
pub mod driver_repo;
pub mod order_repo;
pub mod pricing_repo;
pub mod relocation_repo;

pub use database::DbClient;
pub use driver_repo::DriverRepository;
pub use order_repo::OrderRepository;
pub use pricing_repo::PricingRepository;
pub use relocation_repo::RelocationRepository;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}
