// storefront_app/src/db/mod.rs

pub mod postgres;
pub mod seed;

pub use postgres::PgProductStore;
pub use seed::seed_catalog;
