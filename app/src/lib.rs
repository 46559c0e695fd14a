// storefront_app/src/lib.rs

//! HTTP front end of the storefront catalog: configuration, error mapping,
//! the PostgreSQL record store and the actix-web routes.

pub mod config;
pub mod db;
pub mod errors;
pub mod state;
pub mod web;

pub use crate::config::{AppConfig, LogFormat};
pub use crate::errors::{AppError, Result};
pub use crate::state::{build_catalog, AppState};
