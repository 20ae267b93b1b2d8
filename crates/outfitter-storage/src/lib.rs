//! Outfitter storage crate - SQLite persistence for the product catalog.
//!
//! Provides a WAL-mode SQLite database with migrations, the product
//! repository, and starter catalog seeding.

pub mod db;
pub mod migrations;
pub mod repository;
pub mod seed;

pub use db::Database;
pub use repository::{NewProduct, ProductRepository};
pub use seed::seed_catalog;
