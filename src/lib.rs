pub mod catalog;
pub mod config;
pub mod error;
pub mod formats;
pub mod handlers;
pub mod index;
pub mod interval;
pub mod types;

pub use catalog::{CatalogOptions, ResourceCatalog, build_catalog};
pub use config::Config;
pub use error::{Error, Result};
