//! # Catalog Sync Core
//!
//! Pure, I/O-free logic for Catalog Sync: product models, the
//! product → index document transform, index settings, and webhook
//! signature computation.
//!
//! This crate contains no tokio, HTTP, or filesystem dependencies. Everything
//! here is deterministic, which is what makes repeated webhook deliveries
//! safe to replay against the index.

pub mod error;
pub mod models;
pub mod settings;
pub mod signature;
pub mod transform;

pub use error::TransformError;
pub use models::{IndexDocument, ProductId, ProductImage, ProductRecord};
pub use settings::{FieldMapping, IndexSettings};
