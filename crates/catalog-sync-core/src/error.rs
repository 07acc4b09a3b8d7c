//! Errors raised while turning a webhook payload into a product record.

use thiserror::Error;

/// A payload that cannot be mapped onto a [`ProductRecord`](crate::ProductRecord)
/// or a product id.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The raw body did not parse as JSON.
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The body parsed, but is not a JSON object.
    #[error("payload must be a JSON object")]
    NotAnObject,

    /// No `id` field, or `id` is `null`.
    #[error("payload has no product id")]
    MissingId,

    /// `id` is present but is neither a number nor a string.
    #[error("product id must be a number or a string, got {0}")]
    InvalidId(String),

    /// The object has an id but other fields have the wrong shape.
    #[error("malformed product record: {0}")]
    Malformed(#[source] serde_json::Error),
}
