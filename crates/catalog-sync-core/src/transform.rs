//! Product → index document transform.
//!
//! The transform is a pure function of its input: the same product always
//! yields the same document, and the document `_id` depends only on the
//! product id. Re-delivered webhooks therefore overwrite the same index
//! entry with the same content.
//!
//! # Example
//!
//! ```rust
//! use catalog_sync_core::transform::{parse_product, to_index_document};
//!
//! let body = serde_json::json!({
//!     "id": 101,
//!     "title": "Tee",
//!     "images": [{ "src": "https://x/1.jpg" }],
//!     "vendor": "Acme",
//!     "product_type": "Shirt",
//!     "tags": ["new"]
//! });
//! let product = parse_product(body).unwrap();
//! let doc = to_index_document(&product);
//! assert_eq!(doc.id, "101");
//! assert_eq!(doc.image_url, "https://x/1.jpg");
//! ```

use serde_json::Value;

use crate::error::TransformError;
use crate::models::{IndexDocument, ProductId, ProductRecord};

/// The index `_id` for a product id.
///
/// Upserts and deletes both go through this function so that they address
/// the same document.
pub fn document_id(id: &ProductId) -> String {
    id.to_string()
}

/// Map a product onto the index document schema.
///
/// Only the first image is used; a product without images gets an empty
/// `image_url`.
pub fn to_index_document(product: &ProductRecord) -> IndexDocument {
    IndexDocument {
        id: document_id(&product.id),
        name: product.title.clone(),
        image_url: product
            .images
            .first()
            .map(|image| image.src.clone())
            .unwrap_or_default(),
        vendor: product.vendor.clone(),
        product_type: product.product_type.clone(),
        tags: product.tags.clone(),
    }
}

/// Decode a create/update webhook body into a [`ProductRecord`].
pub fn parse_product(body: Value) -> Result<ProductRecord, TransformError> {
    parse_product_id(&body)?;
    serde_json::from_value(body).map_err(TransformError::Malformed)
}

/// Extract the product id from a webhook body.
///
/// Delete webhooks carry little more than the id, so this is all the delete
/// path looks at.
pub fn parse_product_id(body: &Value) -> Result<ProductId, TransformError> {
    let object = body.as_object().ok_or(TransformError::NotAnObject)?;

    match object.get("id") {
        None | Some(Value::Null) => Err(TransformError::MissingId),
        Some(Value::Number(n)) => Ok(ProductId::Number(n.clone())),
        Some(Value::String(s)) => Ok(ProductId::Text(s.clone())),
        Some(other) => Err(TransformError::InvalidId(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductImage;
    use serde_json::json;

    fn tee() -> ProductRecord {
        ProductRecord {
            id: ProductId::from(101u64),
            title: "Tee".to_string(),
            images: vec![
                ProductImage {
                    src: "https://x/1.jpg".to_string(),
                },
                ProductImage {
                    src: "https://x/2.jpg".to_string(),
                },
            ],
            vendor: "Acme".to_string(),
            product_type: "Shirt".to_string(),
            tags: vec!["new".to_string()],
        }
    }

    #[test]
    fn test_transform_maps_fields() {
        let doc = to_index_document(&tee());
        assert_eq!(
            doc,
            IndexDocument {
                id: "101".to_string(),
                name: "Tee".to_string(),
                image_url: "https://x/1.jpg".to_string(),
                vendor: "Acme".to_string(),
                product_type: "Shirt".to_string(),
                tags: vec!["new".to_string()],
            }
        );
    }

    #[test]
    fn test_transform_deterministic_and_non_mutating() {
        let product = tee();
        let before = product.clone();
        let a = to_index_document(&product);
        let b = to_index_document(&product);
        assert_eq!(a, b);
        assert_eq!(product, before);
    }

    #[test]
    fn test_transform_without_images() {
        let mut product = tee();
        product.images.clear();
        assert_eq!(to_index_document(&product).image_url, "");
    }

    #[test]
    fn test_id_stringified_for_numeric_and_text() {
        let mut product = tee();
        product.id = ProductId::from(42u64);
        assert_eq!(to_index_document(&product).id, "42");

        product.id = ProductId::from("42");
        assert_eq!(to_index_document(&product).id, "42");
    }

    #[test]
    fn test_delete_and_upsert_share_id() {
        let body = json!({ "id": 42, "title": "Cap" });
        let product = parse_product(body.clone()).unwrap();
        let delete_id = parse_product_id(&body).unwrap();
        assert_eq!(document_id(&delete_id), to_index_document(&product).id);
        assert_eq!(document_id(&delete_id), "42");
    }

    #[test]
    fn test_float_form_id_matches_integer_id() {
        let body = json!({ "id": 101.0, "title": "Tee" });
        let product = parse_product(body.clone()).unwrap();
        assert_eq!(to_index_document(&product).id, "101");
        assert_eq!(document_id(&parse_product_id(&body).unwrap()), "101");

        let body: Value = serde_json::from_str(r#"{"id":1e2}"#).unwrap();
        assert_eq!(document_id(&parse_product_id(&body).unwrap()), "100");
    }

    #[test]
    fn test_null_first_image_gives_empty_url() {
        let product = parse_product(json!({ "id": 1, "images": [null] })).unwrap();
        assert_eq!(to_index_document(&product).image_url, "");
    }

    #[test]
    fn test_parse_product_missing_id() {
        let err = parse_product(json!({ "title": "No id" })).unwrap_err();
        assert!(matches!(err, TransformError::MissingId));

        let err = parse_product(json!({ "id": null })).unwrap_err();
        assert!(matches!(err, TransformError::MissingId));
    }

    #[test]
    fn test_parse_product_invalid_id() {
        let err = parse_product_id(&json!({ "id": true })).unwrap_err();
        assert!(matches!(err, TransformError::InvalidId(_)));
    }

    #[test]
    fn test_parse_product_not_an_object() {
        let err = parse_product(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, TransformError::NotAnObject));
    }

    #[test]
    fn test_parse_product_malformed_field() {
        let err = parse_product(json!({ "id": 1, "images": "not-a-list" })).unwrap_err();
        assert!(matches!(err, TransformError::Malformed(_)));
    }
}
