//! Data models for the product sync pipeline.
//!
//! [`ProductRecord`] is what the commerce platform sends; [`IndexDocument`] is
//! what the index service stores. Decoding is deliberately tolerant: real
//! webhook payloads carry many more fields than we use, send `null` for
//! optional strings, and encode tags either as an array or as one
//! comma-separated string.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A product identifier as delivered by the platform.
///
/// Ids arrive as JSON numbers for most products but may be strings. Both
/// forms stringify through [`Display`](fmt::Display), and that string is the
/// document `_id` in the index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => match n.as_f64() {
                // Integral floats (`101.0`, `1e2`) print as plain integers.
                Some(x) if !n.is_u64() && !n.is_i64() && is_plain_integer(x) => {
                    write!(f, "{:.0}", x + 0.0)
                }
                _ => write!(f, "{}", n),
            },
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

/// Integral and small enough to print in full without an exponent.
fn is_plain_integer(x: f64) -> bool {
    x.is_finite() && x.fract() == 0.0 && x.abs() < 1e21
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        ProductId::Number(id.into())
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId::Text(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        ProductId::Text(id)
    }
}

/// One product image. Only `src` is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub src: String,
}

/// A product as carried in a create/update webhook body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: ProductId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_images")]
    pub images: Vec<ProductImage>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vendor: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_type: String,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
}

/// A document in the index service's schema.
///
/// `_id` is always a string, whatever the type of the source product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub vendor: String,
    pub product_type: String,
    pub tags: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A `null` entry becomes an image with an empty `src`, keeping positions.
fn deserialize_images<'de, D>(deserializer: D) -> Result<Vec<ProductImage>, D::Error>
where
    D: Deserializer<'de>,
{
    let images = Option::<Vec<Option<ProductImage>>>::deserialize(deserializer)?;
    Ok(images
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

/// Accepts `["a", "b"]`, `"a, b"`, or `null`.
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTags {
        List(Vec<String>),
        Joined(String),
    }

    Ok(match Option::<RawTags>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(RawTags::List(tags)) => tags,
        Some(RawTags::Joined(joined)) => split_tags(&joined),
    })
}

fn split_tags(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_id_display() {
        assert_eq!(ProductId::from(42u64).to_string(), "42");
        assert_eq!(ProductId::from("gid-42").to_string(), "gid-42");
    }

    #[test]
    fn test_product_id_untagged() {
        let numeric: ProductId = serde_json::from_value(json!(632910392)).unwrap();
        assert_eq!(numeric, ProductId::from(632910392u64));

        let text: ProductId = serde_json::from_value(json!("632910392")).unwrap();
        assert_eq!(text, ProductId::from("632910392"));
        assert_eq!(numeric.to_string(), text.to_string());
    }

    #[test]
    fn test_record_tolerates_nulls_and_missing_fields() {
        let record: ProductRecord = serde_json::from_value(json!({
            "id": 7,
            "title": null,
            "images": null,
            "handle": "ignored",
        }))
        .unwrap();

        assert_eq!(record.title, "");
        assert!(record.images.is_empty());
        assert_eq!(record.vendor, "");
        assert_eq!(record.product_type, "");
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_product_id_integral_float_prints_as_integer() {
        let id: ProductId = serde_json::from_str("101.0").unwrap();
        assert_eq!(id.to_string(), "101");

        let id: ProductId = serde_json::from_str("1e2").unwrap();
        assert_eq!(id.to_string(), "100");

        let id: ProductId = serde_json::from_str("-0.0").unwrap();
        assert_eq!(id.to_string(), "0");

        let id: ProductId = serde_json::from_str("101.5").unwrap();
        assert_eq!(id.to_string(), "101.5");
    }

    #[test]
    fn test_null_image_entry_kept_as_empty() {
        let record: ProductRecord = serde_json::from_value(json!({
            "id": 1,
            "images": [null, { "src": "https://x/2.jpg" }],
        }))
        .unwrap();

        assert_eq!(record.images.len(), 2);
        assert_eq!(record.images[0].src, "");
        assert_eq!(record.images[1].src, "https://x/2.jpg");
    }

    #[test]
    fn test_tags_as_comma_separated_string() {
        let record: ProductRecord =
            serde_json::from_value(json!({ "id": 1, "tags": "summer, new ,, sale" })).unwrap();
        assert_eq!(record.tags, vec!["summer", "new", "sale"]);
    }

    #[test]
    fn test_tags_empty_string() {
        let record: ProductRecord =
            serde_json::from_value(json!({ "id": 1, "tags": "" })).unwrap();
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_tags_as_array_keep_order() {
        let record: ProductRecord =
            serde_json::from_value(json!({ "id": 1, "tags": ["b", "a"] })).unwrap();
        assert_eq!(record.tags, vec!["b", "a"]);
    }

    #[test]
    fn test_index_document_serializes_underscore_id() {
        let doc = IndexDocument {
            id: "1".to_string(),
            name: "Tee".to_string(),
            image_url: String::new(),
            vendor: String::new(),
            product_type: String::new(),
            tags: vec![],
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["_id"], "1");
        assert!(value.get("id").is_none());
    }
}
