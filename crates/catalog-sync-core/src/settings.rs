//! Index settings sent alongside every upsert.
//!
//! The index service needs to know which fields are tensor fields and how
//! multimodal fields are combined. These settings are process-wide: built
//! once at startup (from the default below or a JSON override) and shared
//! read-only afterwards.
//!
//! Default:
//!
//! ```json
//! {
//!   "tensorFields": ["multimodal"],
//!   "mappings": {
//!     "multimodal": {
//!       "type": "multimodal_combination",
//!       "weights": { "image_url": 0.9, "name": 0.1 }
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field name of the default combined field.
pub const DEFAULT_MULTIMODAL_FIELD: &str = "multimodal";

/// Tensor fields and field mappings forwarded with each document batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSettings {
    pub tensor_fields: Vec<String>,
    #[serde(default)]
    pub mappings: BTreeMap<String, FieldMapping>,
}

/// How a single mapped field is built.
///
/// Weights are per-source-field floats; they are not required to sum to 1.
/// Keys other than `type` and `weights` are kept and forwarded as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub weights: BTreeMap<String, f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldMapping {
    /// A `multimodal_combination` mapping with the given weights.
    pub fn multimodal_combination<I, K>(weights: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            kind: "multimodal_combination".to_string(),
            weights: weights.into_iter().map(|(k, w)| (k.into(), w)).collect(),
            extra: Map::new(),
        }
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        let mut mappings = BTreeMap::new();
        mappings.insert(
            DEFAULT_MULTIMODAL_FIELD.to_string(),
            FieldMapping::multimodal_combination([("image_url", 0.9), ("name", 0.1)]),
        );

        Self {
            tensor_fields: vec![DEFAULT_MULTIMODAL_FIELD.to_string()],
            mappings,
        }
    }
}

impl IndexSettings {
    /// Parse a JSON override, e.g. from configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_wire_shape() {
        let value = serde_json::to_value(IndexSettings::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "tensorFields": ["multimodal"],
                "mappings": {
                    "multimodal": {
                        "type": "multimodal_combination",
                        "weights": { "image_url": 0.9, "name": 0.1 }
                    }
                }
            })
        );
    }

    #[test]
    fn test_override_from_json() {
        let settings = IndexSettings::from_json(
            r#"{
                "tensorFields": ["combo", "name"],
                "mappings": {
                    "combo": {
                        "type": "multimodal_combination",
                        "weights": { "image_url": 2.0, "name": 0.5, "vendor": 0.5 }
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.tensor_fields, vec!["combo", "name"]);
        let combo = &settings.mappings["combo"];
        assert_eq!(combo.kind, "multimodal_combination");
        assert_eq!(combo.weights["image_url"], 2.0);
        assert_eq!(combo.weights.len(), 3);
    }

    #[test]
    fn test_unknown_mapping_keys_preserved() {
        let settings = IndexSettings::from_json(
            r#"{
                "tensorFields": ["vec"],
                "mappings": { "vec": { "type": "custom_vector", "dimensions": 512 } }
            }"#,
        )
        .unwrap();

        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(
            value["mappings"]["vec"],
            json!({ "type": "custom_vector", "dimensions": 512 })
        );
    }

    #[test]
    fn test_override_requires_tensor_fields() {
        assert!(IndexSettings::from_json(r#"{ "mappings": {} }"#).is_err());
    }

    #[test]
    fn test_override_rejects_invalid_json() {
        assert!(IndexSettings::from_json("{ not json").is_err());
    }
}
