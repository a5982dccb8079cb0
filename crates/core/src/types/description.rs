//! Product descriptions.
//!
//! Sellers describe a product with a list of feature names and a parallel list
//! of values (`Color: Red`, `Weight: 2 kg`). The two lists are zipped into a
//! key/value map and stored as a JSON object. Products created without any
//! features get a one-line text description instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::price::Price;

/// Maximum length of a single feature name.
const MAX_FEATURE_NAME_LENGTH: usize = 100;

/// Errors that can occur when building a [`ProductDescription`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptionError {
    /// A feature name exceeds the allowed length.
    #[error("feature name must be at most {max} characters")]
    FeatureNameTooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A product description: either a feature map or free text.
///
/// Serialized untagged, so a feature map becomes a JSON object and text
/// becomes a JSON string, which is how the `product.description` JSONB column
/// holds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductDescription {
    /// Feature name to value.
    Features(BTreeMap<String, String>),
    /// Free-text description.
    Text(String),
}

impl ProductDescription {
    /// Zip parallel lists of feature names and values into a description.
    ///
    /// Blank names are skipped together with their value. A name without a
    /// matching value gets an empty value; surplus values are ignored. When a
    /// name repeats, the last value wins. Returns `None` when no feature
    /// survives, so the caller can fall back to [`ProductDescription::fallback`].
    ///
    /// # Errors
    ///
    /// Returns `DescriptionError::FeatureNameTooLong` for oversized names.
    pub fn from_features<N, V>(names: N, values: V) -> Result<Option<Self>, DescriptionError>
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let mut values = values.into_iter();
        let mut features = BTreeMap::new();

        for name in names {
            let value = values
                .next()
                .map(|v| v.as_ref().trim().to_owned())
                .unwrap_or_default();
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            if name.chars().count() > MAX_FEATURE_NAME_LENGTH {
                return Err(DescriptionError::FeatureNameTooLong {
                    max: MAX_FEATURE_NAME_LENGTH,
                });
            }
            features.insert(name.to_owned(), value);
        }

        if features.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Self::Features(features)))
        }
    }

    /// Text used when a product is saved without a description.
    #[must_use]
    pub fn fallback(name: &str, price: Price) -> Self {
        Self::Text(format!("{name} at {price}"))
    }

    /// Feature pairs in display order; empty for a text description.
    #[must_use]
    pub fn features(&self) -> Vec<(&str, &str)> {
        match self {
            Self::Features(map) => map.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect(),
            Self::Text(_) => Vec::new(),
        }
    }

    /// Free text; `None` for a feature map.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Features(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    /// Convert to the JSON value stored in the database.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Features(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            ),
            Self::Text(text) => serde_json::Value::String(text.clone()),
        }
    }

    /// Read a stored JSON value.
    ///
    /// Non-string feature values are rendered with their JSON text, and any
    /// other JSON shape is kept as text so older rows still display.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self::Features(
                map.iter()
                    .map(|(k, v)| {
                        let v = v.as_str().map_or_else(|| v.to_string(), str::to_owned);
                        (k.clone(), v)
                    })
                    .collect(),
            ),
            serde_json::Value::String(text) => Self::Text(text.clone()),
            other => Self::Text(other.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_parallel_lists() {
        let desc = ProductDescription::from_features(["Color", "Weight"], ["Red", "2 kg"])
            .unwrap()
            .unwrap();
        assert_eq!(desc.features(), vec![("Color", "Red"), ("Weight", "2 kg")]);
    }

    #[test]
    fn test_blank_names_are_skipped() {
        let desc = ProductDescription::from_features(["", "Size"], ["ignored", "XL"])
            .unwrap()
            .unwrap();
        assert_eq!(desc.features(), vec![("Size", "XL")]);
    }

    #[test]
    fn test_missing_values_are_empty() {
        let desc = ProductDescription::from_features(["Material", "Origin"], ["Cotton"])
            .unwrap()
            .unwrap();
        assert_eq!(desc.features(), vec![("Material", "Cotton"), ("Origin", "")]);
    }

    #[test]
    fn test_surplus_values_are_ignored() {
        let desc = ProductDescription::from_features(["Material"], ["Cotton", "Wool"])
            .unwrap()
            .unwrap();
        assert_eq!(desc.features().len(), 1);
    }

    #[test]
    fn test_no_features_returns_none() {
        let empty: [&str; 0] = [];
        assert_eq!(ProductDescription::from_features(empty, empty).unwrap(), None);
        assert_eq!(
            ProductDescription::from_features(["  "], ["x"]).unwrap(),
            None
        );
    }

    #[test]
    fn test_name_too_long() {
        let name = "n".repeat(101);
        assert!(matches!(
            ProductDescription::from_features([name], ["v"]),
            Err(DescriptionError::FeatureNameTooLong { max: 100 })
        ));
    }

    #[test]
    fn test_fallback_text() {
        let price = Price::parse("250").unwrap();
        let desc = ProductDescription::fallback("Kettle", price);
        assert_eq!(desc.text(), Some("Kettle at 250.00"));
    }

    #[test]
    fn test_json_shapes() {
        let desc = ProductDescription::from_features(["Color"], ["Blue"])
            .unwrap()
            .unwrap();
        assert_eq!(desc.to_json(), serde_json::json!({"Color": "Blue"}));

        let text = ProductDescription::Text("plain".to_owned());
        assert_eq!(text.to_json(), serde_json::json!("plain"));
    }

    #[test]
    fn test_from_json_tolerates_non_string_values() {
        let value = serde_json::json!({"Pieces": 4, "Color": "Red"});
        let desc = ProductDescription::from_json(&value);
        assert_eq!(desc.features(), vec![("Color", "Red"), ("Pieces", "4")]);

        let desc = ProductDescription::from_json(&serde_json::json!(12));
        assert_eq!(desc.text(), Some("12"));
    }
}
