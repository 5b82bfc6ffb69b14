//! Sections and their flat configuration values
//!
//! A section's `config` is a one-level map: every value is a scalar or a flat
//! array of strings. Anything deeper found in a stored document is dropped on
//! decode so the invariant holds for every in-memory layout.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

use crate::section_config::SectionConfig;
use crate::types::SectionKind;

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Flag(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

/// Per-section configuration keyed by field name
pub type ConfigMap = BTreeMap<String, ConfigValue>;

impl ConfigValue {
    /// Best-effort typing of free-form input for fields without a descriptor
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "true" => return Self::Flag(true),
            "false" => return Self::Flag(false),
            _ => {}
        }
        if let Ok(n) = trimmed.parse::<i64>() {
            return Self::Integer(n);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Self::Float(f);
            }
        }
        Self::Text(raw.to_string())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view; whole floats count since JSON does not distinguish them
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(b) => write!(f, "{}", b),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{}", s),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// One page module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Identity key, stable across reorders
    pub id: String,

    /// Section type identifier; unknown types are kept verbatim
    #[serde(rename = "type")]
    pub section_type: String,

    #[serde(default, deserialize_with = "deserialize_lenient_enabled")]
    pub enabled: bool,

    /// Display label only
    #[serde(default, deserialize_with = "deserialize_lenient_title")]
    pub title: String,

    #[serde(default, deserialize_with = "deserialize_flat_config")]
    pub config: ConfigMap,

    /// Unrecognized keys, written back unmodified
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Section {
    /// Create an enabled section with an empty config
    pub fn new(
        id: impl Into<String>,
        section_type: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            section_type: section_type.into(),
            enabled: true,
            title: title.into(),
            config: ConfigMap::new(),
            extra: Map::new(),
        }
    }

    /// Builder-style config entry
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Builder-style enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// The known kind of this section, if its type is recognized
    pub fn kind(&self) -> Option<SectionKind> {
        SectionKind::from_type(&self.section_type)
    }

    /// Stored config value, without default fallback
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.config.get(key)
    }

    /// Typed view of the config with registry defaults filled in
    pub fn typed_config(&self) -> SectionConfig {
        SectionConfig::resolve(self)
    }
}

/// Any non-boolean reads as `false`
fn deserialize_lenient_enabled<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(enabled) => Ok(enabled),
        Value::Null => Ok(false),
        other => {
            warn!(found = %other, "section enabled flag is not a boolean, using false");
            Ok(false)
        }
    }
}

/// Any non-string reads as an empty title
fn deserialize_lenient_title<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(title) => Ok(title),
        Value::Null => Ok(String::new()),
        other => {
            warn!(found = %other, "section title is not a string, using empty title");
            Ok(String::new())
        }
    }
}

/// Accepts any JSON object and keeps only flat values
fn deserialize_flat_config<'de, D>(deserializer: D) -> Result<ConfigMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let object = match raw {
        Value::Object(object) => object,
        Value::Null => return Ok(ConfigMap::new()),
        other => {
            warn!(found = %other, "section config is not an object, using empty config");
            return Ok(ConfigMap::new());
        }
    };

    let config = object
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<ConfigValue>(value) {
            Ok(value) => Some((key, value)),
            Err(_) => {
                warn!(key = %key, "dropping config value that is not a scalar or string list");
                None
            }
        })
        .collect();

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_decodes_persisted_shape() {
        let section: Section = serde_json::from_value(json!({
            "id": "featured",
            "type": "featured-posts",
            "enabled": true,
            "title": "Featured Posts",
            "config": { "limit": 3, "style": "cards" }
        }))
        .unwrap();

        assert_eq!(section.id, "featured");
        assert_eq!(section.kind(), Some(SectionKind::FeaturedPosts));
        assert_eq!(section.get("limit"), Some(&ConfigValue::Integer(3)));
        assert_eq!(section.get("style"), Some(&ConfigValue::from("cards")));
        assert!(section.extra.is_empty());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let section: Section =
            serde_json::from_value(json!({ "id": "x", "type": "hero" })).unwrap();
        assert!(!section.enabled);
        assert!(section.title.is_empty());
        assert!(section.config.is_empty());
    }

    #[test]
    fn test_malformed_optional_fields_default() {
        let section: Section = serde_json::from_value(json!({
            "id": "news",
            "type": "newsletter",
            "enabled": "yes",
            "title": null
        }))
        .unwrap();
        assert!(!section.enabled);
        assert!(section.title.is_empty());

        let section: Section = serde_json::from_value(json!({
            "id": "news",
            "type": "newsletter",
            "enabled": null,
            "title": 7
        }))
        .unwrap();
        assert!(!section.enabled);
        assert!(section.title.is_empty());
    }

    #[test]
    fn test_non_string_type_is_rejected() {
        let result = serde_json::from_value::<Section>(json!({ "id": "x", "type": 3 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let result = serde_json::from_value::<Section>(json!({ "type": "hero" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_nested_config_values_are_dropped() {
        let section: Section = serde_json::from_value(json!({
            "id": "hero",
            "type": "hero",
            "config": {
                "style": "gradient",
                "nested": { "deep": true },
                "mixed": [1, "two"],
                "empty": null,
                "tags": ["a", "b"]
            }
        }))
        .unwrap();

        assert_eq!(section.config.len(), 2);
        assert!(section.get("nested").is_none());
        assert!(section.get("mixed").is_none());
        assert!(section.get("empty").is_none());
        assert_eq!(
            section.get("tags").and_then(ConfigValue::as_list),
            Some(&["a".to_string(), "b".to_string()][..])
        );
    }

    #[test]
    fn test_non_object_config_becomes_empty() {
        let section: Section = serde_json::from_value(json!({
            "id": "hero",
            "type": "hero",
            "config": "oops"
        }))
        .unwrap();
        assert!(section.config.is_empty());
    }

    #[test]
    fn test_unknown_keys_round_trip() {
        let doc = json!({
            "id": "quote",
            "type": "testimonials",
            "enabled": true,
            "title": "Quotes",
            "config": {},
            "variant": "b"
        });
        let section: Section = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(section.kind(), None);
        assert_eq!(section.extra.get("variant"), Some(&json!("b")));
        assert_eq!(serde_json::to_value(&section).unwrap(), doc);
    }

    #[test]
    fn test_infer_config_value() {
        assert_eq!(ConfigValue::infer("true"), ConfigValue::Flag(true));
        assert_eq!(ConfigValue::infer("42"), ConfigValue::Integer(42));
        assert_eq!(ConfigValue::infer("2.5"), ConfigValue::Float(2.5));
        assert_eq!(ConfigValue::infer("hello"), ConfigValue::from("hello"));
        assert_eq!(ConfigValue::infer("NaN"), ConfigValue::from("NaN"));
    }

    #[test]
    fn test_whole_float_reads_as_integer() {
        assert_eq!(ConfigValue::Float(4.0).as_i64(), Some(4));
        assert_eq!(ConfigValue::Float(4.5).as_i64(), None);
        assert_eq!(ConfigValue::from("4").as_i64(), None);
    }
}
