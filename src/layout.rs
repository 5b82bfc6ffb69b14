//! Layout model
//!
//! An ordered sequence of sections plus the three pure mutations the editor
//! applies to it. Every mutation returns a new `Layout` and leaves its input
//! untouched; the set of section ids and their count never change.
//!
//! Mutations aimed at something that does not exist (an index outside the
//! sequence, an id that no section carries) return an unchanged copy. These
//! come from stale UI references and are not errors.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::error::{LayoutError, Result};
use crate::section::{ConfigValue, Section};

/// The whole-page configuration, in render order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default, deserialize_with = "deserialize_sections")]
    pub sections: Vec<Section>,

    /// Unrecognized top-level keys, written back unmodified
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A null or non-array `sections` reads as empty; each entry must still decode
fn deserialize_sections<'de, D>(deserializer: D) -> std::result::Result<Vec<Section>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(entries) => serde_json::from_value(Value::Array(entries))
            .map_err(serde::de::Error::custom),
        Value::Null => Ok(Vec::new()),
        other => {
            warn!(found = %other, "layout sections is not an array, using no sections");
            Ok(Vec::new())
        }
    }
}

impl Layout {
    /// Build a layout from sections in render order
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            sections,
            extra: Map::new(),
        }
    }

    /// Decode a stored document, dropping sections whose id repeats an earlier one
    pub fn from_document(document: Value) -> serde_json::Result<Self> {
        let layout: Self = serde_json::from_value(document)?;
        Ok(layout.dedup_ids())
    }

    /// Encode as a stored document
    pub fn to_document(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn dedup_ids(mut self) -> Self {
        let mut seen = HashSet::new();
        self.sections.retain(|section| {
            let first = seen.insert(section.id.clone());
            if !first {
                warn!(id = %section.id, "dropping section with duplicate id");
            }
            first
        });
        self
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Like [`section`](Self::section), for callers that need the section to exist
    pub fn require_section(&self, id: &str) -> Result<&Section> {
        self.section(id)
            .ok_or_else(|| LayoutError::unknown_section(id))
    }

    /// Render-order index of a section
    pub fn position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == id)
    }

    /// Section ids in render order
    pub fn ids(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.id.as_str()).collect()
    }

    /// Sections a renderer should draw, in order
    pub fn enabled_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.enabled)
    }

    /// First `(section id, key)` holding a NaN or infinite float
    pub fn non_finite_value(&self) -> Option<(&str, &str)> {
        self.sections.iter().find_map(|section| {
            section.config.iter().find_map(|(key, value)| match value {
                ConfigValue::Float(f) if !f.is_finite() => {
                    Some((section.id.as_str(), key.as_str()))
                }
                _ => None,
            })
        })
    }

    /// Verify that section ids are unique
    pub fn check_invariants(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for section in &self.sections {
            if !seen.insert(section.id.as_str()) {
                return Err(LayoutError::invariant(format!(
                    "duplicate section id '{}'",
                    section.id
                )));
            }
        }
        Ok(())
    }

    /// Move the section at `from` so it ends up at `to`.
    ///
    /// Either index outside `0..len` leaves the layout unchanged.
    pub fn reorder(&self, from: usize, to: usize) -> Self {
        let len = self.sections.len();
        if from >= len || to >= len {
            debug!(from, to, len, "reorder index out of range, ignoring");
            return self.clone();
        }

        let mut next = self.clone();
        let moved = next.sections.remove(from);
        next.sections.insert(to, moved);
        next
    }

    /// Flip the enabled flag of the section with `id`
    pub fn toggle_enabled(&self, id: &str) -> Self {
        self.update_section(id, |section| section.enabled = !section.enabled)
    }

    /// Merge `{key: value}` into the config of the section with `id`
    pub fn patch_config(&self, id: &str, key: &str, value: ConfigValue) -> Self {
        self.update_section(id, |section| {
            section.config.insert(key.to_string(), value);
        })
    }

    fn update_section(&self, id: &str, apply: impl FnOnce(&mut Section)) -> Self {
        let mut next = self.clone();
        match next.sections.iter_mut().find(|s| s.id == id) {
            Some(section) => apply(section),
            None => debug!(id, "no section with this id, ignoring"),
        }
        next
    }
}
