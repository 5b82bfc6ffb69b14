//! Type-safe identifiers for section types and their enumerated options
//!
//! Sections store their type as a plain string so unknown types survive a
//! round trip. These enums are the known vocabulary layered on top.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Known section types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SectionKind {
    Hero,
    FeaturedPosts,
    RecentPosts,
    Newsletter,
    EmergencyResources,
}

impl SectionKind {
    /// Parse a stored type identifier, `None` for types this build does not know
    pub fn from_type(section_type: &str) -> Option<Self> {
        section_type.parse().ok()
    }

    /// The identifier written to the `type` field
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// All known kinds in default render order
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }
}

/// Visual treatment of the hero banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HeroStyle {
    #[default]
    Gradient,
    Image,
    Minimal,
}

/// How a list of posts is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter, IntoStaticStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PostStyle {
    #[default]
    Cards,
    Grid,
    List,
}
