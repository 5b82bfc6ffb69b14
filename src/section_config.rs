//! Typed configuration view
//!
//! Storage keeps every section's config as a flat map so the persisted shape
//! never changes. Renderers and editors read this tagged union instead, with
//! missing or malformed keys already resolved to registry defaults.

use crate::registry;
use crate::section::{ConfigMap, ConfigValue, Section};
use crate::types::{HeroStyle, PostStyle, SectionKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroConfig {
    pub style: HeroStyle,
    pub show_ctas: bool,
}

/// Shared by the featured and recent post lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostListConfig {
    pub limit: u32,
    pub style: PostStyle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterConfig {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmergencyResourcesConfig {
    pub show_contacts: bool,
    pub show_safety_plan: bool,
}

/// Section configuration keyed by section type
#[derive(Debug, Clone, PartialEq)]
pub enum SectionConfig {
    Hero(HeroConfig),
    FeaturedPosts(PostListConfig),
    RecentPosts(PostListConfig),
    Newsletter(NewsletterConfig),
    EmergencyResources(EmergencyResourcesConfig),
    /// Unknown section type, config passed through as stored
    Opaque(ConfigMap),
}

impl SectionConfig {
    /// Resolve the typed view of a section's config
    pub fn resolve(section: &Section) -> Self {
        let Some(kind) = section.kind() else {
            return Self::Opaque(section.config.clone());
        };

        let value = |key: &str| registry::resolve_field(section, key);
        let flag = |key: &str| value(key).and_then(|v| v.as_bool()).unwrap_or_default();
        let text = |key: &str| {
            value(key)
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default()
        };
        let post_list = || PostListConfig {
            limit: value("limit")
                .and_then(|v| v.as_i64())
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or_default(),
            style: text("style").parse().unwrap_or_default(),
        };

        match kind {
            SectionKind::Hero => Self::Hero(HeroConfig {
                style: text("style").parse().unwrap_or_default(),
                show_ctas: flag("showCTAs"),
            }),
            SectionKind::FeaturedPosts => Self::FeaturedPosts(post_list()),
            SectionKind::RecentPosts => Self::RecentPosts(post_list()),
            SectionKind::Newsletter => Self::Newsletter(NewsletterConfig {
                title: text("title"),
                description: text("description"),
            }),
            SectionKind::EmergencyResources => {
                Self::EmergencyResources(EmergencyResourcesConfig {
                    show_contacts: flag("showContacts"),
                    show_safety_plan: flag("showSafetyPlan"),
                })
            }
        }
    }

    /// The known kind this view belongs to; `None` for opaque configs
    pub fn kind(&self) -> Option<SectionKind> {
        match self {
            Self::Hero(_) => Some(SectionKind::Hero),
            Self::FeaturedPosts(_) => Some(SectionKind::FeaturedPosts),
            Self::RecentPosts(_) => Some(SectionKind::RecentPosts),
            Self::Newsletter(_) => Some(SectionKind::Newsletter),
            Self::EmergencyResources(_) => Some(SectionKind::EmergencyResources),
            Self::Opaque(_) => None,
        }
    }

    /// Raw value for an opaque config key
    pub fn opaque_value(&self, key: &str) -> Option<&ConfigValue> {
        match self {
            Self::Opaque(map) => map.get(key),
            _ => None,
        }
    }
}
