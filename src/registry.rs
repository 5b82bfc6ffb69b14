//! Section registry
//!
//! Static catalog of the known section types: their default id, title and
//! configuration, and the descriptors the editor uses to build one control per
//! editable field. Unknown types get no descriptors and no defaults.

use crate::error::{FieldError, Result};
use crate::layout::Layout;
use crate::section::{ConfigMap, ConfigValue, Section};
use crate::types::SectionKind;

/// What kind of control edits a field, and what values it allows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole number within an inclusive range
    Number { min: i64, max: i64 },
    /// Single-line text
    Text,
    /// Multi-line text
    LongText,
    /// One of a fixed set of strings
    Enum { options: &'static [&'static str] },
    /// On/off switch
    Flag,
}

/// Default value of a field, in a form usable in a static table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Number(i64),
    Text(&'static str),
    Flag(bool),
}

impl FieldDefault {
    pub fn to_value(self) -> ConfigValue {
        match self {
            Self::Number(n) => ConfigValue::Integer(n),
            Self::Text(s) => ConfigValue::from(s),
            Self::Flag(b) => ConfigValue::Flag(b),
        }
    }
}

/// One editable field of a section type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default: FieldDefault,
}

impl FieldDescriptor {
    /// Whether a stored value has the shape this field expects
    pub fn accepts(&self, value: &ConfigValue) -> bool {
        match self.kind {
            FieldKind::Number { min, max } => value
                .as_i64()
                .is_some_and(|n| (min..=max).contains(&n)),
            FieldKind::Text | FieldKind::LongText => value.as_str().is_some(),
            FieldKind::Enum { options } => value.as_str().is_some_and(|s| options.contains(&s)),
            FieldKind::Flag => value.as_bool().is_some(),
        }
    }

    /// Turn raw control input into a value for this field
    pub fn coerce(&self, raw: &str) -> std::result::Result<ConfigValue, FieldError> {
        match self.kind {
            FieldKind::Number { min, max } => {
                let value: i64 = raw.trim().parse().map_err(|_| FieldError::NotANumber {
                    input: raw.to_string(),
                })?;
                if !(min..=max).contains(&value) {
                    return Err(FieldError::OutOfRange { value, min, max });
                }
                Ok(ConfigValue::Integer(value))
            }
            FieldKind::Text | FieldKind::LongText => Ok(ConfigValue::from(raw)),
            FieldKind::Enum { options } => {
                let choice = raw.trim();
                if options.contains(&choice) {
                    Ok(ConfigValue::from(choice))
                } else {
                    Err(FieldError::UnknownOption {
                        input: raw.to_string(),
                        options: options.to_vec(),
                    })
                }
            }
            FieldKind::Flag => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(ConfigValue::Flag(true)),
                "false" | "no" | "off" | "0" => Ok(ConfigValue::Flag(false)),
                _ => Err(FieldError::NotAFlag {
                    input: raw.to_string(),
                }),
            },
        }
    }
}

/// Registry entry for one known section type
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub kind: SectionKind,
    /// Id used for this section in the default layout
    pub default_id: &'static str,
    pub title: &'static str,
    pub fields: &'static [FieldDescriptor],
}

const HERO_STYLES: &[&str] = &["gradient", "image", "minimal"];
const POST_STYLES: &[&str] = &["cards", "grid", "list"];

/// Known section types in default render order
static SECTION_SPECS: [SectionSpec; 5] = [
    SectionSpec {
        kind: SectionKind::Hero,
        default_id: "hero",
        title: "Hero Section",
        fields: &[
            FieldDescriptor {
                key: "style",
                label: "Style",
                kind: FieldKind::Enum {
                    options: HERO_STYLES,
                },
                default: FieldDefault::Text("gradient"),
            },
            FieldDescriptor {
                key: "showCTAs",
                label: "Show Call-to-Action Buttons",
                kind: FieldKind::Flag,
                default: FieldDefault::Flag(true),
            },
        ],
    },
    SectionSpec {
        kind: SectionKind::FeaturedPosts,
        default_id: "featured",
        title: "Featured Posts",
        fields: &[
            FieldDescriptor {
                key: "limit",
                label: "Post Limit",
                kind: FieldKind::Number { min: 1, max: 6 },
                default: FieldDefault::Number(3),
            },
            FieldDescriptor {
                key: "style",
                label: "Style",
                kind: FieldKind::Enum {
                    options: POST_STYLES,
                },
                default: FieldDefault::Text("cards"),
            },
        ],
    },
    SectionSpec {
        kind: SectionKind::RecentPosts,
        default_id: "recent",
        title: "Recent Posts",
        fields: &[
            FieldDescriptor {
                key: "limit",
                label: "Post Limit",
                kind: FieldKind::Number { min: 1, max: 12 },
                default: FieldDefault::Number(6),
            },
            FieldDescriptor {
                key: "style",
                label: "Style",
                kind: FieldKind::Enum {
                    options: POST_STYLES,
                },
                default: FieldDefault::Text("grid"),
            },
        ],
    },
    SectionSpec {
        kind: SectionKind::Newsletter,
        default_id: "newsletter",
        title: "Newsletter Signup",
        fields: &[
            FieldDescriptor {
                key: "title",
                label: "Title",
                kind: FieldKind::Text,
                default: FieldDefault::Text("Stay Safe & Informed"),
            },
            FieldDescriptor {
                key: "description",
                label: "Description",
                kind: FieldKind::LongText,
                default: FieldDefault::Text(
                    "Get the latest safety tips and resources delivered to your inbox.",
                ),
            },
        ],
    },
    SectionSpec {
        kind: SectionKind::EmergencyResources,
        default_id: "resources",
        title: "Emergency Resources",
        fields: &[
            FieldDescriptor {
                key: "showContacts",
                label: "Show Emergency Contacts",
                kind: FieldKind::Flag,
                default: FieldDefault::Flag(true),
            },
            FieldDescriptor {
                key: "showSafetyPlan",
                label: "Show Safety Plan",
                kind: FieldKind::Flag,
                default: FieldDefault::Flag(true),
            },
        ],
    },
];

/// All registry entries in default render order
pub fn specs() -> &'static [SectionSpec] {
    &SECTION_SPECS
}

/// Registry entry for a known kind
pub fn spec(kind: SectionKind) -> &'static SectionSpec {
    // Every SectionKind has exactly one entry
    SECTION_SPECS
        .iter()
        .find(|spec| spec.kind == kind)
        .unwrap_or(&SECTION_SPECS[0])
}

/// Registry entry for a stored type identifier
pub fn lookup(section_type: &str) -> Option<&'static SectionSpec> {
    SectionKind::from_type(section_type).map(spec)
}

/// Editable fields for a type; empty for unknown types
pub fn fields(section_type: &str) -> &'static [FieldDescriptor] {
    lookup(section_type).map(|spec| spec.fields).unwrap_or(&[])
}

/// Descriptor for one field of a type
pub fn field(section_type: &str, key: &str) -> Option<&'static FieldDescriptor> {
    fields(section_type).iter().find(|field| field.key == key)
}

/// Default configuration for a known kind
pub fn default_config(kind: SectionKind) -> ConfigMap {
    spec(kind)
        .fields
        .iter()
        .map(|field| (field.key.to_string(), field.default.to_value()))
        .collect()
}

/// An enabled section of `kind` carrying its default id, title and config
pub fn default_section(kind: SectionKind) -> Section {
    let spec = spec(kind);
    Section {
        config: default_config(kind),
        ..Section::new(spec.default_id, kind.as_str(), spec.title)
    }
}

/// The layout used when nothing usable is stored
pub fn default_layout() -> Layout {
    Layout::new(
        SECTION_SPECS
            .iter()
            .map(|spec| default_section(spec.kind))
            .collect(),
    )
}

/// Edit-time value of a field: the stored value when it fits the descriptor,
/// otherwise the registry default.
///
/// Fields without a descriptor return whatever is stored.
pub fn resolve_field(section: &Section, key: &str) -> Option<ConfigValue> {
    let stored = section.get(key);
    match field(&section.section_type, key) {
        Some(descriptor) => match stored {
            Some(value) if descriptor.accepts(value) => Some(value.clone()),
            _ => Some(descriptor.default.to_value()),
        },
        None => stored.cloned(),
    }
}

/// Value for `key` of `section` from raw control input: checked against the
/// field descriptor when one exists, otherwise typed by inference
pub fn coerce_field(section: &Section, key: &str, raw: &str) -> Result<ConfigValue> {
    match field(&section.section_type, key) {
        Some(descriptor) => Ok(descriptor.coerce(raw)?),
        None => Ok(ConfigValue::infer(raw)),
    }
}
