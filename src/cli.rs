//! Command-line editor over the layout engine
//!
//! Each mutating command opens an editing session on the file-backed store,
//! applies one intent and saves. Output is written to the supplied writer so
//! commands can be exercised without a terminal.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::editor::{Dispatch, EditorIntent, LayoutEditor, SaveNotice};
use crate::layout::Layout;
use crate::persistence::LayoutRepository;
use crate::registry::{self, FieldKind};
use crate::settings::Settings;
use crate::store::FileStore;

/// Homepage layout editor
#[derive(Parser, Debug)]
#[command(name = "homepage-layout")]
#[command(about = "Reorder, show/hide and configure homepage sections")]
#[command(version)]
pub struct Cli {
    /// JSON settings file
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Directory backing the document store (overrides settings)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Store key of the layout document (overrides settings)
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List sections in render order
    Show,
    /// Show the editable fields of a section with their current values
    Fields {
        /// Section id
        id: String,
    },
    /// Move a section from one position to another (0-based)
    Move { from: usize, to: usize },
    /// Show or hide a section
    Toggle {
        /// Section id
        id: String,
    },
    /// Set one config field of a section
    Set {
        /// Section id
        id: String,
        /// Config key
        key: String,
        /// New value; checked against the field descriptor when one exists
        value: String,
    },
    /// Replace the stored layout with the default layout
    Reset,
    /// Print the stored layout document as JSON
    Export,
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Settings from the file (if any) with flag overrides applied
    pub fn resolve_settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => Settings::load_from_file(path)?,
            None => Settings::default(),
        };
        if let Some(store) = &self.store {
            settings.store_dir = store.clone();
        }
        if let Some(key) = &self.key {
            settings.layout_key = key.clone();
        }
        if self.verbose {
            settings.log_level = "debug".to_string();
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// Execute `command` against the store described by `settings`
pub fn run(command: &Commands, settings: &Settings, out: &mut impl Write) -> Result<()> {
    let repository = LayoutRepository::with_key(
        FileStore::new(&settings.store_dir),
        settings.layout_key.clone(),
    );
    debug!(command = ?command, store = %settings.store_dir.display(), "running command");

    match command {
        Commands::Show => {
            let loaded = repository.load();
            writeln!(out, "Layout ({})", loaded.source)?;
            print_layout(&loaded.layout, out)?;
        }
        Commands::Fields { id } => {
            let layout = repository.load_layout();
            let section = layout.require_section(id)?;
            let fields = registry::fields(&section.section_type);
            if fields.is_empty() {
                writeln!(out, "{} ({}) has no editable fields", section.id, section.section_type)?;
                for (key, value) in &section.config {
                    writeln!(out, "  {} = {}", key, value)?;
                }
                return Ok(());
            }
            for field in fields {
                let current = registry::resolve_field(section, field.key)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                writeln!(
                    out,
                    "  {:<16} {:<32} {} [{}]",
                    field.key,
                    field.label,
                    current,
                    describe_kind(field.kind)
                )?;
            }
        }
        Commands::Move { from, to } => {
            edit(&repository, out, |_| {
                Ok(EditorIntent::Reorder { from: *from, to: *to })
            })?;
        }
        Commands::Toggle { id } => {
            edit(&repository, out, |_| Ok(EditorIntent::toggle(id.as_str())))?;
        }
        Commands::Set { id, key, value } => {
            edit(&repository, out, |layout| {
                let section = layout.require_section(id)?;
                let value = registry::coerce_field(section, key, value)
                    .with_context(|| format!("Invalid value for {}.{}", id, key))?;
                Ok(EditorIntent::edit_config(id.as_str(), key.as_str(), value))
            })?;
        }
        Commands::Reset => {
            repository
                .save_layout(&registry::default_layout())
                .context("Failed to store default layout")?;
            writeln!(out, "Layout reset to defaults")?;
        }
        Commands::Export => {
            let document = repository.load_layout().to_document()?;
            writeln!(out, "{}", serde_json::to_string_pretty(&document)?)?;
        }
    }

    Ok(())
}

/// Open a session, build one intent from its layout, apply it and save
fn edit(
    repository: &LayoutRepository<FileStore>,
    out: &mut impl Write,
    intent: impl FnOnce(&Layout) -> Result<EditorIntent>,
) -> Result<()> {
    let mut editor = LayoutEditor::open(repository);
    let intent = intent(editor.layout())?;
    match editor.dispatch(intent) {
        Dispatch::Applied => {}
        Dispatch::Unchanged => {
            writeln!(out, "Nothing to change")?;
            return Ok(());
        }
        other => bail!("Editor did not accept the change: {:?}", other),
    }

    match editor.save_now(repository) {
        Some(SaveNotice::Saved) => {
            print_layout(editor.layout(), out)?;
            Ok(())
        }
        Some(SaveNotice::Failed(message)) => bail!("Save failed: {}", message),
        Some(SaveNotice::Discarded) | None => bail!("Save did not run"),
    }
}

fn print_layout(layout: &Layout, out: &mut impl Write) -> Result<()> {
    for (index, section) in layout.sections.iter().enumerate() {
        writeln!(
            out,
            "{:>2}. [{}] {:<12} {:<20} {}",
            index,
            if section.enabled { "x" } else { " " },
            section.id,
            section.section_type,
            section.title
        )?;
    }
    Ok(())
}

fn describe_kind(kind: FieldKind) -> String {
    match kind {
        FieldKind::Number { min, max } => format!("number {}..={}", min, max),
        FieldKind::Text => "text".to_string(),
        FieldKind::LongText => "long text".to_string(),
        FieldKind::Enum { options } => options.join("|"),
        FieldKind::Flag => "yes/no".to_string(),
    }
}
