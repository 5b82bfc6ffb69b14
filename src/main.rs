//! Homepage layout editor - command-line entry point

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use homepage_layout::cli::{self, Cli};

/// Initialize tracing; `RUST_LOG` overrides the configured level
fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    let settings = cli.resolve_settings()?;

    init_logging(&settings.log_level);
    info!(store = %settings.store_dir.display(), key = %settings.layout_key, "homepage-layout starting");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::run(&cli.command, &settings, &mut out)
}
