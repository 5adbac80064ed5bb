//! # Collage
//!
//! Headless sticker collage editor.

use anyhow::Context;
use clap::Parser;
use collage_cli::{CliArgs, SessionConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,collage_core=debug,collage_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    // Use JSON format for log collectors (COLLAGE_LOG_FORMAT=json)
    if std::env::var("COLLAGE_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let config = SessionConfig::from(args);
    tracing::info!("Starting collage session");

    let report = collage_cli::run(&config).context("collage session failed")?;

    if let Some(path) = &report.output {
        println!("{}", path.display());
    }
    tracing::info!(
        "Session done: {} applied, {} skipped, {} layers, {} diagnostics",
        report.applied,
        report.skipped,
        report.layers,
        report.diagnostics.len()
    );
    Ok(())
}
