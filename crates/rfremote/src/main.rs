//! # rfremote
//!
//! Remote keyword server binary. Wires the built-in loader, loads the
//! configured libraries, and serves the protocol until Ctrl-C or a
//! remote shutdown request.

#![deny(unsafe_code)]

mod config;
mod sample;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rfremote_keywords::{KeywordRegistry, StaticLoader};
use rfremote_server::Listener;

use crate::config::{LibraryEntry, Settings, parse_library_flag};

/// Remote keyword server.
#[derive(Parser, Debug)]
#[command(name = "rfremote", about = "Remote keyword server")]
struct Cli {
    /// Host to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (0 for auto-assign).
    #[arg(long)]
    port: Option<u16>,

    /// Path to a JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Library to load, as name=spec[,docs=path]. Repeatable.
    #[arg(long = "library", value_name = "NAME=SPEC")]
    libraries: Vec<String>,

    /// Log filter used when RFREMOTE_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(fallback: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_env("RFREMOTE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

/// Bind overrides from the environment, strongest of the three sources.
fn env_overrides() -> Result<(Option<String>, Option<u16>)> {
    let host = std::env::var("RFREMOTE_HOST").ok();
    let port = match std::env::var("RFREMOTE_PORT") {
        Ok(raw) => Some(
            raw.parse()
                .with_context(|| format!("RFREMOTE_PORT is not a port number: {raw}"))?,
        ),
        Err(_) => None,
    };
    Ok((host, port))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level);

    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    let (env_host, env_port) = env_overrides()?;
    settings.apply_overrides(args.host, args.port);
    settings.apply_overrides(env_host, env_port);

    let mut libraries = settings.libraries.clone();
    for raw in &args.libraries {
        libraries.push(parse_library_flag(raw)?);
    }
    if libraries.is_empty() {
        libraries.push(LibraryEntry {
            name: "sample".to_string(),
            spec: sample::SPEC.to_string(),
            docs: None,
        });
    }

    let mut loader = StaticLoader::new();
    loader.register(sample::SPEC, || Arc::new(sample::SampleLibrary));
    let registry = Arc::new(KeywordRegistry::new(Arc::new(loader)));
    for entry in &libraries {
        registry
            .load_library(&entry.name, &entry.spec, entry.docs.as_deref())
            .with_context(|| format!("failed to load library '{}'", entry.name))?;
    }

    let listener = Listener::new(settings.server.clone(), registry);
    let addr = listener.start().await.context("failed to start listener")?;
    tracing::info!("remote keyword server listening on http://{addr}");

    tokio::select! {
        () = listener.wait_shutdown() => {
            tracing::info!("shutdown requested remotely");
        }
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for ctrl-c")?;
            tracing::info!("interrupt received, shutting down");
        }
    }

    listener.stop().await.context("failed to stop listener")?;
    tracing::info!("shutdown complete");
    Ok(())
}
