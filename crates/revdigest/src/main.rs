mod cli;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use revdigest_core::{Clock, Digest, FixedClock, MemoryStore, SystemClock};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = MemoryStore::load(&cli.store)
        .with_context(|| format!("Failed to load content snapshot {}", cli.store.display()))?;
    info!(
        items = store.items.len(),
        revisions = store.revisions.len(),
        "snapshot loaded"
    );

    let clock: Box<dyn Clock> = match cli.now {
        Some(now) => Box::new(FixedClock(now)),
        None => Box::new(SystemClock),
    };

    let request = cli.request(&config);
    let digest = Digest::from_store(&store, clock.as_ref());
    let groups = digest.get_grouped_changes(&request)?;

    let out = output::render(cli.format, &groups, &request, &store, &store)?;
    print!("{out}");
    Ok(())
}
