use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use writeback_driver::{run, Options};

fn main() -> anyhow::Result<()> {
  fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_target(true)
    .with_writer(std::io::stderr)
    .init();

  let options = Options::parse();
  let summary = run(&options).with_context(|| format!("failed to drive item file '{}'", options.items.display()))?;

  tracing::info!(
    readers = summary.readers,
    writers = summary.writers,
    steps = summary.steps,
    "done"
  );
  Ok(())
}
