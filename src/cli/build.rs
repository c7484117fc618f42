//! The build command.

use std::time::Instant;

use anyhow::Result;

use crate::bundle::Bundler;
use crate::config::BundleConfig;
use crate::log;

/// Runs one bundling pass over the configured entries.
pub fn run_build(config: BundleConfig) -> Result<()> {
    let started = Instant::now();
    let entries = config.entries.len();

    let bundler = Bundler::new(config.into_bundle_options());
    bundler.run()?;

    log!(
        "bundle";
        "finished {} entr{} in {:.2?}",
        entries,
        if entries == 1 { "y" } else { "ies" },
        started.elapsed()
    );
    Ok(())
}
