mod bootstrap;

use anyhow::Result;
use peer_core::settings::Settings;

fn main() -> Result<()> {
    let settings = Settings::load()?;

    bootstrap::setup_logging(&settings.log_level)?;

    tracing::info!("relay-peer-calc v{} starting", env!("CARGO_PKG_VERSION"));

    let config = settings.pipeline_config()?;
    tracing::info!(
        "Input: {}, Output: {}, Month: {}, Layout: {}",
        config.input_dir.display(),
        config.output_path.display(),
        config.month,
        config.layout
    );

    let report = peer_runtime::run(&config)?;

    for skipped in &report.skipped {
        tracing::warn!("Skipped {}: {}", skipped.path.display(), skipped.reason);
    }

    println!(
        "CSV files have been successfully merged, deduplicated, and written to {}",
        config.output_path.display()
    );

    Ok(())
}
