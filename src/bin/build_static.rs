//! Re-inject the dashboard page from the last exported snapshot.

use bidscope::export::load_snapshot;
use bidscope::publish::PageInjector;
use bidscope::{init_tracing, AppError, Config};
use tracing::{error, info};

fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let snapshot = load_snapshot(&config.snapshot_path)?.ok_or_else(|| {
        AppError::NotFound(format!("no snapshot at {}", config.snapshot_path.display()))
    })?;
    info!("Loaded data (Last Updated: {})", snapshot.last_updated);

    PageInjector::new()?.publish(&config.template_path, &snapshot, config.lookback_blocks)?;
    Ok(())
}

fn main() {
    init_tracing();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(e.exit_code());
    }
}
