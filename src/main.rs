//! Binary entry point: load configuration, start file logging, open the
//! SQLite store, and drive the Ratatui event loop until the user exits.
use anyhow::Context;
use loan_desk::logging::init_logging;
use loan_desk::{run_app, App, Config, Desk, Store};
use tracing::info;

/// Returning a `Result` bubbles fatal startup problems (an unreadable config
/// file, an unreachable database) to the terminal instead of crashing
/// silently.
fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_logging(&config.log_file)?;
    info!(db = %config.database_path.display(), "starting loan desk");

    let store = Store::open(&config).context("failed to open the loan database")?;
    let mut app = App::new(Desk::new(store)).context("failed to load records")?;
    run_app(&mut app)?;

    info!("loan desk closed");
    Ok(())
}
