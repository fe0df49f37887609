// Local crates
use crate::api::migrations;
use crate::app::app::App;

// External crates
use anyhow::Result;

/// Runs the pending data migrations against the app data directory.
pub async fn run(app: &dyn App) -> Result<()> {
    let applied = migrations::run_pending(app).await?;

    if applied == 0 {
        println!("No migrations to apply");
    } else {
        println!("Applied {applied} migration(s)");
    }

    Ok(())
}
