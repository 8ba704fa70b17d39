//! Initialize command.

use console::style;

use crate::config::Settings;

/// Initialize the data directory and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.has_database_url() {
        settings.ensure_directories()?;
    }

    let ctx = settings.create_db_context()?;
    ctx.init_schema().await?;

    println!(
        "{} Initialized brainbase in {}",
        style("✓").green(),
        settings.data_dir.display()
    );

    Ok(())
}
