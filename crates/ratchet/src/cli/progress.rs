use console::style;

use ratchet_core::error::Result;
use ratchet_core::{MigrationEvent, MigrationListener};

/// Prints one line per step as the run progresses.
pub struct ProgressListener;

impl MigrationListener for ProgressListener {
    fn name(&self) -> &str {
        "progress"
    }

    fn before_migration(&self, event: &MigrationEvent<'_>) -> Result<()> {
        println!(
            "  {} [{}/{}] {} {}",
            style("→").dim(),
            event.position + 1,
            event.total(),
            style(&event.migration.id).cyan(),
            style(format!("({})", event.migration.version)).dim()
        );
        Ok(())
    }

    fn after_migration(&self, event: &MigrationEvent<'_>) -> Result<()> {
        println!(
            "  {} Applied {}",
            style("✓").green(),
            event.migration.id
        );
        Ok(())
    }
}
