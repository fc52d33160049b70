use std::path::Path;

use anyhow::Result;
use clap::Parser;
use console::style;

use ratchet_runtime::{load_migrations_from_dir, Database, MigrationCatalog};

/// Show applied and pending migrations.
#[derive(Parser)]
pub struct StatusCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "ratchet.toml")]
    pub config: String,
}

impl StatusCommand {
    pub async fn execute(self) -> Result<()> {
        let config = super::load_config(&self.config)?;
        super::print_banner("Migration Status");

        let catalog = MigrationCatalog::from_migrations(load_migrations_from_dir(Path::new(
            &config.migrations.dir,
        ))?)?;

        let db = Database::from_config(&config.database).await?;
        let ledger = db.ledger();
        ledger.init().await?;

        let status = catalog.status(&ledger).await?;
        let applied = ledger.applied_migrations().await?;
        db.close().await;

        if applied.is_empty() && status.pending.is_empty() {
            println!("  {} No migrations found", style("ℹ").blue());
            return Ok(());
        }

        if !applied.is_empty() {
            println!("  {} Applied:", style("✓").green());
            for m in &applied {
                let known = if catalog.contains(&m.id) {
                    style("-").dim().to_string()
                } else {
                    style("?").yellow().to_string()
                };
                println!(
                    "    {} {} {} {} ({})",
                    known,
                    style(&m.id).cyan(),
                    style(&m.version).dim(),
                    style("at").dim(),
                    m.applied_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }

        if !status.pending.is_empty() {
            if !applied.is_empty() {
                println!();
            }
            println!("  {} Pending:", style("○").yellow());
            for id in &status.pending {
                println!("    {} {}", style("→").dim(), style(id).yellow());
            }
        }

        println!();
        println!(
            "  {} {} applied, {} pending",
            style("ℹ").blue(),
            applied.len(),
            status.pending.len()
        );
        println!(
            "  {} = not in {}",
            style("?").yellow(),
            config.migrations.dir
        );
        println!();

        Ok(())
    }
}
