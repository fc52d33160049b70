use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing::{info, warn};

use ratchet_core::SemVersion;
use ratchet_runtime::{
    load_migrations_from_dir, Database, MigrationCatalog, MigrationEventBus, MigrationRunner,
};

use super::progress::ProgressListener;

/// Run all pending migrations.
#[derive(Parser)]
pub struct UpCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "ratchet.toml")]
    pub config: String,

    /// Version the database is at (overrides config).
    #[arg(long)]
    pub from: Option<String>,

    /// Version to migrate to (overrides config; defaults to the newest migration).
    #[arg(long)]
    pub to: Option<String>,

    /// Product name the run is performed for (overrides config).
    #[arg(long)]
    pub product: Option<String>,
}

impl UpCommand {
    pub async fn execute(self) -> Result<()> {
        let config = super::load_config(&self.config)?;
        super::print_banner("Migrations");

        let catalog = MigrationCatalog::from_migrations(load_migrations_from_dir(Path::new(
            &config.migrations.dir,
        ))?)?;
        if catalog.is_empty() {
            println!(
                "  {} No migrations found in {}",
                style("ℹ").blue(),
                config.migrations.dir
            );
            return Ok(());
        }

        let current = match &self.from {
            Some(v) => SemVersion::parse(v).context("invalid --from version")?,
            None => config.migrations.current_version,
        };
        let target = match &self.to {
            Some(v) => SemVersion::parse(v).context("invalid --to version")?,
            None => config
                .migrations
                .target_version
                .or_else(|| catalog.latest_version())
                .unwrap_or(current),
        };
        let product = self.product.or(config.migrations.product_name);

        let db = Database::from_config(&config.database).await?;
        let ledger = db.ledger();
        ledger.init().await?;

        let events = Arc::new(MigrationEventBus::new());
        events.register(Arc::new(ProgressListener));

        info!("Migrating {} -> {}", current, target);
        let runner = MigrationRunner::new(current, target, product.as_deref(), catalog)
            .with_events(events)
            .with_ledger(ledger)
            .with_listener_policy(config.migrations.listener_policy);

        let lock = db.acquire_lock().await?;
        let outcome = runner.execute(&db.store()).await;
        if let Err(e) = lock.release().await {
            warn!("{}", e);
        }
        db.close().await;
        let result = outcome?;

        println!();
        if result.attempted == 0 && result.is_success() {
            println!("  {} Nothing to migrate", style("ℹ").blue());
        }
        if result.skipped > 0 {
            println!(
                "  {} {} already applied",
                style("ℹ").blue(),
                result.skipped
            );
        }

        let succeeded = result.succeeded;
        match result.into_result() {
            Ok(_) => {
                println!(
                    "  {} {} migration(s) applied, now at {}",
                    style("✓").green(),
                    succeeded,
                    target
                );
                println!();
                Ok(())
            }
            Err(e) => {
                println!(
                    "  {} Stopped after {} migration(s)",
                    style("✗").red(),
                    succeeded
                );
                println!();
                Err(e.into())
            }
        }
    }
}
