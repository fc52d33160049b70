mod progress;
mod status;
mod up;

pub use status::StatusCommand;
pub use up::UpCommand;

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;

use ratchet_core::RatchetConfig;

/// Ratchet - forward-only database migrations
#[derive(Parser)]
#[command(name = "ratchet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run all pending migrations.
    Up(UpCommand),

    /// Show applied and pending migrations.
    Status(StatusCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Up(cmd) => cmd.execute().await,
            Commands::Status(cmd) => cmd.execute().await,
        }
    }
}

/// Load `.env` and the TOML configuration, then start logging.
fn load_config(path: &str) -> Result<RatchetConfig> {
    // Load .env if present
    dotenvy::dotenv().ok();

    if !Path::new(path).exists() {
        anyhow::bail!(
            "Configuration file not found: {}\nCreate one with a [database] url entry.",
            path
        );
    }

    let config = RatchetConfig::from_file(path)?;
    init_tracing(&config.log_level);
    Ok(config)
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string()))
        .try_init()
        .ok();
}

fn print_banner(title: &str) {
    println!();
    println!(
        "  {}  {} {}",
        style("⚙").bold(),
        style("RATCHET").bold().cyan(),
        title
    );
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_up_with_overrides() {
        let cli = Cli::try_parse_from([
            "ratchet", "up", "--config", "db.toml", "--from", "1.0", "--to", "2.0", "--product",
            "cms",
        ])
        .unwrap();

        match cli.command {
            Commands::Up(cmd) => {
                assert_eq!(cmd.config, "db.toml");
                assert_eq!(cmd.from.as_deref(), Some("1.0"));
                assert_eq!(cmd.to.as_deref(), Some("2.0"));
                assert_eq!(cmd.product.as_deref(), Some("cms"));
            }
            _ => panic!("expected up"),
        }
    }

    #[test]
    fn test_parse_status_defaults() {
        let cli = Cli::try_parse_from(["ratchet", "status"]).unwrap();
        match cli.command {
            Commands::Status(cmd) => assert_eq!(cmd.config, "ratchet.toml"),
            _ => panic!("expected status"),
        }
    }

    #[test]
    fn test_missing_config_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(load_config(path.to_str().unwrap()).is_err());
    }
}
