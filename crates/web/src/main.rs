//! Credfix daemon
//!
//! Serves every configured login fixture, each on its own address.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use credfix_common::FixtureSetConfig;

#[derive(Parser)]
#[command(name = "credfixd")]
#[command(about = "Credfix - deliberately weak login fixtures for scanner testing")]
#[command(version)]
struct Cli {
    /// Fixture set configuration file (defaults are used when it does not exist)
    #[arg(short, long, env = "CREDFIX_CONFIG")]
    config: Option<PathBuf>,

    /// Override the session TTL in seconds
    #[arg(long)]
    session_ttl: Option<i64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.unwrap_or_else(credfix_common::default_config_path);
    let mut config = FixtureSetConfig::load(&config_path)?;
    if let Some(ttl) = cli.session_ttl {
        config.session_ttl_secs = ttl;
    }

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    info!("Credfix v{}", credfix_common::VERSION);
    info!(
        "Loaded {} fixtures from {}",
        config.fixtures.len(),
        config_path.display()
    );

    credfix_common::theme::init_global(config.theme_file.clone());

    credfix_web::serve_fixture_set(&config).await?;

    info!("Credfix shutdown complete");
    Ok(())
}
