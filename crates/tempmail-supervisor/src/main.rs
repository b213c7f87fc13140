//! TempMail service manager — launches the API, bot, and keep-alive
//! services as child processes and supervises them until shutdown.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tempmail_supervisor::{Cli, Supervisor, SupervisorConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,tempmail_supervisor=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = SupervisorConfig::from_env(&cli)?;

    info!("TempMail service manager");
    for spec in &config.services {
        info!(service = %spec.name, command = %spec.command_line(), "Service enabled");
    }
    for name in &config.disabled {
        info!(service = %name, "Service disabled");
    }

    let mut supervisor = Supervisor::new(config.services);
    supervisor.run().await?;
    Ok(())
}
