//! TempMail keep-alive server — standalone binary mode.

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,tempmail_keepalive=info")),
        )
        .init();

    let config = tempmail_keepalive::KeepAliveConfig::from_env()?;
    tempmail_keepalive::serve(config).await?;
    Ok(())
}
