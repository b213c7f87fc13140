//! TempMail Telegram Bot — standalone binary mode.
//!
//! Polls Telegram for updates and forwards generate/check commands to the
//! remote temp-mail API. Usually launched by `tempmail-supervisor`.

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,tempmail_telegram=info")),
        )
        .init();

    let config = tempmail_telegram::config::BotConfig::from_env()?;
    Box::pin(tempmail_telegram::bot::run(config)).await
}
