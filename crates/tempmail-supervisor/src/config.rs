//! Supervisor configuration: enable flags and child command lines.
//!
//! Everything is environment-variable driven, matching the deployment
//! contract of the services themselves; a few CLI flags override the env
//! for local use.

use clap::Parser;

use crate::error::{SupervisorError, SupervisorResult};
use crate::service::ServiceSpec;

/// Default command line for the bot service.
const DEFAULT_BOT_COMMAND: &str = "tempmail-telegram";

/// Default command line for the keep-alive service.
const DEFAULT_KEEP_ALIVE_COMMAND: &str = "tempmail-keepalive";

/// Command-line flags. Each one overrides the corresponding env flag.
#[derive(Debug, Default, Parser)]
#[command(
    name = "tempmail-supervisor",
    about = "Launches and monitors the TempMail API, bot, and keep-alive services",
    version
)]
pub struct Cli {
    /// Run only the API server.
    #[arg(long, conflicts_with = "bot_only")]
    pub api_only: bool,

    /// Run only the Telegram bot.
    #[arg(long)]
    pub bot_only: bool,

    /// Also run the keep-alive server.
    #[arg(long)]
    pub with_keepalive: bool,
}

/// Resolved supervisor configuration: the set of services to launch.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Enabled services, in launch order.
    pub services: Vec<ServiceSpec>,
    /// Names of services that resolved to disabled, for the startup summary.
    pub disabled: Vec<String>,
}

impl SupervisorConfig {
    /// Resolve configuration from CLI flags and the process environment.
    ///
    /// Env contract:
    /// - `ENABLE_API` (default `true`), `ENABLE_BOT` (default `true`),
    ///   `ENABLE_KEEP_ALIVE` (default `false`): a flag is on iff the value
    ///   is `true`, case-insensitive
    /// - `API_COMMAND`: required when the API is enabled (the API server
    ///   is a separate deliverable, so there is no sensible default)
    /// - `BOT_COMMAND` (default `tempmail-telegram`),
    ///   `KEEP_ALIVE_COMMAND` (default `tempmail-keepalive`)
    /// - `BOT_TOKEN`: must be present when the bot is enabled; checked
    ///   here so a misconfigured deployment fails before spawning anything
    ///
    /// # Errors
    ///
    /// Returns [`SupervisorError::Config`] for a missing `API_COMMAND` or
    /// `BOT_TOKEN`, an empty command line, or an empty service set.
    pub fn from_env(cli: &Cli) -> SupervisorResult<Self> {
        Self::from_lookup(cli, |key| std::env::var(key).ok())
    }

    /// Resolve configuration through an injected variable lookup.
    fn from_lookup(
        cli: &Cli,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> SupervisorResult<Self> {
        let mut api_enabled = env_flag(&lookup, "ENABLE_API", true);
        let mut bot_enabled = env_flag(&lookup, "ENABLE_BOT", true);
        let mut keepalive_enabled = env_flag(&lookup, "ENABLE_KEEP_ALIVE", false);

        if cli.api_only {
            api_enabled = true;
            bot_enabled = false;
        } else if cli.bot_only {
            api_enabled = false;
            bot_enabled = true;
        }
        if cli.with_keepalive {
            keepalive_enabled = true;
        }

        if bot_enabled {
            let token_present = lookup("BOT_TOKEN").is_some_and(|v| !v.is_empty());
            if !token_present {
                return Err(SupervisorError::Config(
                    "BOT_TOKEN is required when the bot is enabled — \
                     get a token from @BotFather and set it in the environment"
                        .to_owned(),
                ));
            }
        }

        let mut services = Vec::new();
        let mut disabled = Vec::new();

        if api_enabled {
            let command = lookup("API_COMMAND")
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| {
                    SupervisorError::Config(
                        "API_COMMAND is required when the API is enabled".to_owned(),
                    )
                })?;
            services.push(service_from("api", &command)?);
        } else {
            disabled.push("api".to_owned());
        }

        if bot_enabled {
            let command = lookup("BOT_COMMAND")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BOT_COMMAND.to_owned());
            services.push(service_from("bot", &command)?);
        } else {
            disabled.push("bot".to_owned());
        }

        if keepalive_enabled {
            let command = lookup("KEEP_ALIVE_COMMAND")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_KEEP_ALIVE_COMMAND.to_owned());
            services.push(service_from("keepalive", &command)?);
        } else {
            disabled.push("keepalive".to_owned());
        }

        if services.is_empty() {
            return Err(SupervisorError::Config(
                "no services enabled — check ENABLE_API / ENABLE_BOT / ENABLE_KEEP_ALIVE"
                    .to_owned(),
            ));
        }

        Ok(Self { services, disabled })
    }
}

/// Read a boolean flag the way the deployment always has: on iff `true`.
fn env_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key) {
        Some(value) => value.eq_ignore_ascii_case("true"),
        None => default,
    }
}

fn service_from(name: &str, command_line: &str) -> SupervisorResult<ServiceSpec> {
    ServiceSpec::from_command_line(name, command_line).ok_or_else(|| {
        SupervisorError::Config(format!("empty command line for service `{name}`"))
    })
}
