//! Configuration for the keep-alive server.

use crate::error::KeepAliveError;

/// Default bind address.
const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port.
const DEFAULT_PORT: u16 = 8080;

/// Keep-alive server configuration.
#[derive(Debug, Clone)]
pub struct KeepAliveConfig {
    /// Address to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

impl KeepAliveConfig {
    /// Load configuration from the process environment.
    ///
    /// - `KEEP_ALIVE_HOST` → `host` (default `0.0.0.0`)
    /// - `KEEP_ALIVE_PORT` → `port` (default `8080`)
    ///
    /// # Errors
    ///
    /// Returns [`KeepAliveError::Config`] when `KEEP_ALIVE_PORT` is set but
    /// not a valid port number.
    pub fn from_env() -> Result<Self, KeepAliveError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an injected variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, KeepAliveError> {
        let host = lookup("KEEP_ALIVE_HOST")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_owned());

        let port = match lookup("KEEP_ALIVE_PORT").filter(|v| !v.is_empty()) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| KeepAliveError::Config(format!("KEEP_ALIVE_PORT `{raw}`: {e}")))?,
            None => DEFAULT_PORT,
        };

        Ok(Self { host, port })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = KeepAliveConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
    }

    #[test]
    fn explicit_values() {
        let cfg = KeepAliveConfig::from_lookup(lookup_from(&[
            ("KEEP_ALIVE_HOST", "127.0.0.1"),
            ("KEEP_ALIVE_PORT", "9090"),
        ]))
        .unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 9090);
    }

    #[test]
    fn unparseable_port_is_fatal() {
        let err =
            KeepAliveConfig::from_lookup(lookup_from(&[("KEEP_ALIVE_PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, KeepAliveError::Config(_)));
        assert!(err.to_string().contains("KEEP_ALIVE_PORT"));
    }
}
