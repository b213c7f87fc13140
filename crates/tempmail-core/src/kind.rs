//! Mailbox kinds and the remote endpoints they map to.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The three mailbox flavors offered by the remote temp-mail API.
///
/// The kind decides which generate/check endpoint is called and which
/// response parser applies. The remote API is not consistent across
/// flavors, so the kind must travel with every stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MailboxKind {
    /// Standard temporary mailbox with no declared expiry.
    Regular,
    /// Mailbox that the remote system expires after ten minutes.
    TenMinute,
    /// Mailbox under an `.edu` domain.
    Edu,
}

impl MailboxKind {
    /// All kinds, in the order they are presented to users.
    pub const ALL: [MailboxKind; 3] = [Self::Regular, Self::TenMinute, Self::Edu];

    /// Wire identifier used in callback triggers and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::TenMinute => "10min",
            Self::Edu => "edu",
        }
    }

    /// Relative path of the generate endpoint for this kind.
    #[must_use]
    pub fn generate_path(self) -> &'static str {
        match self {
            Self::Regular => "/api/gen",
            Self::TenMinute => "/api/10min/gen",
            Self::Edu => "/api/edu/gen",
        }
    }

    /// Relative path of the check-messages endpoint for this kind.
    ///
    /// The access token is passed separately as a `token` query parameter.
    #[must_use]
    pub fn check_path(self) -> &'static str {
        match self {
            Self::Regular => "/api/chk",
            Self::TenMinute => "/api/10min/chk",
            Self::Edu => "/api/edu/chk",
        }
    }

    /// Human-readable label for display text.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::TenMinute => "10-minute",
            Self::Edu => "edu",
        }
    }
}

impl fmt::Display for MailboxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a mailbox kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mailbox kind: {0}")]
pub struct KindParseError(pub String);

impl FromStr for MailboxKind {
    type Err = KindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(Self::Regular),
            "10min" => Ok(Self::TenMinute),
            "edu" => Ok(Self::Edu),
            other => Err(KindParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_ids_round_trip() {
        for kind in MailboxKind::ALL {
            assert_eq!(kind.as_str().parse::<MailboxKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = "5min".parse::<MailboxKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown mailbox kind: 5min");
    }

    #[test]
    fn generate_paths_are_distinct_per_kind() {
        assert_eq!(MailboxKind::Regular.generate_path(), "/api/gen");
        assert_eq!(MailboxKind::TenMinute.generate_path(), "/api/10min/gen");
        assert_eq!(MailboxKind::Edu.generate_path(), "/api/edu/gen");
    }

    #[test]
    fn check_paths_are_distinct_per_kind() {
        assert_eq!(MailboxKind::Regular.check_path(), "/api/chk");
        assert_eq!(MailboxKind::TenMinute.check_path(), "/api/10min/chk");
        assert_eq!(MailboxKind::Edu.check_path(), "/api/edu/chk");
    }

    #[test]
    fn display_matches_wire_id() {
        assert_eq!(MailboxKind::TenMinute.to_string(), "10min");
    }
}
