//! Callback triggers: the opaque strings carried by inline keyboard buttons.
//!
//! Wire format (kept stable so old keyboards keep working across restarts):
//! `gen_<kind>`, `check_messages`, `check_<email>`, `copy_<email>`.

use tempmail_core::MailboxKind;

/// A decoded button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Generate a new mailbox of the given kind.
    Generate(MailboxKind),
    /// List all of the user's mailboxes.
    CheckAll,
    /// Check messages for one mailbox.
    Check(String),
    /// Re-display a mailbox address for copying.
    Copy(String),
}

impl Trigger {
    /// Decode callback data into a trigger. Returns `None` for anything
    /// outside the closed trigger set.
    #[must_use]
    pub fn parse(data: &str) -> Option<Self> {
        if data == "check_messages" {
            return Some(Self::CheckAll);
        }
        if let Some(kind) = data.strip_prefix("gen_") {
            return kind.parse::<MailboxKind>().ok().map(Self::Generate);
        }
        if let Some(email) = data.strip_prefix("check_") {
            return Some(Self::Check(email.to_string()));
        }
        if let Some(email) = data.strip_prefix("copy_") {
            return Some(Self::Copy(email.to_string()));
        }
        None
    }

    /// Encode the trigger as callback data.
    #[must_use]
    pub fn callback_data(&self) -> String {
        match self {
            Self::Generate(kind) => format!("gen_{kind}"),
            Self::CheckAll => "check_messages".to_string(),
            Self::Check(email) => format!("check_{email}"),
            Self::Copy(email) => format!("copy_{email}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_generate_kinds() {
        assert_eq!(
            Trigger::parse("gen_regular"),
            Some(Trigger::Generate(MailboxKind::Regular))
        );
        assert_eq!(
            Trigger::parse("gen_10min"),
            Some(Trigger::Generate(MailboxKind::TenMinute))
        );
        assert_eq!(
            Trigger::parse("gen_edu"),
            Some(Trigger::Generate(MailboxKind::Edu))
        );
    }

    #[test]
    fn parse_unknown_generate_kind_is_rejected() {
        assert_eq!(Trigger::parse("gen_forever"), None);
    }

    #[test]
    fn parse_check_messages_is_check_all() {
        assert_eq!(Trigger::parse("check_messages"), Some(Trigger::CheckAll));
    }

    #[test]
    fn parse_check_with_email() {
        assert_eq!(
            Trigger::parse("check_a@b.com"),
            Some(Trigger::Check("a@b.com".to_string()))
        );
    }

    #[test]
    fn parse_copy_with_email() {
        assert_eq!(
            Trigger::parse("copy_a@b.com"),
            Some(Trigger::Copy("a@b.com".to_string()))
        );
    }

    #[test]
    fn parse_garbage_is_rejected() {
        assert_eq!(Trigger::parse(""), None);
        assert_eq!(Trigger::parse("approve:1"), None);
    }

    #[test]
    fn callback_data_round_trips() {
        let triggers = [
            Trigger::Generate(MailboxKind::TenMinute),
            Trigger::CheckAll,
            Trigger::Check("a@b.com".to_string()),
            Trigger::Copy("a@b.com".to_string()),
        ];
        for trigger in triggers {
            assert_eq!(Trigger::parse(&trigger.callback_data()), Some(trigger));
        }
    }
}
