//! Per-user session store: Telegram `UserId` → generated mailboxes.
//!
//! Each successful generate call produces one [`SessionRecord`] keyed by
//! mailbox address. Records are never mutated after insertion; they leave
//! the store only through the eviction policy. The store lives purely in
//! memory and is lost on restart.
//!
//! Growth is bounded by an explicit [`StorePolicy`]: a per-user record cap
//! (oldest evicted first) and an age limit applied on every access. The
//! clock is injected so eviction is testable.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexMap;
use teloxide::types::UserId;
use tokio::sync::RwLock;

use tempmail_core::MailboxKind;

/// Source of "now" for record timestamps and age eviction.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One generated mailbox belonging to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Token required to check messages for this mailbox.
    pub access_token: String,
    /// Which endpoint family the mailbox belongs to.
    pub kind: MailboxKind,
    /// When the mailbox was generated (store clock).
    pub created_at: DateTime<Utc>,
}

/// Growth limits for the store.
#[derive(Debug, Clone, Copy)]
pub struct StorePolicy {
    /// Maximum records kept per user; inserting beyond this evicts the
    /// oldest record for that user.
    pub max_per_user: usize,
    /// Records older than this are pruned on access.
    pub max_age: TimeDelta,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            max_per_user: 32,
            max_age: TimeDelta::hours(24),
        }
    }
}

/// Interior state guarded by a single `RwLock`.
///
/// Per-user maps are insertion-ordered so `/check` lists mailboxes in the
/// order they were generated.
struct Inner {
    users: HashMap<UserId, IndexMap<String, SessionRecord>>,
}

/// In-memory session store, cheap to clone and shared between handlers.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Inner>>,
    policy: StorePolicy,
    clock: Arc<dyn Clock>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a store with the default policy and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(StorePolicy::default(), Arc::new(SystemClock))
    }

    /// Create a store with an explicit policy and clock.
    #[must_use]
    pub fn with_policy(policy: StorePolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                users: HashMap::new(),
            })),
            policy,
            clock,
        }
    }

    /// Insert a record for `user` + `email`, stamping `created_at` from the
    /// store clock. Overwrites any existing record for the same address.
    ///
    /// Returns the stored record.
    pub async fn insert(
        &self,
        user: UserId,
        email: String,
        access_token: String,
        kind: MailboxKind,
    ) -> SessionRecord {
        let now = self.clock.now();
        let record = SessionRecord {
            access_token,
            kind,
            created_at: now,
        };

        let mut guard = self.inner.write().await;
        let sessions = guard.users.entry(user).or_default();
        Self::prune_expired(sessions, now, self.policy.max_age);
        sessions.insert(email, record.clone());
        while sessions.len() > self.policy.max_per_user {
            sessions.shift_remove_index(0);
        }
        record
    }

    /// Get the record for `user` + `email`, if present and not expired.
    pub async fn get(&self, user: UserId, email: &str) -> Option<SessionRecord> {
        let now = self.clock.now();
        let mut guard = self.inner.write().await;
        let sessions = guard.users.get_mut(&user)?;
        Self::prune_expired(sessions, now, self.policy.max_age);
        sessions.get(email).cloned()
    }

    /// Whether `user` has no live records.
    pub async fn is_empty(&self, user: UserId) -> bool {
        let now = self.clock.now();
        let mut guard = self.inner.write().await;
        let Some(sessions) = guard.users.get_mut(&user) else {
            return true;
        };
        Self::prune_expired(sessions, now, self.policy.max_age);
        sessions.is_empty()
    }

    /// All live records for `user`, in insertion order. Empty if the user
    /// has never generated a mailbox.
    pub async fn list(&self, user: UserId) -> Vec<(String, SessionRecord)> {
        let now = self.clock.now();
        let mut guard = self.inner.write().await;
        let Some(sessions) = guard.users.get_mut(&user) else {
            return Vec::new();
        };
        Self::prune_expired(sessions, now, self.policy.max_age);
        sessions
            .iter()
            .map(|(email, record)| (email.clone(), record.clone()))
            .collect()
    }

    /// Drop records older than `max_age`.
    fn prune_expired(sessions: &mut IndexMap<String, SessionRecord>, now: DateTime<Utc>, max_age: TimeDelta) {
        sessions.retain(|_, record| now.signed_duration_since(record.created_at) <= max_age);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Clock fixed at a settable instant.
    #[derive(Clone)]
    struct TestClock(Arc<Mutex<DateTime<Utc>>>);

    impl TestClock {
        fn at(start: DateTime<Utc>) -> Self {
            Self(Arc::new(Mutex::new(start)))
        }

        fn advance(&self, delta: TimeDelta) {
            let mut guard = self.0.lock().unwrap();
            *guard = guard.checked_add_signed(delta).unwrap();
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn store_with_clock(policy: StorePolicy) -> (SessionStore, TestClock) {
        let clock = TestClock::at(epoch());
        let store = SessionStore::with_policy(policy, Arc::new(clock.clone()));
        (store, clock)
    }

    fn user(id: u64) -> UserId {
        UserId(id)
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = SessionStore::new();
        assert!(store.is_empty(user(1)).await);
        assert!(store.list(user(1)).await.is_empty());
        assert!(store.get(user(1), "a@b.com").await.is_none());
    }

    #[tokio::test]
    async fn is_empty_clears_after_insert() {
        let store = SessionStore::new();
        store
            .insert(user(1), "a@b.com".into(), "tok".into(), MailboxKind::Regular)
            .await;
        assert!(!store.is_empty(user(1)).await);
        assert!(store.is_empty(user(2)).await);
    }

    #[tokio::test]
    async fn insert_then_get_returns_exact_record() {
        let (store, _clock) = store_with_clock(StorePolicy::default());
        let inserted = store
            .insert(user(1), "a@b.com".into(), "tok1".into(), MailboxKind::Regular)
            .await;

        assert_eq!(inserted.access_token, "tok1");
        assert_eq!(inserted.kind, MailboxKind::Regular);
        assert_eq!(inserted.created_at, epoch());

        let fetched = store.get(user(1), "a@b.com").await;
        assert_eq!(fetched, Some(inserted));
    }

    #[tokio::test]
    async fn get_unknown_email_returns_none() {
        let store = SessionStore::new();
        store
            .insert(user(1), "a@b.com".into(), "tok".into(), MailboxKind::Regular)
            .await;
        assert!(store.get(user(1), "z@b.com").await.is_none());
    }

    #[tokio::test]
    async fn insert_overwrites_existing_record() {
        let store = SessionStore::new();
        store
            .insert(user(1), "a@b.com".into(), "tok1".into(), MailboxKind::Regular)
            .await;
        store
            .insert(user(1), "a@b.com".into(), "tok2".into(), MailboxKind::Edu)
            .await;

        let record = store.get(user(1), "a@b.com").await.unwrap();
        assert_eq!(record.access_token, "tok2");
        assert_eq!(record.kind, MailboxKind::Edu);
        assert_eq!(store.list(user(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = SessionStore::new();
        store
            .insert(user(1), "first@x.com".into(), "t1".into(), MailboxKind::Regular)
            .await;
        store
            .insert(user(1), "second@x.com".into(), "t2".into(), MailboxKind::TenMinute)
            .await;
        store
            .insert(user(1), "third@x.com".into(), "t3".into(), MailboxKind::Edu)
            .await;

        let emails: Vec<String> = store
            .list(user(1))
            .await
            .into_iter()
            .map(|(email, _)| email)
            .collect();
        assert_eq!(emails, ["first@x.com", "second@x.com", "third@x.com"]);
    }

    #[tokio::test]
    async fn users_are_independent() {
        let store = SessionStore::new();
        store
            .insert(user(1), "a@b.com".into(), "t1".into(), MailboxKind::Regular)
            .await;

        assert!(store.list(user(2)).await.is_empty());
        assert!(store.get(user(2), "a@b.com").await.is_none());
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store1 = SessionStore::new();
        let store2 = store1.clone();
        store1
            .insert(user(1), "a@b.com".into(), "t".into(), MailboxKind::Regular)
            .await;
        assert!(store2.get(user(1), "a@b.com").await.is_some());
    }

    // --- policy: per-user cap ---

    #[tokio::test]
    async fn cap_evicts_oldest_record() {
        let policy = StorePolicy {
            max_per_user: 2,
            ..StorePolicy::default()
        };
        let (store, _clock) = store_with_clock(policy);

        store
            .insert(user(1), "one@x.com".into(), "t1".into(), MailboxKind::Regular)
            .await;
        store
            .insert(user(1), "two@x.com".into(), "t2".into(), MailboxKind::Regular)
            .await;
        store
            .insert(user(1), "three@x.com".into(), "t3".into(), MailboxKind::Regular)
            .await;

        let emails: Vec<String> = store
            .list(user(1))
            .await
            .into_iter()
            .map(|(email, _)| email)
            .collect();
        assert_eq!(emails, ["two@x.com", "three@x.com"]);
    }

    #[tokio::test]
    async fn cap_does_not_cross_users() {
        let policy = StorePolicy {
            max_per_user: 1,
            ..StorePolicy::default()
        };
        let (store, _clock) = store_with_clock(policy);

        store
            .insert(user(1), "a@x.com".into(), "t".into(), MailboxKind::Regular)
            .await;
        store
            .insert(user(2), "b@x.com".into(), "t".into(), MailboxKind::Regular)
            .await;

        assert_eq!(store.list(user(1)).await.len(), 1);
        assert_eq!(store.list(user(2)).await.len(), 1);
    }

    // --- policy: age eviction ---

    #[tokio::test]
    async fn expired_records_are_pruned_on_access() {
        let policy = StorePolicy {
            max_age: TimeDelta::hours(1),
            ..StorePolicy::default()
        };
        let (store, clock) = store_with_clock(policy);

        store
            .insert(user(1), "old@x.com".into(), "t".into(), MailboxKind::Regular)
            .await;

        clock.advance(TimeDelta::minutes(59));
        assert!(store.get(user(1), "old@x.com").await.is_some());

        clock.advance(TimeDelta::minutes(2));
        assert!(store.get(user(1), "old@x.com").await.is_none());
        assert!(store.list(user(1)).await.is_empty());
        assert!(store.is_empty(user(1)).await);
    }

    #[tokio::test]
    async fn fresh_records_survive_pruning_of_old_ones() {
        let policy = StorePolicy {
            max_age: TimeDelta::hours(1),
            ..StorePolicy::default()
        };
        let (store, clock) = store_with_clock(policy);

        store
            .insert(user(1), "old@x.com".into(), "t1".into(), MailboxKind::Regular)
            .await;
        clock.advance(TimeDelta::minutes(45));
        store
            .insert(user(1), "new@x.com".into(), "t2".into(), MailboxKind::Regular)
            .await;
        clock.advance(TimeDelta::minutes(30));

        let emails: Vec<String> = store
            .list(user(1))
            .await
            .into_iter()
            .map(|(email, _)| email)
            .collect();
        assert_eq!(emails, ["new@x.com"]);
    }

    #[tokio::test]
    async fn ten_minute_kind_has_no_special_purge() {
        // The remote system expires ten-minute mailboxes, but the local
        // record stays until the generic age policy removes it.
        let policy = StorePolicy {
            max_age: TimeDelta::hours(1),
            ..StorePolicy::default()
        };
        let (store, clock) = store_with_clock(policy);

        store
            .insert(user(1), "ten@x.com".into(), "t".into(), MailboxKind::TenMinute)
            .await;
        clock.advance(TimeDelta::minutes(30));
        assert!(store.get(user(1), "ten@x.com").await.is_some());
    }
}
