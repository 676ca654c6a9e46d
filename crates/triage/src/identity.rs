//! Reporter identity resolution.
//!
//! Maps a reporter's email to a ticketing-backend account so staff reports
//! can be assigned to the reporter. Only addresses in the organisation's own
//! domain are considered; anything else resolves to `None` without touching
//! the network.
//!
//! Results are memoised in an injected [`AccountCache`]. Entries are never
//! evicted and negative results are cached too, so each canonical address
//! costs at most one remote lookup per cache lifetime. Two tasks resolving the
//! same uncached address concurrently may both hit the backend; both write the
//! same pairs, so the cache converges.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::ports::AccountDirectory;
use crate::{AccountId, AccountRecord, TrackerError};

/// Longest email accepted for resolution, in bytes.
pub const MAX_EMAIL_LEN: usize = 100;

/// Organisation domain used when none is configured.
pub const DEFAULT_DOMAIN: &str = "beeper.com";

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Reduces `email` to its canonical `localpart@domain` form.
///
/// Returns `None` when the address is too long, does not have exactly one
/// `@`, is not in `domain`, or has a local part (after dropping any
/// `+suffix`) that is empty or contains anything besides lowercase ASCII
/// letters, `.` and `-`.
pub fn canonical_email(email: &str, domain: &str) -> Option<String> {
    if email.len() > MAX_EMAIL_LEN {
        return None;
    }
    let mut parts = email.split('@');
    let (local, host) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(host), None) => (local, host),
        _ => return None,
    };
    if host != domain {
        return None;
    }
    let local = local.split('+').next().unwrap_or_default();
    if local.is_empty() || !local.chars().all(is_local_char) {
        return None;
    }
    Some(format!("{local}@{domain}"))
}

fn is_local_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch == '.' || ch == '-'
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Outcome recorded for an email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEntry {
    /// The address belongs to this account.
    Account(AccountId),
    /// The address was looked up and matched nothing (or the lookup failed).
    NoAccount,
}

impl AccountEntry {
    /// Returns the account id, if any.
    pub fn account(&self) -> Option<&AccountId> {
        match self {
            Self::Account(id) => Some(id),
            Self::NoAccount => None,
        }
    }
}

/// Concurrent email → account store shared by all resolvers.
///
/// Implementations must be safe to call from many tasks at once. Writes for
/// the same key are idempotent, so last-writer-wins is acceptable.
pub trait AccountCache: Send + Sync {
    /// Returns the entry for `email`, or `None` if it was never recorded.
    fn get(&self, email: &str) -> Option<AccountEntry>;

    /// Records `entry` for `email`, replacing any previous entry.
    fn insert(&self, email: String, entry: AccountEntry);

    /// Number of recorded addresses.
    fn len(&self) -> usize;

    /// Returns `true` if nothing has been recorded.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// [`AccountCache`] backed by a `RwLock<HashMap>`.
#[derive(Debug, Default)]
pub struct InMemoryAccountCache {
    entries: RwLock<HashMap<String, AccountEntry>>,
}

impl InMemoryAccountCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountCache for InMemoryAccountCache {
    fn get(&self, email: &str) -> Option<AccountEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(email)
            .cloned()
    }

    fn insert(&self, email: String, entry: AccountEntry) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(email, entry);
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves reporter emails to backend accounts.
#[derive(Clone)]
pub struct IdentityResolver {
    directory: Arc<dyn AccountDirectory>,
    cache: Arc<dyn AccountCache>,
    domain: String,
}

impl IdentityResolver {
    /// Creates a resolver for addresses in `domain`.
    pub fn new(
        directory: Arc<dyn AccountDirectory>,
        cache: Arc<dyn AccountCache>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            cache,
            domain: domain.into(),
        }
    }

    /// The organisation domain this resolver accepts.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Resolves `email` to an account.
    ///
    /// Never fails: invalid input, unknown addresses and backend errors all
    /// yield `None`. A backend error is cached as [`AccountEntry::NoAccount`]
    /// so the same address is not retried.
    pub async fn resolve(&self, email: &str) -> Option<AccountId> {
        let canonical = canonical_email(email, &self.domain)?;
        if let Some(entry) = self.cache.get(&canonical) {
            return entry.account().cloned();
        }

        warn!(email = %canonical, "account for email is not cached, fetching from backend");
        match self.directory.find_accounts_by_email(&canonical).await {
            Ok(accounts) => {
                for account in &accounts {
                    info!(
                        found_email = %account.email,
                        found_name = %account.name,
                        found_id = %account.id,
                        "found account for email"
                    );
                }
                self.record(accounts);
                if self.cache.get(&canonical).is_none() {
                    self.cache.insert(canonical.clone(), AccountEntry::NoAccount);
                }
            }
            Err(error) => {
                warn!(email = %canonical, %error, "error finding account for email");
                self.cache.insert(canonical.clone(), AccountEntry::NoAccount);
            }
        }

        self.cache.get(&canonical).and_then(|e| e.account().cloned())
    }

    /// Loads every account the backend lists into the cache.
    ///
    /// Returns the number of entries written. Unlike [`resolve`](Self::resolve)
    /// this propagates backend errors so the caller can decide whether to
    /// start without a warm cache.
    pub async fn prefill(&self) -> Result<usize, TrackerError> {
        let accounts = self.directory.list_accounts().await?;
        let count = accounts.len();
        for account in &accounts {
            info!(
                email = %account.email,
                name = %account.name,
                account_id = %account.id,
                "found account for email"
            );
        }
        self.record(accounts);
        Ok(count)
    }

    fn record(&self, accounts: Vec<AccountRecord>) {
        for account in accounts {
            let entry = match AccountId::new(account.id) {
                Some(id) => AccountEntry::Account(id),
                None => AccountEntry::NoAccount,
            };
            self.cache.insert(account.email, entry);
        }
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("domain", &self.domain)
            .field("cached", &self.cache.len())
            .finish()
    }
}
