//! In-memory cache store.
//!
//! Mirrors the Redis data model closely enough for the services to behave
//! identically: typed values, per-key expiry, `WRONGTYPE` reporting, glob
//! deletion and Redis list-range index rules. Expiry uses `tokio::time`, so
//! tests can drive TTLs with a paused clock.

use super::CacheStore;
use clinica_core::{ClinicaError, ClinicaResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use shaku::Component;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Value stored under one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryValue {
    Str(String),
    Hash(HashMap<String, String>),
    List(VecDeque<String>),
}

impl MemoryValue {
    const fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Hash(_) => "hash",
            Self::List(_) => "list",
        }
    }
}

/// A value with its optional expiry deadline.
#[derive(Debug, Clone)]
pub struct MemoryEntry {
    pub value: MemoryValue,
    pub expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| now < deadline)
    }
}

/// Keyed entries of the in-memory store.
pub type CacheEntries = RwLock<HashMap<String, MemoryEntry>>;

/// Process-local cache store.
#[derive(Component, Default)]
#[shaku(interface = CacheStore)]
pub struct InMemoryCacheStore {
    #[shaku(default)]
    entries: CacheEntries,
}

fn wrong_type(key: &str, found: &MemoryValue) -> ClinicaError {
    ClinicaError::corrupt_entry(
        key,
        format!(
            "WRONGTYPE Operation against a key holding the wrong kind of value ({})",
            found.type_name()
        ),
    )
}

/// Matches a Redis-style glob supporting `*` and `?`.
fn glob_matches(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();
    let (mut p, mut k) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while k < key.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == key[k]) {
            p += 1;
            k += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, k));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            k = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

/// Resolves Redis LRANGE bounds against a list length.
fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    let len = isize::try_from(len).ok()?;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return None;
    }
    Some((usize::try_from(start).ok()?, usize::try_from(stop).ok()?))
}

impl InMemoryCacheStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().values().filter(|e| e.is_live(now)).count()
    }

    /// Returns true if no live keys are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the key is present and unexpired.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries.read().get(key).is_some_and(|e| e.is_live(now))
    }

    /// Remaining TTL of a key, if it has one.
    #[must_use]
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .filter(|e| e.is_live(now))
            .and_then(|e| e.expires_at)
            .map(|deadline| deadline - now)
    }

    /// Stores a raw value without going through the typed API.
    pub fn insert_raw(&self, key: &str, value: MemoryValue, ttl: Option<Duration>) {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .write()
            .insert(key.to_string(), MemoryEntry { value, expires_at });
    }

    fn live_value(&self, key: &str) -> Option<MemoryValue> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> ClinicaResult<Option<String>> {
        match self.live_value(key) {
            Some(MemoryValue::Str(value)) => {
                debug!("Cache hit for key '{}'", key);
                Ok(Some(value))
            }
            Some(other) => Err(wrong_type(key, &other)),
            None => {
                debug!("Cache miss for key '{}'", key);
                Ok(None)
            }
        }
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> ClinicaResult<()> {
        self.insert_raw(key, MemoryValue::Str(value.to_string()), Some(ttl));
        debug!("Cached key '{}' with TTL {}s", key, ttl.as_secs());
        Ok(())
    }

    async fn delete(&self, key: &str) -> ClinicaResult<bool> {
        let now = Instant::now();
        let removed = self.entries.write().remove(key);
        Ok(removed.is_some_and(|e| e.is_live(now)))
    }

    async fn delete_pattern(&self, pattern: &str) -> ClinicaResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        let mut deleted = 0u64;
        entries.retain(|key, entry| {
            let matched = glob_matches(pattern, key);
            if matched && entry.is_live(now) {
                deleted += 1;
            }
            !matched
        });
        debug!(
            "Deleted {} keys matching pattern '{}' ({} scanned)",
            deleted, pattern, before
        );
        Ok(deleted)
    }

    async fn hash_get(&self, key: &str) -> ClinicaResult<HashMap<String, String>> {
        match self.live_value(key) {
            Some(MemoryValue::Hash(fields)) => Ok(fields),
            Some(other) => Err(wrong_type(key, &other)),
            None => Ok(HashMap::new()),
        }
    }

    async fn hash_set(&self, key: &str, fields: &[(String, String)], ttl: Duration) -> ClinicaResult<()> {
        let fields = fields.iter().cloned().collect();
        self.insert_raw(key, MemoryValue::Hash(fields), Some(ttl));
        Ok(())
    }

    async fn list_push(&self, key: &str, value: &str) -> ClinicaResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| !e.is_live(now)) {
            entries.remove(key);
        }
        let entry = entries.entry(key.to_string()).or_insert_with(|| MemoryEntry {
            value: MemoryValue::List(VecDeque::new()),
            expires_at: None,
        });
        match &mut entry.value {
            MemoryValue::List(list) => {
                list.push_back(value.to_string());
                Ok(list.len() as u64)
            }
            other => Err(wrong_type(key, other)),
        }
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> ClinicaResult<Vec<String>> {
        match self.live_value(key) {
            Some(MemoryValue::List(list)) => Ok(resolve_range(list.len(), start, stop)
                .map(|(from, to)| list.range(from..=to).cloned().collect())
                .unwrap_or_default()),
            Some(other) => Err(wrong_type(key, &other)),
            None => Ok(Vec::new()),
        }
    }

    async fn ping(&self) -> ClinicaResult<()> {
        Ok(())
    }
}
