use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::notification::NotificationId;

pub const DEFAULT_CAPACITY: usize = 256;

/// How to send a quick reply to one notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyAction {
    pub package_name: String,
    /// Key of the action that receives the reply text.
    pub target: String,
    pub label: String,
    pub input_hint: Option<String>,
}

#[derive(Debug)]
struct CachedAction {
    action: ReplyAction,
    seq: u64,
    inserted_at: Instant,
}

/// Notification id to reply action map shared by the normalizer and
/// whatever sends replies.
///
/// The cache holds at most `capacity` entries; inserting a new id into a
/// full cache evicts the oldest insert. With a `ttl` set, entries older than
/// the ttl read as missing.
#[derive(Debug)]
pub struct ReplyActionCache {
    entries: DashMap<NotificationId, CachedAction>,
    next_seq: AtomicU64,
    capacity: usize,
    ttl: Option<Duration>,
}
impl Default for ReplyActionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, None)
    }
}
impl ReplyActionCache {
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self {
            entries: DashMap::new(),
            next_seq: AtomicU64::new(0),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn put(&self, id: NotificationId, action: ReplyAction) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let previous = self.entries.insert(
            id,
            CachedAction {
                action,
                seq,
                inserted_at: Instant::now(),
            },
        );
        if previous.is_none() {
            self.evict_overflow();
        }
    }

    pub fn get(&self, id: NotificationId) -> Option<ReplyAction> {
        let expired = {
            let entry = self.entries.get(&id)?;
            if !self.is_expired(&entry) {
                return Some(entry.action.clone());
            }
            entry.seq
        };
        // Only drop the entry we looked at, a concurrent put may have replaced it
        self.entries.remove_if(&id, |_, cached| cached.seq == expired);
        None
    }

    pub fn remove(&self, id: NotificationId) -> Option<ReplyAction> {
        self.entries.remove(&id).map(|(_, cached)| cached.action)
    }

    pub fn contains(&self, id: NotificationId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every expired entry, returning how many went.
    pub fn purge_expired(&self) -> usize {
        if self.ttl.is_none() {
            return 0;
        }
        let before = self.entries.len();
        self.entries.retain(|_, cached| !self.is_expired(cached));
        before.saturating_sub(self.entries.len())
    }

    fn is_expired(&self, cached: &CachedAction) -> bool {
        self.ttl
            .is_some_and(|ttl| cached.inserted_at.elapsed() >= ttl)
    }

    fn evict_overflow(&self) {
        while self.entries.len() > self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.seq)
                .map(|entry| (*entry.key(), entry.seq));
            let Some((id, seq)) = oldest else {
                break;
            };
            if self
                .entries
                .remove_if(&id, |_, cached| cached.seq == seq)
                .is_some()
            {
                debug!(id, "reply cache full, evicted oldest action");
            }
        }
    }
}
