use crate::path::VaultPath;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct Entry {
    expires: Instant,
    pending: u32,
}

/// Short-lived record of paths this process is about to touch.
///
/// Register before writing, consume when the store reports the change. Entries expire
/// after the TTL, so a write the store never reports stops suppressing after a while
/// instead of hiding a later user edit forever. Keys are case-insensitive.
#[derive(Debug)]
pub struct SelfEventTracker {
    ttl: Duration,
    entries: HashMap<String, Entry>,
}

impl SelfEventTracker {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn register(&mut self, path: &VaultPath) {
        self.register_at(path, Instant::now());
    }

    pub(crate) fn register_at(&mut self, path: &VaultPath, now: Instant) {
        let expires = now + self.ttl;
        let entry = self.entries.entry(path.key()).or_insert(Entry {
            expires,
            pending: 0,
        });
        if entry.expires <= now {
            entry.pending = 0;
        }
        entry.expires = expires;
        entry.pending += 1;
    }

    /// Checks for a live registration and uses it up. Returns true when the event at
    /// `path` was caused by this process.
    pub fn consume(&mut self, path: &VaultPath) -> bool {
        self.consume_at(path, Instant::now())
    }

    pub(crate) fn consume_at(&mut self, path: &VaultPath, now: Instant) -> bool {
        let key = path.key();
        let Some(entry) = self.entries.get_mut(&key) else {
            return false;
        };
        if entry.expires <= now {
            self.entries.remove(&key);
            return false;
        }
        entry.pending -= 1;
        if entry.pending == 0 {
            self.entries.remove(&key);
        }
        true
    }

    pub fn is_tracked(&self, path: &VaultPath) -> bool {
        self.entries
            .get(&path.key())
            .is_some_and(|e| e.expires > Instant::now())
    }

    /// Drops expired entries.
    pub fn prune(&mut self) {
        let now = Instant::now();
        self.entries.retain(|_, e| e.expires > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(raw: &str) -> VaultPath {
        VaultPath::parse(raw)
    }

    #[test]
    fn consume_is_check_and_remove() {
        let mut tracker = SelfEventTracker::new(Duration::from_secs(5));
        tracker.register(&p("Library/A/Note-A.md"));

        assert!(tracker.consume(&p("Library/A/Note-A.md")));
        assert!(!tracker.consume(&p("Library/A/Note-A.md")));
    }

    #[test]
    fn keys_ignore_case() {
        let mut tracker = SelfEventTracker::new(Duration::from_secs(5));
        tracker.register(&p("Library/A/Note-A.md"));
        assert!(tracker.consume(&p("library/a/note-a.md")));
    }

    #[test]
    fn expired_entries_are_absent() {
        let mut tracker = SelfEventTracker::new(Duration::from_millis(100));
        let start = Instant::now();
        tracker.register_at(&p("x"), start);

        assert!(!tracker.consume_at(&p("x"), start + Duration::from_millis(100)));
        assert!(tracker.is_empty());
    }

    #[test]
    fn repeated_registrations_cover_repeated_events() {
        let mut tracker = SelfEventTracker::new(Duration::from_secs(5));
        tracker.register(&p("x"));
        tracker.register(&p("x"));

        assert!(tracker.consume(&p("x")));
        assert!(tracker.consume(&p("x")));
        assert!(!tracker.consume(&p("x")));
    }

    #[test]
    fn unknown_paths_are_not_claimed() {
        let mut tracker = SelfEventTracker::new(Duration::from_secs(5));
        assert!(!tracker.consume(&p("nope")));
    }
}
