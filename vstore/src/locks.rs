//! Sharded per-key locks.
//!
//! Each key hashes to one of a fixed number of mutexes. Operations on one
//! key are always serialized; operations on keys in different shards run
//! in parallel. Waiting is bounded so a stuck holder fails callers instead
//! of hanging them.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

/// Guard for a key's shard. Released on drop.
pub type KeyGuard<'a> = MutexGuard<'a, ()>;

#[derive(Debug)]
pub struct KeyLocks {
    shards: Box<[Mutex<()>]>,
    timeout: Duration,
}

impl KeyLocks {
    /// `shards` is clamped to at least one.
    pub fn new(shards: usize, timeout: Duration) -> Self {
        let shards = (0..shards.max(1)).map(|_| Mutex::new(())).collect();
        Self { shards, timeout }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Shard index a key maps to. Stable for the life of the process.
    pub fn shard_of(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    /// Lock the shard for `key`, waiting at most the configured timeout.
    pub fn acquire(&self, key: &str) -> Option<KeyGuard<'_>> {
        self.shards[self.shard_of(key)].try_lock_for(self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_shard_count_clamped() {
        let locks = KeyLocks::new(0, Duration::from_millis(10));
        assert_eq!(locks.shard_count(), 1);
    }

    #[test]
    fn test_shard_of_is_stable_and_in_range() {
        let locks = KeyLocks::new(8, Duration::from_millis(10));
        for key in ["a", "b", "wifi.cfg", "net/dns.cfg"] {
            let shard = locks.shard_of(key);
            assert!(shard < 8);
            assert_eq!(shard, locks.shard_of(key));
        }
    }

    #[test]
    fn test_acquire_times_out_while_held() {
        let locks = KeyLocks::new(1, Duration::from_millis(20));
        let _held = locks.acquire("a").expect("first acquire");

        assert!(locks.acquire("a").is_none());
        // Single shard: every key shares the lock
        assert!(locks.acquire("b").is_none());
    }

    #[test]
    fn test_acquire_after_release() {
        let locks = KeyLocks::new(4, Duration::from_millis(20));
        {
            let _held = locks.acquire("a").expect("acquire");
        }
        assert!(locks.acquire("a").is_some());
    }

    #[test]
    fn test_unrelated_shard_not_blocked() {
        let locks = KeyLocks::new(64, Duration::from_millis(20));
        let a = "a";
        let other = (0..1000)
            .map(|i| format!("k{}", i))
            .find(|k| locks.shard_of(k) != locks.shard_of(a))
            .expect("some key lands in another shard");

        let _held = locks.acquire(a).expect("acquire a");
        assert!(locks.acquire(&other).is_some());
    }

    #[test]
    fn test_waiter_gets_lock_when_released() {
        let locks = Arc::new(KeyLocks::new(1, Duration::from_secs(5)));
        let guard = locks.acquire("a").expect("acquire");

        let waiter = {
            let locks = Arc::clone(&locks);
            thread::spawn(move || locks.acquire("a").is_some())
        };
        thread::sleep(Duration::from_millis(20));
        drop(guard);

        assert!(waiter.join().expect("join"));
    }
}
