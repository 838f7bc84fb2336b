use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Cache whose entries live for the remainder of a fixed-width time bucket.
///
/// The key space is the caller's (the on-demand path keys by letter filter);
/// a stored value is a hit only while `now` falls in the same bucket it was
/// inserted in. Two reads in the same ten-minute bucket reuse one probe run;
/// the first read of the next bucket triggers a fresh one.
#[derive(Debug, Clone)]
pub struct TimeBucketCache<V> {
    width: Duration,
    entries: HashMap<String, (u64, V)>,
}

impl<V: Clone> TimeBucketCache<V> {
    pub fn new(width: Duration) -> Self {
        Self {
            width,
            entries: HashMap::new(),
        }
    }

    fn bucket(&self, now: SystemTime) -> u64 {
        let secs = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        secs / self.width.as_secs().max(1)
    }

    /// Value stored under `key` in the current bucket, if any.
    pub fn get(&self, key: &str, now: SystemTime) -> Option<V> {
        let current = self.bucket(now);
        self.entries
            .get(key)
            .filter(|(bucket, _)| *bucket == current)
            .map(|(_, v)| v.clone())
    }

    /// Store `value` under `key` for the current bucket, evicting entries
    /// from other buckets so the map does not grow with dead generations.
    pub fn insert(&mut self, key: String, value: V, now: SystemTime) {
        let current = self.bucket(now);
        self.entries.retain(|_, (bucket, _)| *bucket == current);
        self.entries.insert(key, (current, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn hit_within_same_bucket() {
        let mut cache = TimeBucketCache::new(Duration::from_secs(600));
        cache.insert("a".into(), 1u32, at(1_000));
        assert_eq!(cache.get("a", at(1_199)), Some(1));
    }

    #[test]
    fn miss_after_bucket_rolls_over() {
        let mut cache = TimeBucketCache::new(Duration::from_secs(600));
        cache.insert("a".into(), 1u32, at(1_000));
        assert_eq!(cache.get("a", at(1_200)), None);
    }

    #[test]
    fn keys_are_independent() {
        let mut cache = TimeBucketCache::new(Duration::from_secs(600));
        cache.insert("a".into(), 1u32, at(1_000));
        assert_eq!(cache.get("b", at(1_000)), None);
        cache.insert("b".into(), 2u32, at(1_000));
        assert_eq!(cache.get("a", at(1_000)), Some(1));
        assert_eq!(cache.get("b", at(1_000)), Some(2));
    }

    #[test]
    fn stale_entries_are_evicted_on_insert() {
        let mut cache = TimeBucketCache::new(Duration::from_secs(600));
        cache.insert("a".into(), 1u32, at(1_000));
        cache.insert("b".into(), 2u32, at(2_000));
        assert_eq!(cache.entries.len(), 1);
        assert_eq!(cache.get("b", at(2_000)), Some(2));
    }
}
