//! A value with a freshness window.
//!
//! Nothing expires on its own: callers check with
//! [`TtlCache::invalidate_if_expired`] before reading, and refill the cache
//! when [`TtlCache::get`] comes back empty.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct TtlCache<T> {
    ttl: Duration,
    entry: Option<(T, DateTime<Utc>)>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache { ttl, entry: None }
    }

    /// The cached value and when it was stored.
    pub fn get(&self) -> Option<(&T, DateTime<Utc>)> {
        self.entry.as_ref().map(|(value, as_of)| (value, *as_of))
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.entry.as_mut().map(|(value, _)| value)
    }

    pub fn set(&mut self, value: T) {
        self.set_at(value, Utc::now());
    }

    pub fn set_at(&mut self, value: T, as_of: DateTime<Utc>) {
        self.entry = Some((value, as_of));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Drop the value if it is older than the freshness window.
    /// Returns whether it was dropped.
    pub fn invalidate_if_expired(&mut self) -> bool {
        self.invalidate_if_expired_at(Utc::now())
    }

    pub fn invalidate_if_expired_at(&mut self, now: DateTime<Utc>) -> bool {
        let expired = matches!(&self.entry, Some((_, as_of)) if now - *as_of > self.ttl);
        if expired {
            self.entry = None;
        }
        expired
    }
}

impl<T> TtlCache<Vec<T>> {
    /// Add an item to a cached list without touching its age.
    /// Does nothing when the cache is empty.
    pub fn push(&mut self, item: T) {
        if let Some(items) = self.get_mut() {
            items.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 12, minute, 0).unwrap()
    }

    #[test]
    fn test_get_returns_value_and_age() {
        let mut cache = TtlCache::new(Duration::minutes(10));
        assert!(cache.get().is_none());

        cache.set_at(vec![1], at(0));
        assert_eq!(cache.get(), Some((&vec![1], at(0))));
    }

    #[test]
    fn test_invalidate_if_expired() {
        let mut cache = TtlCache::new(Duration::minutes(10));
        cache.set_at("fresh", at(0));

        assert!(!cache.invalidate_if_expired_at(at(10)));
        assert!(cache.get().is_some());

        assert!(cache.invalidate_if_expired_at(at(11)));
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_push_keeps_age() {
        let mut cache = TtlCache::new(Duration::minutes(10));
        cache.push(1);
        assert!(cache.get().is_none());

        cache.set_at(vec![1], at(0));
        cache.push(2);
        assert_eq!(cache.get(), Some((&vec![1, 2], at(0))));
    }
}
