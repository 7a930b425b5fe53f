use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

/// Keyed mutual exclusion for (subject_id, work_date). Two recomputes of the
/// same day must not interleave their upsert / ledger-replace steps;
/// different subjects or dates run in parallel.
pub struct DayLocks {
    inner: Mutex<HashMap<(u64, NaiveDate), Arc<tokio::sync::Mutex<()>>>>,
}

impl DayLocks {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the lock for one subject-day, dropping map entries nobody
    /// else holds so the map stays bounded by in-flight work.
    pub fn for_day(&self, subject_id: u64, work_date: NaiveDate) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap();
        map.retain(|_, lock| Arc::strong_count(lock) > 1);
        map.entry((subject_id, work_date))
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_day_shares_a_lock() {
        let locks = DayLocks::new();
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        let first = locks.for_day(1, date);
        let guard = first.lock().await;

        let second = locks.for_day(1, date);
        assert!(second.try_lock().is_err());

        drop(guard);
        assert!(second.try_lock().is_ok());
    }

    #[tokio::test]
    async fn different_days_are_independent() {
        let locks = DayLocks::new();
        let monday = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();

        let _held = locks.for_day(1, monday).lock_owned().await;
        assert!(locks.for_day(1, tuesday).try_lock().is_ok());
        assert!(locks.for_day(2, monday).try_lock().is_ok());
    }
}
