// libs/appointment-cell/src/services/consistency.rs
//
// Serializes the read-verify-write of appointment creation per calendar day.
//

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

/// One async mutex per `(professional, date)`.
///
/// Writers to different days never contend. An entry is dropped once nobody
/// holds or waits on it.
#[derive(Default)]
pub struct SlotLocks {
    locks: Mutex<HashMap<(Uuid, NaiveDate), Arc<AsyncMutex<()>>>>,
}

impl SlotLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, professional_id: Uuid, date: NaiveDate) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // Handles are only cloned under this lock, so a count of one means idle.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry((professional_id, date)).or_default())
    }

    /// Waits for exclusive access to the professional's calendar on `date`.
    pub async fn acquire(&self, professional_id: Uuid, date: NaiveDate) -> OwnedMutexGuard<()> {
        let lock = self.lock_for(professional_id, date);
        let guard = lock.lock_owned().await;
        debug!("Acquired slot lock for professional {} on {}", professional_id, date);
        guard
    }

    pub fn tracked_days(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[tokio::test]
    async fn same_day_is_exclusive() {
        let locks = Arc::new(SlotLocks::new());
        let professional = Uuid::new_v4();

        let guard = locks.acquire(professional, day()).await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(professional, day()).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_days_do_not_contend() {
        let locks = SlotLocks::new();
        let professional = Uuid::new_v4();

        let _monday = locks.acquire(professional, day()).await;
        let tuesday = tokio::time::timeout(
            Duration::from_millis(100),
            locks.acquire(professional, day().succ_opt().unwrap()),
        )
        .await;

        assert!(tuesday.is_ok());
        assert_eq!(locks.tracked_days(), 2);
    }

    #[tokio::test]
    async fn released_days_are_forgotten() {
        let locks = SlotLocks::new();
        let professional = Uuid::new_v4();

        for offset in 0..5 {
            let day = day() + chrono::Days::new(offset);
            drop(locks.acquire(professional, day).await);
        }

        let _held = locks.acquire(professional, day()).await;
        assert_eq!(locks.tracked_days(), 1);
    }
}
