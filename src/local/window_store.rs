use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::AbortHandle;

use crate::{Timestamp, WindowStore, WindrowError};

#[derive(Default)]
struct WindowRecord {
    timestamps: Vec<Timestamp>,
    generation: u64,
    reaper: Option<AbortHandle>,
}

/// In-process [`WindowStore`] backed by a [`DashMap`].
///
/// Each identifier maps to its ordered timestamp sequence. An
/// `evict_and_record` call runs entirely inside the identifier's map entry
/// lock, so concurrent checks for one identifier are serialized while checks
/// for different identifiers proceed in parallel.
///
/// # Idle cleanup
///
/// Every update (re)schedules a reaper task that deletes the identifier's
/// record after one full `interval` without activity, cancelling the
/// previously scheduled task. A reaper that fires anyway only removes the
/// record if no update happened since it was scheduled (generation check),
/// so it can never delete freshly recorded data. Reapers hold only a weak
/// handle to the record map; one that outlives its store exits without
/// touching anything, and dropping the store frees the map immediately.
///
/// Scheduling the reaper requires an ambient Tokio runtime; call the store
/// (or the limiter built on it) from within one.
pub struct LocalWindowStore {
    records: Arc<DashMap<String, WindowRecord>>,
}

impl LocalWindowStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
        }
    } // end constructor

    pub(crate) fn record_count(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn records_strong_count(&self) -> usize {
        Arc::strong_count(&self.records)
    }

    fn schedule_reaper(&self, identifier: String, generation: u64, interval: i64) -> AbortHandle {
        let records = Arc::downgrade(&self.records);

        let task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_micros(interval as u64)).await;

            // The store may be gone by the time the timer fires.
            let Some(records) = records.upgrade() else {
                return;
            };

            let removed =
                records.remove_if(&identifier, |_, record| record.generation == generation);

            if removed.is_some() {
                tracing::debug!(identifier = %identifier, "reaped idle window record");
            }
        });

        task.abort_handle()
    } // end method schedule_reaper
}

impl Default for LocalWindowStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WindowStore for LocalWindowStore {
    async fn evict_and_record(
        &self,
        identifier: &str,
        now: Timestamp,
        interval: i64,
    ) -> Result<Vec<Timestamp>, WindrowError> {
        let mut record = self.records.entry(identifier.to_string()).or_default();

        let clear_before = now - interval;
        record.timestamps.retain(|&timestamp| timestamp > clear_before);
        record.timestamps.push(now);
        record.generation += 1;

        if let Some(reaper) = record.reaper.take() {
            reaper.abort();
        }

        record.reaper =
            Some(self.schedule_reaper(identifier.to_string(), record.generation, interval));

        Ok(record.timestamps.clone())
    } // end method evict_and_record
}
