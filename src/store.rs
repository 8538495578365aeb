use async_trait::async_trait;

use crate::{Timestamp, WindrowError};

/// Per-identifier timestamp storage behind [`RateLimiter`](crate::RateLimiter).
///
/// One contract, two shipped implementations:
/// [`LocalWindowStore`](crate::LocalWindowStore) for in-process state, and the
/// Redis-backed store (behind the `redis` feature) for state shared across
/// processes. Implement this trait to back the limiter with anything else.
#[async_trait]
pub trait WindowStore: Send + Sync {
    /// Atomically evict expired entries for `identifier`, record `now`, and
    /// return the surviving timestamps.
    ///
    /// `interval` is the window length in microseconds. Entries at or below
    /// `now - interval` are evicted; the returned sequence includes the
    /// just-recorded `now` as its last element. The whole step must be atomic
    /// per identifier: no concurrent caller may observe the window between
    /// the eviction and the insert, and a reported error must mean nothing
    /// usable was read (the caller never turns a partial batch into a
    /// decision).
    async fn evict_and_record(
        &self,
        identifier: &str,
        now: Timestamp,
        interval: i64,
    ) -> Result<Vec<Timestamp>, WindrowError>;
}
