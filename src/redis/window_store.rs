use std::{fmt, time::Duration};

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use crate::{Timestamp, WindowStore, WindrowError};

/// Configuration for [`RateLimiter::redis`](crate::RateLimiter::redis).
///
/// # Examples
///
/// ```ignore
/// use std::time::Duration;
/// use windrow::{RateLimiter, RedisRateLimiterOptions};
///
/// let client = redis::Client::open("redis://127.0.0.1:6379/")?;
/// let connection_manager = client.get_connection_manager().await?;
///
/// let limiter = RateLimiter::redis(RedisRateLimiterOptions {
///     connection_manager,
///     namespace: Some("api-quota:".to_string()),
///     interval: Duration::from_secs(60),
///     max_in_interval: 100,
///     min_difference: None,
/// })?;
/// ```
#[derive(Clone)]
pub struct RedisRateLimiterOptions {
    /// Established connection manager from the `redis` crate.
    ///
    /// `ConnectionManager` multiplexes and reconnects on its own; one manager
    /// can serve any number of limiters.
    pub connection_manager: ConnectionManager,

    /// Key prefix isolating this limiter's keys, prepended to every
    /// identifier with no separator. `None` generates a random
    /// `rate-limiter-…` prefix; set it explicitly whenever several processes
    /// must enforce one shared limit.
    pub namespace: Option<String>,

    /// Sliding window length. Must be positive and representable in i64
    /// microseconds.
    pub interval: Duration,

    /// Requests admitted per identifier per window. Must be positive.
    pub max_in_interval: u64,

    /// Minimum spacing between consecutive requests for one identifier.
    /// Zero behaves as unset.
    pub min_difference: Option<Duration>,
}

// ConnectionManager has no Debug impl; render the remaining fields and
// elide the connection.
impl fmt::Debug for RedisRateLimiterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisRateLimiterOptions")
            .field("namespace", &self.namespace)
            .field("interval", &self.interval)
            .field("max_in_interval", &self.max_in_interval)
            .field("min_difference", &self.min_difference)
            .finish_non_exhaustive()
    }
}

/// Redis-backed [`WindowStore`] sharing one limit across processes.
///
/// # Data model
///
/// One sorted set per identifier, keyed `namespace + identifier`, holding
/// each recorded request with score = member = its timestamp in
/// microseconds. Because score and member coincide, two checks for one
/// identifier in the same microsecond collapse into a single member; the
/// shared store undercounts exactly that case.
///
/// # Atomicity
///
/// Every check issues one `MULTI`/`EXEC` batch of four commands (evict by
/// score range, read back, insert the candidate, refresh the key TTL), so
/// concurrent checks from any number of processes serialize per key inside
/// Redis. If any command in the batch fails, the first error is returned and
/// no decision is derived from the partial result.
///
/// Keys expire after `ceil(interval)` seconds of inactivity, so abandoned
/// identifiers clean themselves up even if no client ever returns.
pub struct RedisWindowStore {
    connection_manager: ConnectionManager,
    namespace: String,
}

impl RedisWindowStore {
    /// Create a store over an established connection.
    ///
    /// See [`RedisRateLimiterOptions::namespace`] for the `namespace`
    /// semantics.
    pub fn new(connection_manager: ConnectionManager, namespace: Option<String>) -> Self {
        let namespace =
            namespace.unwrap_or_else(|| format!("rate-limiter-{:x}", rand::random::<u64>()));

        Self {
            connection_manager,
            namespace,
        }
    } // end constructor

    /// Key prefix in use, including a generated one.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn key_for(&self, identifier: &str) -> String {
        format!("{}{}", self.namespace, identifier)
    }

    /// Key TTL in whole seconds, rounded up so sub-second windows still get
    /// a TTL. Well-defined for every interval the validator accepts, up to
    /// `i64::MAX` microseconds.
    pub(crate) fn ttl_seconds(interval: i64) -> i64 {
        interval / 1_000_000 + i64::from(interval % 1_000_000 != 0)
    }
}

#[async_trait]
impl WindowStore for RedisWindowStore {
    async fn evict_and_record(
        &self,
        identifier: &str,
        now: Timestamp,
        interval: i64,
    ) -> Result<Vec<Timestamp>, WindrowError> {
        let key = self.key_for(identifier);
        let clear_before = now - interval;
        let ttl = Self::ttl_seconds(interval);

        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.cmd("ZREMRANGEBYSCORE").arg(&key).arg(0).arg(clear_before);
        pipe.cmd("ZRANGE").arg(&key).arg(0).arg(-1);
        pipe.cmd("ZADD").arg(&key).arg(now).arg(now);
        pipe.cmd("EXPIRE").arg(&key).arg(ttl);

        let mut connection_manager = self.connection_manager.clone();
        let (_removed, mut timestamps, _added, _expiry): (i64, Vec<Timestamp>, i64, i64) =
            pipe.query_async(&mut connection_manager).await?;

        // ZRANGE runs before ZADD inside the batch, so the read-back set
        // excludes the candidate; append it to keep the decision input
        // candidate-inclusive.
        timestamps.push(now);

        Ok(timestamps)
    } // end method evict_and_record
}
