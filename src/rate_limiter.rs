//! Top-level entrypoint that binds a clock source and a window store to one
//! set of limits, behind the single per-identifier check operation.

use std::{sync::Arc, time::Duration};

use crate::{
    Clock, LocalWindowStore, RateLimitDecision, SystemClock, WindowStore, WindrowError,
    common::WindowConfig, decision::decide,
};

#[cfg(feature = "redis")]
use crate::{RedisRateLimiterOptions, RedisWindowStore};

/// Limits shared by every backend.
///
/// Validated once at limiter construction; a limiter with invalid limits is
/// never produced.
#[derive(Clone, Copy, Debug)]
pub struct RateLimiterOptions {
    /// Sliding window length. Must be positive and representable in i64
    /// microseconds.
    pub interval: Duration,

    /// Requests admitted per identifier per window. Must be positive. The
    /// next check inside a full window is rejected.
    pub max_in_interval: u64,

    /// Minimum spacing between consecutive requests for one identifier,
    /// enforced independently of the count-based limit. Zero behaves as
    /// unset.
    pub min_difference: Option<Duration>,
}

impl RateLimiterOptions {
    pub(crate) fn resolve(&self) -> Result<WindowConfig, WindrowError> {
        let interval = micros_i64(self.interval, "interval")?;

        if interval == 0 {
            return Err(WindrowError::InvalidConfiguration(
                "interval must be greater than 0".to_string(),
            ));
        }

        if self.max_in_interval == 0 {
            return Err(WindrowError::InvalidConfiguration(
                "max_in_interval must be greater than 0".to_string(),
            ));
        }

        let min_difference = match self.min_difference {
            None => None,
            Some(duration) => {
                let micros = micros_i64(duration, "min_difference")?;
                (micros > 0).then_some(micros)
            }
        };

        Ok(WindowConfig {
            interval,
            max_in_interval: self.max_in_interval,
            min_difference,
        })
    } // end method resolve
}

fn micros_i64(duration: Duration, option: &str) -> Result<i64, WindrowError> {
    i64::try_from(duration.as_micros()).map_err(|_| {
        WindrowError::InvalidConfiguration(format!("{option} does not fit in i64 microseconds"))
    })
}

/// Sliding-window rate limiter over a pluggable [`WindowStore`].
///
/// Construct it with [`local`](RateLimiter::local) for in-process limits,
/// [`redis`](RateLimiter::redis) for limits shared across processes (crate
/// feature `redis`), or [`with_store`](RateLimiter::with_store) for a custom
/// backend. Both shipped backends run the same algorithm; only where the
/// window lives differs.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
///
/// use windrow::{RateLimitDecision, RateLimiter, RateLimiterOptions};
///
/// # async fn demo() -> Result<(), windrow::WindrowError> {
/// let limiter = RateLimiter::local(RateLimiterOptions {
///     interval: Duration::from_secs(1),
///     max_in_interval: 10,
///     min_difference: None,
/// })?;
///
/// match limiter.check("user_123").await? {
///     RateLimitDecision::Allowed { remaining } => {
///         // proceed; `remaining` more requests fit in this window
///     }
///     RateLimitDecision::Rejected { retry_after_ms } => {
///         // back off for `retry_after_ms` milliseconds
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct RateLimiter<S> {
    store: S,
    clock: Arc<dyn Clock>,
    config: WindowConfig,
}

impl RateLimiter<LocalWindowStore> {
    /// Build a limiter over in-process state.
    ///
    /// State is scoped to this limiter instance; see
    /// [`LocalWindowStore`] for concurrency and cleanup behavior.
    pub fn local(options: RateLimiterOptions) -> Result<Self, WindrowError> {
        Self::with_store(LocalWindowStore::new(), options)
    }
}

#[cfg(feature = "redis")]
impl RateLimiter<RedisWindowStore> {
    /// Build a limiter over shared Redis state.
    ///
    /// Every process that constructs a limiter with the same connection
    /// target, namespace, and limits participates in one shared limit.
    #[cfg_attr(docsrs, doc(cfg(feature = "redis")))]
    pub fn redis(options: RedisRateLimiterOptions) -> Result<Self, WindrowError> {
        let RedisRateLimiterOptions {
            connection_manager,
            namespace,
            interval,
            max_in_interval,
            min_difference,
        } = options;

        Self::with_store(
            RedisWindowStore::new(connection_manager, namespace),
            RateLimiterOptions {
                interval,
                max_in_interval,
                min_difference,
            },
        )
    }
}

impl<S: WindowStore> RateLimiter<S> {
    /// Build a limiter over a custom store, timed by [`SystemClock`].
    pub fn with_store(store: S, options: RateLimiterOptions) -> Result<Self, WindrowError> {
        Self::with_store_and_clock(store, Arc::new(SystemClock), options)
    }

    /// Build a limiter over a custom store and clock.
    ///
    /// The clock seam exists for deterministic tests; see
    /// [`ManualClock`](crate::ManualClock).
    pub fn with_store_and_clock(
        store: S,
        clock: Arc<dyn Clock>,
        options: RateLimiterOptions,
    ) -> Result<Self, WindrowError> {
        Ok(Self {
            store,
            clock,
            config: options.resolve()?,
        })
    } // end constructor

    /// Decide whether a request for `identifier` is admitted right now.
    ///
    /// Records the attempt's timestamp, evicts entries older than one
    /// interval, and evaluates the limits against what survives, all in one
    /// atomic step per identifier.
    ///
    /// # Semantics
    ///
    /// - The attempt is recorded whether or not it is admitted; rejected
    ///   callers that immediately retry keep their own window occupied.
    /// - [`Allowed`](RateLimitDecision::Allowed) carries the quota left in
    ///   the current window after this request.
    /// - [`Rejected`](RateLimitDecision::Rejected) carries a best-effort
    ///   retry delay in whole milliseconds.
    /// - The empty string is a valid identifier; all callers passing `""`
    ///   share one window.
    ///
    /// # Errors
    ///
    /// Any store failure is returned as-is and no decision is produced; a
    /// partially-applied store batch never turns into an allow or a deny.
    pub async fn check(&self, identifier: &str) -> Result<RateLimitDecision, WindrowError> {
        let now = self.clock.now();

        let timestamps = self
            .store
            .evict_and_record(identifier, now, self.config.interval)
            .await?;

        Ok(decide(now, &timestamps, &self.config))
    } // end method check
}
