/// Microseconds since a fixed epoch.
///
/// [`SystemClock`](crate::SystemClock) uses the Unix epoch; any other epoch
/// works as long as every timestamp handed to one limiter comes from the same
/// clock. Equal timestamps for one identifier are legal and count separately.
pub type Timestamp = i64;

/// Validated, microsecond-resolved configuration shared by every backend.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WindowConfig {
    pub interval: i64,
    pub max_in_interval: u64,
    pub min_difference: Option<i64>,
}

/// Outcome of a single [`check`](crate::RateLimiter::check).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The request is admitted.
    Allowed {
        /// Requests still permitted in the current window after this one.
        remaining: u64,
    },
    /// The request is denied. The attempt was still recorded and occupies the
    /// window until it ages out.
    Rejected {
        /// Recommended delay before retrying, in whole milliseconds (floored).
        ///
        /// Best-effort hint: it can be zero or negative when the window is
        /// saturated but the most recent spacing already satisfies
        /// `min_difference`; treat anything non-positive as "retry whenever".
        retry_after_ms: i64,
    },
}
