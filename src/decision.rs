use crate::common::{RateLimitDecision, Timestamp, WindowConfig};

/// Turn the surviving timestamps for one identifier into a decision.
///
/// `timestamps` is candidate-inclusive: the just-recorded `now` is its last
/// element. The math is positional (the oldest survivor is the first
/// element, the previous request the second to last), so the outcome tracks
/// the recorded order even if the clock misbehaves.
pub(crate) fn decide(
    now: Timestamp,
    timestamps: &[Timestamp],
    config: &WindowConfig,
) -> RateLimitDecision {
    let count = timestamps.len() as u64;
    let too_many = count > config.max_in_interval;

    // Spacing between this request and the one before it; with fewer than
    // two entries there is no previous request to compare against.
    let gap = (timestamps.len() >= 2).then(|| now - timestamps[timestamps.len() - 2]);

    let too_close = match (config.min_difference, gap) {
        (Some(min_difference), Some(gap)) => gap < min_difference,
        _ => false,
    };

    if !too_many && !too_close {
        return RateLimitDecision::Allowed {
            remaining: config.max_in_interval - count,
        };
    }

    let Some(&oldest) = timestamps.first() else {
        unreachable!("decide: denial requires at least one surviving timestamp");
    };

    let window_wait = oldest - now + config.interval;

    let wait_micros = match (config.min_difference, gap) {
        (Some(min_difference), Some(gap)) => window_wait.min(min_difference - gap),
        _ => window_wait,
    };

    RateLimitDecision::Rejected {
        retry_after_ms: wait_micros.div_euclid(1000),
    }
} // end fn decide
