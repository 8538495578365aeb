//! In-process window store.
//!
//! Keeps every identifier's window in the current process using a
//! [`DashMap`](dashmap::DashMap), so checks are memory-speed and need no
//! external services. State is process-scoped: two processes with local
//! stores enforce two independent limits.
//!
//! # When to use
//!
//! - Single-process services, CLIs, and tests.
//! - Hot paths where a Redis round-trip per check is too expensive and a
//!   per-process limit is acceptable.
//!
//! Reach for the Redis store (crate feature `redis`) when several processes
//! must share one limit.
//!
//! # Resource bounding
//!
//! Identifiers that go quiet are removed by a per-identifier reaper task
//! after one full window of inactivity, so the map does not grow without
//! bound under churning identifiers. Eviction correctness never depends on
//! the reaper; every check re-filters the window it reads.

mod window_store;
pub use window_store::*;
