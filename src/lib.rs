#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod rate_limiter;
pub use rate_limiter::*;

mod clock;
pub use clock::*;

mod store;
pub use store::*;

mod local;
pub use local::*;

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use redis::*;

mod common;
pub use common::{RateLimitDecision, Timestamp};

mod decision;

mod error;
pub use error::*;

#[cfg(test)]
mod tests;
