/// Error type for this crate.
#[derive(Debug, thiserror::Error)]
pub enum WindrowError {
    /// Configuration rejected at construction; the limiter is never built.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Redis error, including a failed sub-operation of the atomic
    /// evict-and-record batch (the first reported error wins).
    #[cfg(feature = "redis")]
    #[cfg_attr(docsrs, doc(cfg(feature = "redis")))]
    #[error("redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    /// Window store failure outside the Redis client, e.g. from a custom
    /// [`WindowStore`](crate::WindowStore) implementation.
    #[error("window store error: {0}")]
    StoreError(String),
}
