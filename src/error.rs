use thiserror::Error;

/// Error returned when a [`HashMapConfig`](crate::HashMapConfig) cannot be used.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// The initial capacity was zero; at least one bucket is required.
    #[error("initial capacity must be at least 1")]
    ZeroCapacity,

    /// The load factor was not a finite, positive number.
    #[error("load factor must be finite and positive, got {0}")]
    InvalidLoadFactor(f32),
}
