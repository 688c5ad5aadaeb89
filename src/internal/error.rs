/// Errors produced while parsing or rendering Discord timestamps.
#[derive(Debug, thiserror::Error)]
pub enum TimestampError {
    /// Style code is not one of `t T d D f F R`
    #[error("unknown timestamp style: {0:?}")]
    InvalidStyle(String),

    /// Seconds value cannot be represented as a calendar instant
    #[error("timestamp out of range: {seconds}")]
    OutOfRange {
        /// The rejected unix seconds
        seconds: i64,
        #[source]
        source: jiff::Error,
    },

    /// Time zone name could not be resolved
    #[error("unknown time zone {name:?}")]
    InvalidTimeZone {
        /// The IANA name that failed to resolve
        name: String,
        #[source]
        source: jiff::Error,
    },

    /// Unit table violates its ordering or proportion rules
    #[error("invalid unit table: {0}")]
    InvalidUnitTable(String),
}

/// Result type for timestamp operations.
pub type TimestampResult<T> = Result<T, TimestampError>;
