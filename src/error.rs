//! Error types for the analog-ensemble crate.
use thiserror::Error;

/// Error type for the crate.
#[derive(Clone, PartialEq, Debug, Error)]
pub enum AnEnError {
    /// An archive's array extents disagree with the collections that define its axes, or two
    /// archives that must line up do not.
    #[error("Dimension mismatch for {what}: expected {expected}, found {found}.")]
    DimensionMismatch {
        /// Which axis or archive failed the check.
        what: &'static str,
        /// The extent required by the collection or the other archive.
        expected: usize,
        /// The extent actually present.
        found: usize,
    },
    /// Bad configuration value or bad function argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Index access outside of the array extents.
    #[error("Index {index:?} is out of range for extents {extents:?}.")]
    OutOfRange {
        /// The offending index.
        index: [usize; 4],
        /// The extents of the array.
        extents: [usize; 4],
    },
    /// A test case had fewer admissible candidates than requested ensemble members.
    #[error(
        "Only {found} of {required} analogs found for station {station}, test time {time}, \
         lead time {flt}."
    )]
    InsufficientCandidates {
        /// Test station index.
        station: usize,
        /// Test time index (position in the list of test times).
        time: usize,
        /// Lead time index.
        flt: usize,
        /// Number of admissible candidates.
        found: usize,
        /// Requested ensemble size.
        required: usize,
    },
    /// A standard deviation could not be computed and no fallback was configured.
    #[error(
        "Standard deviation undefined for parameter {parameter}, station {station}, \
         lead time {flt} and no fallback configured."
    )]
    UndefinedStatistic {
        /// Parameter index.
        parameter: usize,
        /// Station index.
        station: usize,
        /// Lead time index.
        flt: usize,
    },
    /// An identity lookup (parameter name, station name, time stamp) found nothing.
    #[error("Not registered: {0}")]
    NotRegistered(String),
    /// A collection rejected an entry whose identity is already present.
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),
}

/// Shorthand for results.
pub type Result<T> = ::std::result::Result<T, AnEnError>;

impl AnEnError {
    /// Validation class errors are programmer or configuration errors detected on entry.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AnEnError::DimensionMismatch { .. } | AnEnError::InvalidArgument(_)
        )
    }

    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        AnEnError::InvalidArgument(msg.into())
    }
}
