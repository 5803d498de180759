//! Crate-wide error type.
//!
//! Configuration problems are fatal and reported before any search runs. Exhausting the
//! validity retries while building or perturbing a shape is recoverable: the caller may
//! simply draw a fresh random shape. Degenerate color fits never surface as errors.

/// Failure modes of the optimizer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// Invalid or zero thresholds and counts, unknown shape codes, malformed colors.
  #[error("configuration error: {0}")]
  Configuration(String),

  /// No valid geometry was found within the retry bound.
  #[error("no valid {kind} found after {attempts} attempts")]
  ValiditySearchExhausted {
    kind: &'static str,
    attempts: usize
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Early return with [`Error::Configuration`], formatted like `format!`.
macro_rules! config_bail {
  ($($arg: tt)*) => {
    return Err($crate::error::Error::Configuration(format!($($arg)*)))
  };
}
pub(crate) use config_bail;
