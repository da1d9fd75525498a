//! Conversion of caller-supplied indices into the engine's index domain.

use crate::calculator::FibError;

/// Convert a signed index into a `u64` index.
///
/// Negative values, and values beyond `u64::MAX`, fail with
/// `FibError::InvalidIndex`. The configured maximum is checked later by the
/// calculator.
///
/// # Example
/// ```
/// use fibmemo_core::index::checked_index;
/// use fibmemo_core::FibError;
///
/// assert_eq!(checked_index(42), Ok(42));
/// assert_eq!(checked_index(-1), Err(FibError::InvalidIndex(-1)));
/// ```
pub fn checked_index(raw: i128) -> Result<u64, FibError> {
    u64::try_from(raw).map_err(|_| FibError::InvalidIndex(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_non_negative() {
        assert_eq!(checked_index(0), Ok(0));
        assert_eq!(checked_index(i128::from(u64::MAX)), Ok(u64::MAX));
    }

    #[test]
    fn rejects_negative() {
        assert_eq!(checked_index(-5), Err(FibError::InvalidIndex(-5)));
    }

    #[test]
    fn rejects_beyond_u64() {
        let raw = i128::from(u64::MAX) + 1;
        assert_eq!(checked_index(raw), Err(FibError::InvalidIndex(raw)));
    }
}
