//! Error handling and exit codes.

use fibmemo_core::calculator::FibError;
use fibmemo_core::constants::exit_codes;

/// Exit code for a calculation error.
pub fn handle_error(err: &FibError) -> i32 {
    match err {
        FibError::InvalidIndex(_)
        | FibError::TooLarge { .. }
        | FibError::InvalidConfiguration(_) => exit_codes::ERROR_CONFIG,
        FibError::Timeout(_) => exit_codes::ERROR_TIMEOUT,
        FibError::Cancelled => exit_codes::ERROR_CANCELED,
        FibError::Mismatch { .. } => exit_codes::ERROR_MISMATCH,
        FibError::Calculation(_) => exit_codes::ERROR_GENERIC,
    }
}

/// Exit code for any application error, looking through `anyhow` context.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<FibError>())
        .map_or(exit_codes::ERROR_GENERIC, handle_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use anyhow::Context;

    #[test]
    fn error_codes() {
        assert_eq!(handle_error(&FibError::Cancelled), 130);
        assert_eq!(handle_error(&FibError::Timeout(Duration::from_secs(1))), 2);
        assert_eq!(handle_error(&FibError::Mismatch { n: 5 }), 3);
        assert_eq!(handle_error(&FibError::InvalidConfiguration("bad".into())), 4);
        assert_eq!(handle_error(&FibError::TooLarge { n: 2, max: 1 }), 4);
        assert_eq!(handle_error(&FibError::InvalidIndex(-1)), 4);
        assert_eq!(handle_error(&FibError::Calculation("x".into())), 1);
    }

    #[test]
    fn exit_code_sees_through_context() {
        let err: anyhow::Error = Err::<(), _>(FibError::Timeout(Duration::ZERO))
            .context("summing range")
            .unwrap_err();
        assert_eq!(exit_code(&err), exit_codes::ERROR_TIMEOUT);

        let io = anyhow::Error::new(std::io::Error::other("disk full"));
        assert_eq!(exit_code(&io), exit_codes::ERROR_GENERIC);
    }
}
