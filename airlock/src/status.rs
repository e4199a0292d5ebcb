//! Process exit statuses.
//!
//! Each terminal outcome of an invocation maps to a distinct exit code so
//! that CI jobs can branch on the result without parsing output.

use crate::error::{AirlockError, ErrorCategory};

/// Terminal outcome of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Admitted, and uploaded unless the run was a dry run.
    Success,
    /// Rejected by a validation stage.
    Rejected,
    /// Bad arguments or unusable settings. Clap also exits with this code
    /// on usage errors.
    InvalidInvocation,
    /// Admitted, but the upload failed.
    TransferFailed,
}

impl ExitStatus {
    /// Return the numeric exit code.
    ///
    /// # Examples
    ///
    /// ```
    /// use model_airlock::status::ExitStatus;
    ///
    /// assert_eq!(ExitStatus::Success.code(), 0);
    /// assert_eq!(ExitStatus::TransferFailed.code(), 3);
    /// ```
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Rejected => 1,
            Self::InvalidInvocation => 2,
            Self::TransferFailed => 3,
        }
    }

    /// Classify an error by the outcome it represents.
    #[must_use]
    pub fn for_error(err: &AirlockError) -> Self {
        match err.category() {
            ErrorCategory::Transfer => Self::TransferFailed,
            ErrorCategory::Configuration => Self::InvalidInvocation,
            ErrorCategory::Io
            | ErrorCategory::Schema
            | ErrorCategory::Logic
            | ErrorCategory::Format
            | ErrorCategory::UnsupportedFormat => Self::Rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsError;
    use crate::transfer::TransferError;
    use camino::Utf8PathBuf;
    use rstest::rstest;

    #[rstest]
    #[case::not_found(
        AirlockError::ArtifactNotFound { path: Utf8PathBuf::from("m.pt") },
        ExitStatus::Rejected
    )]
    #[case::unsupported(
        AirlockError::UnsupportedFormat { extension: ".h5".to_owned() },
        ExitStatus::Rejected
    )]
    #[case::transfer(
        AirlockError::Transfer(TransferError::Rejected { url: "u".to_owned(), status: 500 }),
        ExitStatus::TransferFailed
    )]
    #[case::settings(
        AirlockError::Settings(SettingsError::Invalid {
            field: "max_tensor_volume",
            reason: "must be greater than zero".to_owned(),
        }),
        ExitStatus::InvalidInvocation
    )]
    fn errors_map_to_outcomes(#[case] err: AirlockError, #[case] expected: ExitStatus) {
        assert_eq!(ExitStatus::for_error(&err), expected);
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [
            ExitStatus::Success,
            ExitStatus::Rejected,
            ExitStatus::InvalidInvocation,
            ExitStatus::TransferFailed,
        ]
        .map(ExitStatus::code);
        assert_eq!(codes, [0, 1, 2, 3]);
    }
}
