//! Process exit codes
//!
//! Scripts can tell apart usage mistakes, network trouble, rejected
//! credentials and missing resources without parsing stderr.

use ss_core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    UsageError = 2,
    NetworkError = 3,
    AuthError = 4,
    NotFound = 5,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Exit code for a failed run
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::Config(_) | Error::InvalidArgument(_) => ExitCode::UsageError,
            Error::Network(_) => ExitCode::NetworkError,
            Error::Auth(_) => ExitCode::AuthError,
            Error::BucketNotFound(_) | Error::NotFound(_) => ExitCode::NotFound,
            Error::Io(_) | Error::General(_) => ExitCode::GeneralError,
        }
    }
}
