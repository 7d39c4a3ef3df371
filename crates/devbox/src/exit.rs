//! Process exit codes
//!
//! | code | meaning |
//! |------|---------|
//! | 0    | success |
//! | 1    | configuration, usage or command error |
//! | 2    | structured provider error |
//! | 3    | raw transport error (unrecognized error body, or no response) |
//! | 4    | response shape error |
//! | 5    | wait timeout |
//! | 130  | interrupted |

use devbox_lambda::{
    ApiError, CommonError, FailureKind, FilesystemError, FirewallError, InstanceError,
    LaunchError, WaitError,
};

pub const SUCCESS: u8 = 0;
pub const FAILURE: u8 = 1;
pub const STRUCTURED: u8 = 2;
pub const TRANSPORT: u8 = 3;
pub const RESPONSE_SHAPE: u8 = 4;
pub const WAIT_TIMEOUT: u8 = 5;
pub const INTERRUPTED: u8 = 130;

/// Category of the first API or wait failure in the error chain
pub fn failure_kind(err: &anyhow::Error) -> Option<FailureKind> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<WaitError>() {
            return Some(e.kind());
        }
        if let Some(e) = cause.downcast_ref::<ApiError<CommonError>>() {
            return Some(e.kind());
        }
        if let Some(e) = cause.downcast_ref::<ApiError<LaunchError>>() {
            return Some(e.kind());
        }
        if let Some(e) = cause.downcast_ref::<ApiError<InstanceError>>() {
            return Some(e.kind());
        }
        if let Some(e) = cause.downcast_ref::<ApiError<FilesystemError>>() {
            return Some(e.kind());
        }
        if let Some(e) = cause.downcast_ref::<ApiError<FirewallError>>() {
            return Some(e.kind());
        }
        None
    })
}

pub fn code_for(err: &anyhow::Error) -> u8 {
    match failure_kind(err) {
        Some(FailureKind::Structured) => STRUCTURED,
        Some(FailureKind::Transport) => TRANSPORT,
        Some(FailureKind::ResponseShape) => RESPONSE_SHAPE,
        Some(FailureKind::WaitTimeout) => WAIT_TIMEOUT,
        None => FAILURE,
    }
}
