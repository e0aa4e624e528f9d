//! Translation of gRPC status codes into the error taxonomy.

use swift_signals_core::{ErrorKind, ServiceError};
use tonic::{Code, Status};

/// The taxonomy kind a gRPC status code maps to.
#[must_use]
pub const fn kind_for(code: Code) -> ErrorKind {
    match code {
        Code::InvalidArgument => ErrorKind::Validation,
        Code::NotFound => ErrorKind::NotFound,
        Code::AlreadyExists => ErrorKind::AlreadyExists,
        Code::Unauthenticated => ErrorKind::Unauthorized,
        Code::PermissionDenied => ErrorKind::Forbidden,
        Code::FailedPrecondition => ErrorKind::Conflict,
        Code::Unavailable => ErrorKind::Unavailable,
        _ => ErrorKind::Internal,
    }
}

/// Convert a backend status into a taxonomy error.
///
/// The backend's message is kept verbatim; the status itself is attached as the cause
/// and its code recorded in the logging context.
#[must_use]
pub fn from_status(status: Status) -> ServiceError {
    let message = if status.message().is_empty() {
        status.code().description().to_string()
    } else {
        status.message().to_string()
    };

    ServiceError::new(kind_for(status.code()), message)
        .with_context("grpc_code", format!("{:?}", status.code()))
        .with_cause(status)
}
