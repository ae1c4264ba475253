use crate::domain::ChallengeError;

/// Failure of a service call.
///
/// `Rejected` is an expected outcome to report back to the caller and is
/// never retried. `Storage` means the transaction was rolled back and the
/// call may be retried as a whole.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Rejected(#[from] ChallengeError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        ServiceError::Storage(err.into())
    }
}

impl From<r2d2::Error> for ServiceError {
    fn from(err: r2d2::Error) -> Self {
        ServiceError::Storage(err.into())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
