use domain::{DomainError, RepositoryError};
use thiserror::Error;

/// 核心操作对外暴露的错误种类，由调用方（HTTP 层）决定如何呈现。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Conflict,
    NotFound,
    Unprocessable,
    Forbidden,
    Internal,
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("invalid input: {0}")]
    InvalidInput(DomainError),
    #[error("conflict: {0}")]
    Conflict(DomainError),
    #[error("not found: {0}")]
    NotFound(DomainError),
    #[error("unprocessable: {0}")]
    Unprocessable(DomainError),
    #[error("forbidden: {0}")]
    Forbidden(DomainError),
    #[error("repository error: {0}")]
    Internal(#[from] RepositoryError),
}

impl ApplicationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApplicationError::InvalidInput(_) => ErrorKind::InvalidInput,
            ApplicationError::Conflict(_) => ErrorKind::Conflict,
            ApplicationError::NotFound(_) => ErrorKind::NotFound,
            ApplicationError::Unprocessable(_) => ErrorKind::Unprocessable,
            ApplicationError::Forbidden(_) => ErrorKind::Forbidden,
            ApplicationError::Internal(_) => ErrorKind::Internal,
        }
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;
