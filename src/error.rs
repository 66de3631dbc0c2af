use thiserror::Error;

use crate::passage::PassageError;
use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("{0}")]
    Passage(#[from] PassageError),

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
