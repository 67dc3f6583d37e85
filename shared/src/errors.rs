//! Shared error types for the outreach pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Missing column in prospect row: {column}")]
    MissingColumn { column: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
