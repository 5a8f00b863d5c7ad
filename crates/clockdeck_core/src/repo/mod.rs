//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define load/save contracts for alarms and clock settings.
//! - Isolate key-value storage and JSON encoding from services.
//!
//! # Invariants
//! - Read paths reject malformed persisted state instead of masking it.
//! - Services decide how to degrade on `RepoError`; repositories never swallow it.

use crate::db::DbError;
use crate::model::alarm::AlarmValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod alarm_repo;
pub mod kv_store;
pub mod settings_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence failure for any repository.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialization(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<AlarmValidationError> for RepoError {
    fn from(value: AlarmValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}
