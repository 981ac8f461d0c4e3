// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

use crate::types::TaxonId;

#[derive(Error, Debug)]
pub enum TaxDbError {
    /// The build destination already exists and will not be overwritten.
    #[error("Database file {} already exists. Please delete first.", path.display())]
    Precondition { path: PathBuf },

    /// A row in one of the dumps could not be parsed.
    #[error("Format error in {source_name} line {line}: {message}")]
    Format {
        source_name: &'static str,
        line: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A uniqueness or foreign-key constraint failed while building.
    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Storage error: {0}")]
    Storage(rusqlite::Error),

    /// The parent chain did not reach the root within the traversal bound.
    #[error("Cannot extract lineage for taxon {taxon_id}: no root within {max_depth} hops")]
    CycleOrDepthExceeded { taxon_id: TaxonId, max_depth: usize },
}

impl From<rusqlite::Error> for TaxDbError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref code, ref message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = message.clone().unwrap_or_else(|| code.to_string());
                TaxDbError::Integrity(detail)
            }
            other => TaxDbError::Storage(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, TaxDbError>;
