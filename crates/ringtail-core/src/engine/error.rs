use thiserror::Error;

use crate::core::residue::ResidueSpecError;
use crate::store::StoreError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Given mode '{0}' not allowed. Requested mode must be 'dlg' or 'vina'")]
    InvalidMode(String),

    #[error("Conflicting options: {0}")]
    ConflictingOptions(String),

    #[error(
        "At least one input option needs to be used: --file, --file-path, --file-list, --input-db"
    )]
    MissingInputSource,

    #[error("Input database problem: {0}")]
    MissingInputDatabase(String),

    #[error("Receptor file problem: {0}")]
    MissingReceptorFile(String),

    #[error("--max-miss must be greater than or equal to 0 (got {0})")]
    InvalidMaxMiss(i64),

    #[error("'{0}' is not a valid output field")]
    UnknownOutputField(String),

    #[error("Export directory {} does not exist. Please create the directory first", .0.display())]
    MissingExportDirectory(PathBuf),

    #[error("filter_bookmark and bookmark_name cannot be the same: '{0}'")]
    ConflictingBookmarkNames(String),

    #[error(transparent)]
    MalformedResidueSpec(#[from] ResidueSpecError),

    #[error("Insufficient databases: {0}")]
    InsufficientDatabases(String),

    #[error("Cross-reference source unavailable: {0}")]
    MissingCrossrefSource(String),

    #[error("Invalid value '{value}' for option '{option}'")]
    InvalidOptionValue { option: &'static str, value: String },

    #[error("Result store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MissingDatabase(path) => EngineError::MissingCrossrefSource(format!(
                "database {} does not exist",
                path.display()
            )),
            StoreError::MissingBookmark { database, bookmark } => {
                EngineError::MissingCrossrefSource(format!(
                    "bookmark '{}' not found in {}",
                    bookmark,
                    database.display()
                ))
            }
            StoreError::InvalidBookmarkName(name) => EngineError::InvalidOptionValue {
                option: "save_bookmark",
                value: name,
            },
            other => EngineError::Store(other),
        }
    }
}
