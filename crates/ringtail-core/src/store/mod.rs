//! # Store Module
//!
//! Access to virtual-screening result databases.
//!
//! The engine only talks to a result database through the [`DatabaseGateway`]
//! trait. [`sqlite::SqliteGateway`] is the production implementation backed by
//! `rusqlite`; tests substitute in-memory doubles.
//!
//! A *bookmark* is a named table or view holding a ligand set, keyed by the
//! `LigName` column. Scratch bookmarks created while cross-referencing are
//! temporary tables that disappear when the connection closes.

pub mod sqlite;

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database file {} does not exist", .0.display())]
    MissingDatabase(PathBuf),

    #[error("Bookmark '{bookmark}' not found in {}", .database.display())]
    MissingBookmark { database: PathBuf, bookmark: String },

    #[error("Invalid bookmark name '{0}'")]
    InvalidBookmarkName(String),
}

/// Store operations used by the selectivity engine.
///
/// All bookmarks named without a database live on the gateway's reference
/// database. `other_db` arguments name a secondary database file that is only
/// read from.
pub trait DatabaseGateway {
    fn bookmark_exists(&self, bookmark: &str) -> Result<bool, StoreError>;

    /// Materializes the ligands of `current` that also appear in
    /// `other_bookmark` of `other_db` as the bookmark `result`.
    fn intersect(
        &mut self,
        current: &str,
        other_db: &Path,
        other_bookmark: &str,
        result: &str,
    ) -> Result<(), StoreError>;

    /// Materializes the ligands of `current` that do not appear in
    /// `other_bookmark` of `other_db` as the bookmark `result`.
    fn difference(
        &mut self,
        current: &str,
        other_db: &Path,
        other_bookmark: &str,
        result: &str,
    ) -> Result<(), StoreError>;

    /// Number of distinct ligands in `bookmark`.
    fn count(&self, bookmark: &str) -> Result<u64, StoreError>;

    /// Distinct ligand names in `bookmark`, sorted.
    fn ligand_names(&self, bookmark: &str) -> Result<Vec<String>, StoreError>;

    /// Writes every row of `bookmark` to `path`, returning the row count.
    fn export_csv(&self, bookmark: &str, path: &Path) -> Result<u64, StoreError>;

    /// Copies `source` into a permanent bookmark `name` and records it in the
    /// bookmark registry with `description`.
    ///
    /// An existing table or view may only be replaced when it is itself a
    /// registered bookmark; any other name clash is `InvalidBookmarkName`.
    fn save_bookmark(&mut self, source: &str, name: &str, description: &str)
    -> Result<(), StoreError>;
}
