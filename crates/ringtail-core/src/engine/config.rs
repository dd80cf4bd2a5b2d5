use super::options::{DockingMode, RawOptions, RunMode};
use super::resolver::OptionWarning;
use crate::core::fields::OutputField;
use crate::core::filters::FilterSpec;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DuplicateHandling {
    Ignore,
    Replace,
}

impl DuplicateHandling {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "IGNORE" => Some(DuplicateHandling::Ignore),
            "REPLACE" => Some(DuplicateHandling::Replace),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectorySource {
    pub paths: Vec<PathBuf>,
    pub pattern: String,
    pub recursive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileSources {
    pub files: Vec<PathBuf>,
    pub directories: Option<DirectorySource>,
    pub file_lists: Vec<PathBuf>,
}

impl FileSources {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.directories.is_none() && self.file_lists.is_empty()
    }
}

/// Distance cutoffs in angstroms used when measuring interactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InteractionCutoffs {
    pub hydrogen_bond: f64,
    pub van_der_waals: f64,
}

/// Everything the database builder needs to ingest results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbWriteSpec {
    pub mode: DockingMode,
    pub sources: FileSources,
    pub input_db: Option<PathBuf>,
    pub database: PathBuf,
    pub creates_new_database: bool,
    pub add_results: bool,
    pub duplicate_handling: Option<DuplicateHandling>,
    pub save_receptor: bool,
    pub receptor_file: Option<PathBuf>,
    pub add_interactions: bool,
    pub interaction_cutoffs: InteractionCutoffs,
    pub interaction_tolerance: Option<f64>,
    pub max_poses: u32,
    pub store_all_poses: bool,
    pub overwrite: bool,
}

/// How an existing database is queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DbReadSpec {
    pub mode: DockingMode,
    pub database: PathBuf,
    pub creates_new_database: bool,
    pub bookmark_name: String,
    pub filter_bookmark: Option<String>,
    pub order_results: Option<OutputField>,
    pub all_poses: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSpec {
    pub log: PathBuf,
    pub overwrite: bool,
    pub export_sdf_path: Option<PathBuf>,
    pub plot: bool,
    pub out_fields: Vec<OutputField>,
    pub verbose: bool,
    pub export_bookmark_csv: Option<String>,
    pub export_query_csv: Option<String>,
    pub export_bookmark_db: bool,
    pub new_data_from_bookmark: bool,
    pub filter_bookmark: Option<String>,
}

/// Result of a successful resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedOptions {
    pub run_mode: RunMode,
    pub filters: FilterSpec,
    pub write: DbWriteSpec,
    pub read: DbReadSpec,
    pub output: OutputSpec,
    #[serde(skip)]
    pub warnings: Vec<OptionWarning>,
    /// The coerced option layer the specs were built from.
    #[serde(skip)]
    pub canonical: RawOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_handling_accepts_any_case() {
        assert_eq!(
            DuplicateHandling::parse("ignore"),
            Some(DuplicateHandling::Ignore)
        );
        assert_eq!(
            DuplicateHandling::parse("RePlAcE"),
            Some(DuplicateHandling::Replace)
        );
        assert_eq!(DuplicateHandling::parse("merge"), None);
    }

    #[test]
    fn file_sources_empty_only_without_any_source() {
        assert!(FileSources::default().is_empty());
        let sources = FileSources {
            file_lists: vec![PathBuf::from("list.txt")],
            ..FileSources::default()
        };
        assert!(!sources.is_empty());
    }
}
