use crate::cli::SelectivityArgs;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::PathBuf;

const DEFAULT_BOOKMARK: &str = "passing_results";
const DEFAULT_LOG: &str = "selective_log.txt";

/// A bookmark name given once for every database, or once per database.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
enum BookmarkNames {
    One(String),
    Many(Vec<String>),
}

impl From<BookmarkNames> for Vec<String> {
    fn from(names: BookmarkNames) -> Self {
        match names {
            BookmarkNames::One(name) => vec![name],
            BookmarkNames::Many(names) => names,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct PartialSelectivityConfig {
    wanted: Option<Vec<PathBuf>>,
    unwanted: Option<Vec<PathBuf>>,
    bookmark_name: Option<BookmarkNames>,
    log: Option<PathBuf>,
    save_bookmark: Option<String>,
    export_csv: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectivityOptions {
    pub wanted: Vec<PathBuf>,
    pub unwanted: Vec<PathBuf>,
    pub bookmark_names: Vec<String>,
    pub log: PathBuf,
    pub save_bookmark: Option<String>,
    pub export_csv: bool,
}

impl PartialSelectivityConfig {
    pub fn from_args(args: &SelectivityArgs) -> Result<Self> {
        match &args.config {
            Some(path) => super::file::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn merge_with_cli(self, args: &SelectivityArgs) -> Result<SelectivityOptions> {
        let pick = |cli: &[PathBuf], file: Option<Vec<PathBuf>>| {
            if cli.is_empty() {
                file.unwrap_or_default()
            } else {
                cli.to_vec()
            }
        };

        let bookmark_names = if !args.bookmark_name.is_empty() {
            args.bookmark_name.clone()
        } else {
            self.bookmark_name
                .map(Vec::from)
                .unwrap_or_else(|| vec![DEFAULT_BOOKMARK.to_string()])
        };

        let save_bookmark = args.save_bookmark.clone().or(self.save_bookmark);
        if save_bookmark.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(CliError::Argument(
                "--save-bookmark option used but no bookmark name given".to_string(),
            ));
        }

        Ok(SelectivityOptions {
            wanted: pick(&args.wanted, self.wanted),
            unwanted: pick(&args.unwanted, self.unwanted),
            bookmark_names,
            log: args
                .log
                .clone()
                .or(self.log)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG)),
            save_bookmark,
            export_csv: args.export_csv || self.export_csv.unwrap_or(false),
        })
    }
}
