use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::store::DatabaseGateway;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Whether a secondary database's ligands must be kept or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Include,
    Exclude,
}

impl Polarity {
    pub fn symbol(self) -> char {
        match self {
            Polarity::Include => '+',
            Polarity::Exclude => '-',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainStep {
    pub database: PathBuf,
    pub bookmark: String,
    pub polarity: Polarity,
}

impl fmt::Display for ChainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}",
            self.polarity.symbol(),
            self.database.display(),
            self.bookmark
        )
    }
}

/// An ordered cross-reference plan anchored on a reference database.
///
/// Includes always precede excludes in `chain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectivitySession {
    pub reference_db: PathBuf,
    pub start_bookmark: String,
    pub chain: Vec<ChainStep>,
}

impl SelectivitySession {
    /// Builds a session from wanted and unwanted database lists.
    ///
    /// The first wanted database is the reference. `bookmark_names` holds
    /// either a single name used for every database, or one name for the
    /// reference followed by one per remaining database, wanted before
    /// unwanted.
    pub fn new(
        wanted: &[PathBuf],
        unwanted: &[PathBuf],
        bookmark_names: &[String],
    ) -> Result<Self, EngineError> {
        let Some((reference_db, included)) = wanted.split_first() else {
            return Err(EngineError::InsufficientDatabases(
                "No wanted database found. Must specify an included database".to_string(),
            ));
        };
        let total = wanted.len() + unwanted.len();
        if total < 2 {
            return Err(EngineError::InsufficientDatabases(
                "Must specify at least two databases for comparison".to_string(),
            ));
        }

        let names: Vec<&str> = match bookmark_names {
            [] => {
                return Err(EngineError::ConflictingOptions(
                    "At least one bookmark name is required".to_string(),
                ));
            }
            [single] => vec![single.as_str(); total],
            many if many.len() == total => many.iter().map(String::as_str).collect(),
            many => {
                return Err(EngineError::ConflictingOptions(format!(
                    "Got {} bookmark names for {} databases. Give one name for all databases or one per database",
                    many.len(),
                    total
                )));
            }
        };

        let steps = included
            .iter()
            .map(|db| (db, Polarity::Include))
            .chain(unwanted.iter().map(|db| (db, Polarity::Exclude)));
        let chain = steps
            .zip(&names[1..])
            .map(|((database, polarity), bookmark)| ChainStep {
                database: database.clone(),
                bookmark: bookmark.to_string(),
                polarity,
            })
            .collect();

        Ok(Self {
            reference_db: reference_db.clone(),
            start_bookmark: names[0].to_string(),
            chain,
        })
    }

    pub fn database_count(&self) -> usize {
        self.chain.len() + 1
    }

    /// Human-readable summary stored alongside saved bookmarks.
    pub fn describe(&self) -> String {
        let steps: Vec<String> = self.chain.iter().map(ToString::to_string).collect();
        format!(
            "{}:{} {}",
            self.reference_db.display(),
            self.start_bookmark,
            steps.join(" ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrailEntry {
    pub bookmark: String,
    pub passing: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectivityOutcome {
    pub final_bookmark: String,
    pub passing_count: u64,
    pub bookmark_trail: Vec<TrailEntry>,
}

/// Name of the scratch bookmark produced by the 1-based `step`.
pub fn scratch_bookmark_name(step: usize) -> String {
    format!("crossref_{}", step)
}

/// Runs every chain step in order against the reference database.
pub fn run<G>(
    gateway: &mut G,
    session: &SelectivitySession,
    reporter: &ProgressReporter,
) -> Result<SelectivityOutcome, EngineError>
where
    G: DatabaseGateway + ?Sized,
{
    if session.chain.is_empty() {
        return Err(EngineError::InsufficientDatabases(
            "Must specify at least two databases for comparison".to_string(),
        ));
    }
    if !gateway.bookmark_exists(&session.start_bookmark)? {
        return Err(EngineError::MissingCrossrefSource(format!(
            "bookmark '{}' not found in reference database {}",
            session.start_bookmark,
            session.reference_db.display()
        )));
    }

    info!(
        "Starting cross-reference of {} database(s) from {}",
        session.database_count(),
        session.reference_db.display()
    );
    reporter.report(Progress::PhaseStart {
        name: "Cross-referencing",
    });
    reporter.report(Progress::ChainStart {
        total_steps: session.chain.len() as u64,
    });

    let mut current = session.start_bookmark.clone();
    let mut passing_count = 0;
    let mut bookmark_trail = Vec::with_capacity(session.chain.len());

    for (idx, step) in session.chain.iter().enumerate() {
        let result = scratch_bookmark_name(idx + 1);
        info!("cross-referencing {}", step.database.display());
        reporter.report(Progress::Message(format!("Cross-referencing {}", step)));

        match step.polarity {
            Polarity::Include => {
                gateway.intersect(&current, &step.database, &step.bookmark, &result)?
            }
            Polarity::Exclude => {
                gateway.difference(&current, &step.database, &step.bookmark, &result)?
            }
        }

        passing_count = gateway.count(&result)?;
        if passing_count == 0 {
            warn!(
                "No ligands left after cross-referencing {}",
                step.database.display()
            );
        }
        reporter.report(Progress::StepComplete {
            bookmark: result.clone(),
            passing: passing_count,
        });
        bookmark_trail.push(TrailEntry {
            bookmark: result.clone(),
            passing: passing_count,
        });
        current = result;
    }

    reporter.report(Progress::ChainFinish);
    reporter.report(Progress::PhaseFinish);

    Ok(SelectivityOutcome {
        final_bookmark: current,
        passing_count,
        bookmark_trail,
    })
}

#[cfg(test)]
pub(crate) mod mock {
    use crate::store::{DatabaseGateway, StoreError};
    use std::collections::{BTreeSet, HashMap};
    use std::path::{Path, PathBuf};

    /// Set-backed gateway; secondary databases are keyed by path.
    #[derive(Default)]
    pub struct MockGateway {
        pub bookmarks: HashMap<String, BTreeSet<String>>,
        pub secondaries: HashMap<PathBuf, HashMap<String, BTreeSet<String>>>,
        pub saved: Vec<(String, String)>,
    }

    impl MockGateway {
        pub fn with_reference(bookmark: &str, ligands: &[&str]) -> Self {
            let mut gateway = Self::default();
            gateway.bookmarks.insert(
                bookmark.to_string(),
                ligands.iter().map(|l| l.to_string()).collect(),
            );
            gateway
        }

        pub fn add_secondary(&mut self, db: &str, bookmark: &str, ligands: &[&str]) {
            self.secondaries.entry(PathBuf::from(db)).or_default().insert(
                bookmark.to_string(),
                ligands.iter().map(|l| l.to_string()).collect(),
            );
        }

        fn lookup(&self, db: &Path, bookmark: &str) -> Result<&BTreeSet<String>, StoreError> {
            let tables = self
                .secondaries
                .get(db)
                .ok_or_else(|| StoreError::MissingDatabase(db.to_path_buf()))?;
            tables
                .get(bookmark)
                .ok_or_else(|| StoreError::MissingBookmark {
                    database: db.to_path_buf(),
                    bookmark: bookmark.to_string(),
                })
        }

        fn current(&self, bookmark: &str) -> Result<&BTreeSet<String>, StoreError> {
            self.bookmarks
                .get(bookmark)
                .ok_or_else(|| StoreError::MissingBookmark {
                    database: PathBuf::from("reference"),
                    bookmark: bookmark.to_string(),
                })
        }

        fn combine(
            &mut self,
            current: &str,
            other_db: &Path,
            other_bookmark: &str,
            result: &str,
            keep: bool,
        ) -> Result<(), StoreError> {
            let other = self.lookup(other_db, other_bookmark)?;
            let combined = self
                .current(current)?
                .iter()
                .filter(|l| other.contains(*l) == keep)
                .cloned()
                .collect();
            self.bookmarks.insert(result.to_string(), combined);
            Ok(())
        }
    }

    impl DatabaseGateway for MockGateway {
        fn bookmark_exists(&self, bookmark: &str) -> Result<bool, StoreError> {
            Ok(self.bookmarks.contains_key(bookmark))
        }

        fn intersect(
            &mut self,
            current: &str,
            other_db: &Path,
            other_bookmark: &str,
            result: &str,
        ) -> Result<(), StoreError> {
            self.combine(current, other_db, other_bookmark, result, true)
        }

        fn difference(
            &mut self,
            current: &str,
            other_db: &Path,
            other_bookmark: &str,
            result: &str,
        ) -> Result<(), StoreError> {
            self.combine(current, other_db, other_bookmark, result, false)
        }

        fn count(&self, bookmark: &str) -> Result<u64, StoreError> {
            Ok(self.current(bookmark)?.len() as u64)
        }

        fn ligand_names(&self, bookmark: &str) -> Result<Vec<String>, StoreError> {
            Ok(self.current(bookmark)?.iter().cloned().collect())
        }

        fn export_csv(&self, bookmark: &str, path: &Path) -> Result<u64, StoreError> {
            let names = self.ligand_names(bookmark)?;
            let mut writer = csv::Writer::from_path(path)?;
            writer.write_record(["LigName"])?;
            for name in &names {
                writer.write_record([name])?;
            }
            writer.flush()?;
            Ok(names.len() as u64)
        }

        fn save_bookmark(
            &mut self,
            source: &str,
            name: &str,
            description: &str,
        ) -> Result<(), StoreError> {
            if name.trim().is_empty() {
                return Err(StoreError::InvalidBookmarkName(name.to_string()));
            }
            let ligands = self.current(source)?.clone();
            self.bookmarks.insert(name.to_string(), ligands);
            self.saved.push((name.to_string(), description.to_string()));
            Ok(())
        }
    }
}
