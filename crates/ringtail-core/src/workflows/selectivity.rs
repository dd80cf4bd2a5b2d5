use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::selectivity::{self, SelectivityOutcome, SelectivitySession};
use crate::store::DatabaseGateway;
use crate::store::sqlite::SqliteGateway;
use std::path::PathBuf;
use tracing::{info, instrument};

const DEFAULT_CSV_NAME: &str = "crossref.csv";

#[derive(Debug, Clone)]
pub struct SelectivityConfig {
    pub session: SelectivitySession,
    /// Permanent name for the final bookmark in the reference database.
    pub save_bookmark: Option<String>,
    pub export_csv: bool,
    /// Directory the CSV export is written to.
    pub output_dir: PathBuf,
}

impl SelectivityConfig {
    pub fn new(session: SelectivitySession) -> Self {
        Self {
            session,
            save_bookmark: None,
            export_csv: false,
            output_dir: PathBuf::from("."),
        }
    }

    /// `<save_bookmark>.csv`, or `crossref.csv` when no bookmark is saved.
    pub fn csv_path(&self) -> PathBuf {
        match &self.save_bookmark {
            Some(name) => self.output_dir.join(format!("{}.csv", name)),
            None => self.output_dir.join(DEFAULT_CSV_NAME),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectivityReport {
    pub outcome: SelectivityOutcome,
    /// Ligands of the final bookmark, sorted.
    pub ligands: Vec<String>,
    pub saved_bookmark: Option<String>,
    pub csv_path: Option<PathBuf>,
}

#[instrument(skip_all, name = "selectivity_workflow")]
pub fn run(
    config: &SelectivityConfig,
    reporter: &ProgressReporter,
) -> Result<SelectivityReport, EngineError> {
    let mut gateway = SqliteGateway::open(&config.session.reference_db)?;
    let report = run_with_gateway(&mut gateway, config, reporter)?;
    gateway.close()?;
    Ok(report)
}

/// Runs the workflow against an already opened gateway.
pub fn run_with_gateway<G>(
    gateway: &mut G,
    config: &SelectivityConfig,
    reporter: &ProgressReporter,
) -> Result<SelectivityReport, EngineError>
where
    G: DatabaseGateway + ?Sized,
{
    check_save_bookmark(config)?;

    let outcome = selectivity::run(gateway, &config.session, reporter)?;
    let ligands = gateway.ligand_names(&outcome.final_bookmark)?;
    info!(
        "{} ligand(s) passed cross-referencing into '{}'",
        outcome.passing_count, outcome.final_bookmark
    );

    let saved_bookmark = match &config.save_bookmark {
        Some(name) => {
            reporter.report(Progress::Message(format!("Saving bookmark '{}'", name)));
            gateway.save_bookmark(&outcome.final_bookmark, name, &config.session.describe())?;
            info!("Saved final bookmark as '{}'", name);
            Some(name.clone())
        }
        None => None,
    };

    let csv_path = if config.export_csv {
        let path = config.csv_path();
        let rows = gateway.export_csv(&outcome.final_bookmark, &path)?;
        info!("Exported {} row(s) to {}", rows, path.display());
        Some(path)
    } else {
        None
    };

    Ok(SelectivityReport {
        outcome,
        ligands,
        saved_bookmark,
        csv_path,
    })
}

fn check_save_bookmark(config: &SelectivityConfig) -> Result<(), EngineError> {
    match &config.save_bookmark {
        Some(name) if name.trim().is_empty() => Err(EngineError::InvalidOptionValue {
            option: "save_bookmark",
            value: name.clone(),
        }),
        _ => Ok(()),
    }
}
