use crate::cli::ReadArgs;
use crate::config;
use crate::error::{CliError, Result};
use crate::output::Outputter;
use ringtail::core::filters::{FilterSpec, InteractionKind};
use ringtail::core::residue::ResidueFilter;
use ringtail::engine::config::ResolvedOptions;
use ringtail::engine::options::{RawOptions, RunMode};
use ringtail::engine::resolver;
use ringtail::store::sqlite::SqliteGateway;
use ringtail::store::{DatabaseGateway, StoreError};
use std::path::Path;
use tracing::info;

pub fn run(args: ReadArgs) -> Result<()> {
    execute(&args, Path::new("."))
}

fn execute(args: &ReadArgs, export_dir: &Path) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let merged = config::merge_layers(&args.common, RawOptions::from(args))?;
    let resolved = resolver::resolve(&merged, RunMode::Read)?;
    super::report_warnings(&resolved.warnings);

    if !resolved.filters.has_filters() && resolved.filters.filter_bookmark.is_none() {
        info!("No filters given; the plan selects every result.");
    }
    for line in filter_summary(&resolved.filters) {
        info!("{}", line);
    }
    super::emit_plan(&resolved, args.common.emit.as_deref())?;

    let output = &resolved.output;
    if output.export_bookmark_csv.is_some() || output.new_data_from_bookmark {
        export_from_database(&resolved, export_dir)?;
    }
    Ok(())
}

fn filter_summary(filters: &FilterSpec) -> Vec<String> {
    let mut lines = Vec::new();
    for kind in InteractionKind::ALL {
        let residues = filters.residue_filters(kind);
        if !residues.is_empty() {
            let tokens: Vec<String> = residues.iter().map(ResidueFilter::to_token).collect();
            lines.push(format!("{} filters: {}", kind.option_name(), tokens.join(", ")));
        }
    }
    for count in &filters.interaction_counts {
        lines.push(format!("Interaction count filter: {}", count));
    }
    if filters.max_miss > 0 {
        lines.push(format!(
            "Up to {} of {} interaction filter(s) may be missed",
            filters.max_miss,
            filters.interaction_term_count()
        ));
    }
    lines
}

/// Bookmark exports that only need the stored ligand table.
fn export_from_database(resolved: &ResolvedOptions, export_dir: &Path) -> Result<()> {
    if resolved.read.creates_new_database {
        return Err(CliError::Argument(
            "--export-bookmark-csv and --new-data-from-bookmark need an existing database given with --input-db"
                .to_string(),
        ));
    }
    let database = &resolved.read.database;
    let gateway = SqliteGateway::open(database)?;
    let require = |bookmark: &str| -> Result<()> {
        if gateway.bookmark_exists(bookmark)? {
            Ok(())
        } else {
            Err(StoreError::MissingBookmark {
                database: database.clone(),
                bookmark: bookmark.to_string(),
            }
            .into())
        }
    };

    if let Some(bookmark) = &resolved.output.export_bookmark_csv {
        require(bookmark)?;
        let path = export_dir.join(format!("{}.csv", bookmark));
        let rows = gateway.export_csv(bookmark, &path)?;
        println!(
            "Exported {} row(s) of bookmark '{}' to {}",
            rows,
            bookmark,
            path.display()
        );
    }

    if resolved.output.new_data_from_bookmark {
        let bookmark = &resolved.read.bookmark_name;
        require(bookmark)?;
        let ligands = gateway.ligand_names(bookmark)?;
        let mut out = Outputter::create(&resolved.output.log)?;
        out.write_results_bookmark_to_log(bookmark)?;
        out.log_num_passing_ligands(ligands.len() as u64)?;
        out.write_log(&ligands)?;
        let log = out.finish()?;
        println!(
            "Wrote {} ligand(s) of bookmark '{}' to {}",
            ligands.len(),
            bookmark,
            log.display()
        );
    }

    gateway.close()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CommonArgs;
    use ringtail::engine::error::EngineError;
    use rusqlite::Connection;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn results_db(dir: &Path) -> PathBuf {
        let path = dir.join("results.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE Results (LigName TEXT, docking_score REAL);
             INSERT INTO Results VALUES ('L1', -7.1), ('L2', -6.4), ('L2', -6.0);
             CREATE VIEW passing_results AS SELECT * FROM Results;",
        )
        .unwrap();
        path
    }

    fn read_args(db: PathBuf, dir: &Path) -> ReadArgs {
        ReadArgs {
            common: CommonArgs {
                input_db: Some(db),
                emit: Some(dir.join("plan.json")),
                ..CommonArgs::default()
            },
            log: Some(dir.join("output_log.txt")),
            ..ReadArgs::default()
        }
    }

    #[test]
    fn bookmark_csv_and_log_are_exported() {
        let dir = tempdir().unwrap();
        let db = results_db(dir.path());
        let args = ReadArgs {
            export_bookmark_csv: Some("passing_results".to_string()),
            new_data_from_bookmark: true,
            ..read_args(db, dir.path())
        };

        execute(&args, dir.path()).unwrap();

        let csv = std::fs::read_to_string(dir.path().join("passing_results.csv")).unwrap();
        assert!(csv.starts_with("LigName,docking_score"));
        assert_eq!(csv.lines().count(), 4);

        let log = std::fs::read_to_string(dir.path().join("output_log.txt")).unwrap();
        assert!(log.contains("Number passing ligands: 2"));
        assert!(log.ends_with("LigName\nL1\nL2\n"));
    }

    #[test]
    fn exporting_an_unknown_bookmark_fails() {
        let dir = tempdir().unwrap();
        let db = results_db(dir.path());
        let args = ReadArgs {
            export_bookmark_csv: Some("missing".to_string()),
            ..read_args(db, dir.path())
        };
        assert!(matches!(
            execute(&args, dir.path()),
            Err(CliError::Store(StoreError::MissingBookmark { .. }))
        ));
    }

    #[test]
    fn exports_require_an_input_database() {
        let dir = tempdir().unwrap();
        let args = ReadArgs {
            common: CommonArgs {
                emit: Some(dir.path().join("plan.json")),
                ..CommonArgs::default()
            },
            new_data_from_bookmark: true,
            ..ReadArgs::default()
        };
        assert!(matches!(
            execute(&args, dir.path()),
            Err(CliError::Argument(_))
        ));
    }

    #[test]
    fn plan_carries_canonical_filters() {
        let dir = tempdir().unwrap();
        let db = results_db(dir.path());
        let args = ReadArgs {
            eworst: Some(-6.0),
            energy_percentile: Some(1.0),
            hydrogen_bond: vec!["~A:SER:130:".to_string()],
            ..read_args(db, dir.path())
        };
        execute(&args, dir.path()).unwrap();

        let plan: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("plan.json")).unwrap(),
        )
        .unwrap();
        let filters = &plan["filters"];
        assert_eq!(filters["properties"]["eworst"], -6.0);
        assert!(filters["properties"]["energy_percentile"].is_null());
        assert_eq!(filters["interactions"]["hydrogen_bond"][0]["wanted"], false);
        assert_eq!(
            filters["interactions"]["hydrogen_bond"][0]["selector"],
            "A:SER:130:"
        );
    }

    #[test]
    fn filter_summary_renders_residue_tokens_and_count_bounds() {
        let dir = tempdir().unwrap();
        let db = results_db(dir.path());
        let args = ReadArgs {
            hydrogen_bond: vec!["~A:SER:130:,B:THR:276:".to_string()],
            van_der_waals: vec!["A:LYS:162:".to_string()],
            hb_count: Some(-2),
            max_miss: Some(1),
            ..read_args(db, dir.path())
        };
        let merged = config::merge_layers(&args.common, RawOptions::from(&args)).unwrap();
        let resolved = resolver::resolve(&merged, RunMode::Read).unwrap();

        assert_eq!(
            filter_summary(&resolved.filters),
            vec![
                "van_der_waals filters: A:LYS:162:".to_string(),
                "hydrogen_bond filters: ~A:SER:130:, B:THR:276:".to_string(),
                "Interaction count filter: at most 2 hydrogen_bond interaction(s)".to_string(),
                "Up to 1 of 3 interaction filter(s) may be missed".to_string(),
            ]
        );
    }

    #[test]
    fn conflicting_bookmarks_fail_before_export() {
        let dir = tempdir().unwrap();
        let db = results_db(dir.path());
        let mut args = ReadArgs {
            filter_bookmark: Some("passing_results".to_string()),
            export_bookmark_csv: Some("passing_results".to_string()),
            ..read_args(db, dir.path())
        };
        args.common.bookmark_name = Some("passing_results".to_string());
        assert!(matches!(
            execute(&args, dir.path()),
            Err(CliError::Engine(EngineError::ConflictingBookmarkNames(_)))
        ));
        assert!(!dir.path().join("passing_results.csv").exists());
    }
}
