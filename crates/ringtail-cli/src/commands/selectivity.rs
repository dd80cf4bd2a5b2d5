use crate::cli::SelectivityArgs;
use crate::config::selectivity::{PartialSelectivityConfig, SelectivityOptions};
use crate::error::Result;
use crate::output::Outputter;
use crate::utils::progress::CliProgressHandler;
use ringtail::engine::progress::ProgressReporter;
use ringtail::engine::selectivity::SelectivitySession;
use ringtail::workflows::selectivity::{self as workflow, SelectivityConfig, SelectivityReport};
use std::path::Path;
use tracing::{info, warn};

pub fn run(args: SelectivityArgs) -> Result<()> {
    let options = PartialSelectivityConfig::from_args(&args)?.merge_with_cli(&args)?;
    let handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(handler.get_callback());

    println!("Starting cross-reference process...");
    let report = execute(&options, Path::new("."), &reporter)?;

    if report.outcome.passing_count == 0 {
        warn!("Cross-referencing finished but no ligands passed.");
        println!("Warning: no ligands passed cross-referencing.");
    } else {
        println!(
            "✓ {} ligand(s) passed cross-referencing. Log written to: {}",
            report.outcome.passing_count,
            options.log.display()
        );
    }
    if let Some(path) = &report.csv_path {
        println!("  Final bookmark exported to: {}", path.display());
    }
    Ok(())
}

fn execute(
    options: &SelectivityOptions,
    output_dir: &Path,
    reporter: &ProgressReporter,
) -> Result<SelectivityReport> {
    let session = SelectivitySession::new(
        &options.wanted,
        &options.unwanted,
        &options.bookmark_names,
    )?;
    let config = SelectivityConfig {
        save_bookmark: options.save_bookmark.clone(),
        export_csv: options.export_csv,
        output_dir: output_dir.to_path_buf(),
        ..SelectivityConfig::new(session)
    };

    info!("Invoking the selectivity workflow...");
    let report = workflow::run(&config, reporter)?;

    info!("Writing log to {}", options.log.display());
    let mut out = Outputter::create(&options.log)?;
    if let Some(name) = &report.saved_bookmark {
        out.write_results_bookmark_to_log(name)?;
    }
    out.log_num_passing_ligands(report.outcome.passing_count)?;
    out.write_log(&report.ligands)?;
    out.finish()?;

    for step in &report.outcome.bookmark_trail {
        info!("  {}: {} passing", step.bookmark, step.passing);
    }
    Ok(report)
}
