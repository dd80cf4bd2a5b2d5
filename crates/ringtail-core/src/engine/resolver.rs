use super::config::{
    DbReadSpec, DbWriteSpec, DirectorySource, DuplicateHandling, FileSources, InteractionCutoffs,
    OutputSpec, ResolvedOptions,
};
use super::error::EngineError;
use super::options::{DockingMode, RawOptions, RunMode};
use crate::core::fields::OutputField;
use crate::core::filters::{
    FilterSpec, InteractionCount, InteractionKind, LigandFilters, PropertyFilters,
    SubstructureJoin,
};
use crate::core::residue;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{MAIN_SEPARATOR, PathBuf};
use tracing::debug;

const DEFAULT_BOOKMARK: &str = "passing_results";
const DEFAULT_CUTOFFS: &str = "3.7,4.0";
const DEFAULT_OUTPUT_DB: &str = "output.db";
const DEFAULT_LOG: &str = "output_log.txt";

/// An option combination that was coerced instead of rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionWarning {
    InteractionFilterUnavailable { option: &'static str },
    ReactAnyUnavailable,
    InteractionToleranceUnavailable,
    ToleranceWithStoreAllPoses,
    AllPosesWithPercentile,
    UnknownDuplicateHandling(String),
    PercentileOverridden {
        cutoff: &'static str,
        percentile: &'static str,
    },
}

impl fmt::Display for OptionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionWarning::InteractionFilterUnavailable { option } => write!(
                f,
                "Given {} interaction filter. Cannot filter interactions in Vina mode. Ignoring filter.",
                option
            ),
            OptionWarning::ReactAnyUnavailable => write!(
                f,
                "Cannot use reaction filters with Vina mode. Removing react_any filter."
            ),
            OptionWarning::InteractionToleranceUnavailable => write!(
                f,
                "Cannot use interaction_tolerance with Vina mode. Removing interaction_tolerance."
            ),
            OptionWarning::ToleranceWithStoreAllPoses => write!(
                f,
                "Cannot use interaction_tolerance with store_all_poses. Removing interaction_tolerance."
            ),
            OptionWarning::AllPosesWithPercentile => write!(
                f,
                "Cannot return all passing poses with percentile filter. Will only log best pose."
            ),
            OptionWarning::UnknownDuplicateHandling(value) => write!(
                f,
                "duplicate_handling option '{}' not allowed. Reverting to default behavior.",
                value
            ),
            OptionWarning::PercentileOverridden { cutoff, percentile } => write!(
                f,
                "Cannot use {} cutoff with {}. Overriding {} with {}.",
                cutoff, percentile, percentile, cutoff
            ),
        }
    }
}

/// Resolves a merged option layer into the canonical specs.
///
/// Resolution never touches the caller's options: coercions are applied to a
/// copy, reported as warnings, and the coerced copy is returned as
/// [`ResolvedOptions::canonical`]. Resolving that copy again yields the same
/// specs and no warnings.
pub fn resolve(raw: &RawOptions, run_mode: RunMode) -> Result<ResolvedOptions, EngineError> {
    let (canonical, warnings) = canonicalize(raw, run_mode)?;
    let mut resolved = build(&canonical, run_mode)?;
    debug!(
        "Resolved {:?} options with {} warning(s); filters present: {}",
        run_mode,
        warnings.len(),
        resolved.filters.has_filters()
    );
    resolved.warnings = warnings;
    resolved.canonical = canonical;
    Ok(resolved)
}

/// Applies every warn-and-coerce rule.
pub fn canonicalize(
    raw: &RawOptions,
    run_mode: RunMode,
) -> Result<(RawOptions, Vec<OptionWarning>), EngineError> {
    let mut opts = raw.clone();
    let mut warnings = Vec::new();

    let mode = parse_mode(&opts)?;
    opts.mode = Some(mode.to_string());

    if !mode.has_interactions() {
        if opts.react_any == Some(true) {
            warnings.push(OptionWarning::ReactAnyUnavailable);
            opts.react_any = Some(false);
        }
        if opts.interaction_tolerance.take().is_some() {
            warnings.push(OptionWarning::InteractionToleranceUnavailable);
        }
        for kind in InteractionKind::ALL {
            if residue_option_mut(&mut opts, kind).take().is_some() {
                warnings.push(OptionWarning::InteractionFilterUnavailable {
                    option: kind.option_name(),
                });
            }
        }
        if opts.hb_count.take().is_some() {
            warnings.push(OptionWarning::InteractionFilterUnavailable { option: "hb_count" });
        }
        opts.pattern = Some(mode.default_pattern().to_string());
    }

    if opts.interaction_tolerance.is_some() && opts.store_all_poses == Some(true) {
        opts.interaction_tolerance = None;
        warnings.push(OptionWarning::ToleranceWithStoreAllPoses);
    }

    if opts.all_poses == Some(true)
        && (opts.energy_percentile.is_some() || opts.le_percentile.is_some())
    {
        opts.all_poses = Some(false);
        warnings.push(OptionWarning::AllPosesWithPercentile);
    }

    match run_mode {
        RunMode::Write => {
            if let Some(token) = opts.duplicate_handling.take() {
                match DuplicateHandling::parse(&token) {
                    Some(handling) => {
                        opts.duplicate_handling =
                            Some(format!("{:?}", handling).to_ascii_uppercase())
                    }
                    None => warnings.push(OptionWarning::UnknownDuplicateHandling(token)),
                }
            }
        }
        RunMode::Read => {
            if opts.eworst.is_some() && opts.energy_percentile.is_some() {
                opts.energy_percentile = None;
                warnings.push(OptionWarning::PercentileOverridden {
                    cutoff: "eworst",
                    percentile: "energy_percentile",
                });
            }
            if opts.leworst.is_some() && opts.le_percentile.is_some() {
                opts.le_percentile = None;
                warnings.push(OptionWarning::PercentileOverridden {
                    cutoff: "leworst",
                    percentile: "le_percentile",
                });
            }
            if let Some(path) = opts.export_sdf_path.take() {
                opts.export_sdf_path = Some(with_trailing_separator(path));
            }
        }
    }

    Ok((opts, warnings))
}

fn build(opts: &RawOptions, run_mode: RunMode) -> Result<ResolvedOptions, EngineError> {
    let mode = parse_mode(opts)?;
    let add_interactions = opts.add_interactions.unwrap_or(false);

    if mode == DockingMode::Vina && add_interactions && opts.receptor_file.is_none() {
        return Err(EngineError::MissingReceptorFile(
            "--add-interactions in Vina mode requires the receptor PDBQT given with --receptor-file"
                .to_string(),
        ));
    }
    check_receptor(opts)?;

    let (database, creates_new_database) = match &opts.input_db {
        Some(path) => {
            if !path.exists() {
                return Err(EngineError::MissingInputDatabase(format!(
                    "input database {} does not exist",
                    path.display()
                )));
            }
            (path.clone(), false)
        }
        None => (
            opts.output_db
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DB)),
            true,
        ),
    };

    let write = build_write_spec(opts, mode, run_mode, database.clone(), creates_new_database)?;

    let bookmark_name = opts
        .bookmark_name
        .clone()
        .unwrap_or_else(|| DEFAULT_BOOKMARK.to_string());

    let (filters, out_fields, order_results) = match run_mode {
        RunMode::Read => {
            let out_fields = parse_out_fields(opts.out_fields.as_deref())?;
            let order_results = parse_order_results(opts.order_results.as_deref())?;
            let filters = build_filter_spec(opts, mode, bookmark_name.clone())?;
            (filters, out_fields, order_results)
        }
        RunMode::Write => {
            let filters = FilterSpec {
                bookmark_name: bookmark_name.clone(),
                filter_bookmark: opts.filter_bookmark.clone(),
                ..FilterSpec::default()
            };
            let out_fields = parse_out_fields(opts.out_fields.as_deref()).unwrap_or_default();
            (filters, out_fields, None)
        }
    };

    let read = DbReadSpec {
        mode,
        database,
        creates_new_database,
        bookmark_name,
        filter_bookmark: opts.filter_bookmark.clone(),
        order_results,
        all_poses: opts.all_poses.unwrap_or(false),
    };

    let output = OutputSpec {
        log: opts
            .log
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG)),
        overwrite: opts.overwrite.unwrap_or(false),
        export_sdf_path: opts.export_sdf_path.clone(),
        plot: opts.plot.unwrap_or(false),
        out_fields,
        verbose: opts.verbose.unwrap_or(false),
        export_bookmark_csv: opts.export_bookmark_csv.clone(),
        export_query_csv: opts.export_query_csv.clone(),
        export_bookmark_db: opts.export_bookmark_db.unwrap_or(false),
        new_data_from_bookmark: opts.new_data_from_bookmark.unwrap_or(false),
        filter_bookmark: opts.filter_bookmark.clone(),
    };

    Ok(ResolvedOptions {
        run_mode,
        filters,
        write,
        read,
        output,
        warnings: Vec::new(),
        canonical: RawOptions::default(),
    })
}

fn build_write_spec(
    opts: &RawOptions,
    mode: DockingMode,
    run_mode: RunMode,
    database: PathBuf,
    creates_new_database: bool,
) -> Result<DbWriteSpec, EngineError> {
    let pattern = opts
        .pattern
        .clone()
        .unwrap_or_else(|| mode.default_pattern().to_string());
    let sources = FileSources {
        files: opts.file.clone().unwrap_or_default(),
        directories: opts.file_path.clone().map(|paths| DirectorySource {
            paths,
            pattern,
            recursive: opts.recursive.unwrap_or(false),
        }),
        file_lists: opts.file_list.clone().unwrap_or_default(),
    };
    let add_results = opts.add_results.unwrap_or(false);

    if run_mode == RunMode::Write {
        if sources.is_empty() && opts.input_db.is_none() {
            return Err(EngineError::MissingInputSource);
        }
        if add_results && opts.input_db.is_none() {
            return Err(EngineError::MissingInputDatabase(
                "--input-db must be given when adding results to an existing database"
                    .to_string(),
            ));
        }
    }

    let store_all_poses = opts.store_all_poses.unwrap_or(false);

    Ok(DbWriteSpec {
        mode,
        sources,
        input_db: opts.input_db.clone(),
        database,
        creates_new_database,
        add_results,
        duplicate_handling: opts
            .duplicate_handling
            .as_deref()
            .and_then(DuplicateHandling::parse),
        save_receptor: opts.save_receptor.unwrap_or(false),
        receptor_file: opts.receptor_file.clone(),
        add_interactions: opts.add_interactions.unwrap_or(false),
        interaction_cutoffs: parse_interaction_cutoffs(
            opts.interaction_cutoffs.as_deref().unwrap_or(DEFAULT_CUTOFFS),
        )?,
        interaction_tolerance: opts.interaction_tolerance,
        max_poses: opts.max_poses.unwrap_or(3),
        store_all_poses,
        overwrite: opts.overwrite.unwrap_or(false),
    })
}

fn build_filter_spec(
    opts: &RawOptions,
    mode: DockingMode,
    bookmark_name: String,
) -> Result<FilterSpec, EngineError> {
    let max_miss = match opts.max_miss.unwrap_or(0) {
        negative if negative < 0 => return Err(EngineError::InvalidMaxMiss(negative)),
        value => u32::try_from(value).map_err(|_| EngineError::InvalidOptionValue {
            option: "max_miss",
            value: value.to_string(),
        })?,
    };
    if max_miss > 0 {
        if opts.plot.unwrap_or(false) {
            return Err(EngineError::ConflictingOptions(
                "Cannot use --plot with --max-miss > 0. Plot the desired bookmark with --bookmark-name instead"
                    .to_string(),
            ));
        }
        if opts.export_sdf_path.is_some() {
            return Err(EngineError::ConflictingOptions(
                "Cannot use --export-sdf-path with --max-miss > 0. Export poses for the desired bookmark with --bookmark-name instead"
                    .to_string(),
            ));
        }
    }

    if let Some(path) = &opts.export_sdf_path {
        if !path.is_dir() {
            return Err(EngineError::MissingExportDirectory(path.clone()));
        }
    }

    if opts.filter_bookmark.as_deref() == Some(bookmark_name.as_str()) {
        return Err(EngineError::ConflictingBookmarkNames(bookmark_name));
    }

    let properties = PropertyFilters {
        eworst: opts.eworst,
        ebest: opts.ebest,
        leworst: opts.leworst,
        lebest: opts.lebest,
        energy_percentile: opts.energy_percentile,
        le_percentile: opts.le_percentile,
    };
    if properties.has_percentile() && opts.filter_bookmark.is_some() {
        return Err(EngineError::ConflictingOptions(
            "Cannot use --energy-percentile or --le-percentile with --filter-bookmark".to_string(),
        ));
    }

    let mut interactions = BTreeMap::new();
    let mut interaction_counts = Vec::new();
    if mode.has_interactions() {
        for kind in InteractionKind::ALL {
            let Some(entries) = residue_option(opts, kind) else {
                continue;
            };
            let mut parsed = Vec::new();
            for entry in entries {
                parsed.extend(residue::parse_list(entry)?);
            }
            if !parsed.is_empty() {
                interactions.insert(kind, parsed);
            }
        }
        if let Some(threshold) = opts.hb_count {
            interaction_counts.push(InteractionCount {
                kind: InteractionKind::HydrogenBond,
                threshold,
            });
        }
    }

    let substructure_join = match opts.substructure_join.as_deref() {
        None => SubstructureJoin::default(),
        Some(value) => match value.trim().to_ascii_uppercase().as_str() {
            "AND" => SubstructureJoin::And,
            "OR" => SubstructureJoin::Or,
            _ => {
                return Err(EngineError::InvalidOptionValue {
                    option: "substructure_join",
                    value: value.to_string(),
                });
            }
        },
    };

    Ok(FilterSpec {
        properties,
        interactions,
        interaction_counts,
        react_any: mode.has_interactions() && opts.react_any.unwrap_or(false),
        ligand_filters: LigandFilters {
            names: opts.name.clone().unwrap_or_default(),
            substructures: opts.substructure.clone().unwrap_or_default(),
            substructure_join,
        },
        max_miss,
        bookmark_name,
        filter_bookmark: opts.filter_bookmark.clone(),
    })
}

fn check_receptor(opts: &RawOptions) -> Result<(), EngineError> {
    let save_receptor = opts.save_receptor.unwrap_or(false);
    let add_interactions = opts.add_interactions.unwrap_or(false);

    if save_receptor {
        if opts.add_results.unwrap_or(false) {
            return Err(EngineError::ConflictingOptions(
                "Cannot use --add-results with --save-receptor. Please remove the --save-receptor flag"
                    .to_string(),
            ));
        }
        if opts.receptor_file.is_none() {
            return Err(EngineError::MissingReceptorFile(
                "Must provide the receptor PDBQT path with --receptor-file when using --save-receptor"
                    .to_string(),
            ));
        }
    }

    if save_receptor || add_interactions {
        if let Some(path) = &opts.receptor_file {
            if !path.exists() {
                return Err(EngineError::MissingReceptorFile(format!(
                    "receptor file {} not found",
                    path.display()
                )));
            }
        }
    }
    Ok(())
}

fn parse_mode(opts: &RawOptions) -> Result<DockingMode, EngineError> {
    let value = opts.mode.as_deref().unwrap_or("dlg");
    DockingMode::parse(value).ok_or_else(|| EngineError::InvalidMode(value.to_string()))
}

fn parse_out_fields(value: Option<&str>) -> Result<Vec<OutputField>, EngineError> {
    let Some(value) = value else {
        return Ok(vec![OutputField::Energy]);
    };
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|token| {
            OutputField::from_token(token)
                .ok_or_else(|| EngineError::UnknownOutputField(token.to_string()))
        })
        .collect()
}

fn parse_order_results(value: Option<&str>) -> Result<Option<OutputField>, EngineError> {
    value
        .map(|token| {
            OutputField::from_token(token)
                .filter(|f| f.is_orderable())
                .ok_or_else(|| EngineError::UnknownOutputField(token.to_string()))
        })
        .transpose()
}

fn parse_interaction_cutoffs(value: &str) -> Result<InteractionCutoffs, EngineError> {
    let invalid = || EngineError::InvalidOptionValue {
        option: "interaction_cutoffs",
        value: value.to_string(),
    };
    let parts: Vec<f64> = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid())?;
    match parts.as_slice() {
        [hydrogen_bond, van_der_waals] => Ok(InteractionCutoffs {
            hydrogen_bond: *hydrogen_bond,
            van_der_waals: *van_der_waals,
        }),
        _ => Err(invalid()),
    }
}

fn with_trailing_separator(path: PathBuf) -> PathBuf {
    let text = path.to_string_lossy();
    if text.ends_with(MAIN_SEPARATOR) || text.ends_with('/') {
        return path;
    }
    let mut os = path.into_os_string();
    os.push(MAIN_SEPARATOR.to_string());
    PathBuf::from(os)
}

fn residue_option(opts: &RawOptions, kind: InteractionKind) -> Option<&Vec<String>> {
    match kind {
        InteractionKind::VanDerWaals => opts.van_der_waals.as_ref(),
        InteractionKind::HydrogenBond => opts.hydrogen_bond.as_ref(),
        InteractionKind::ReactiveResidue => opts.reactive_res.as_ref(),
    }
}

fn residue_option_mut(opts: &mut RawOptions, kind: InteractionKind) -> &mut Option<Vec<String>> {
    match kind {
        InteractionKind::VanDerWaals => &mut opts.van_der_waals,
        InteractionKind::HydrogenBond => &mut opts.hydrogen_bond,
        InteractionKind::ReactiveResidue => &mut opts.reactive_res,
    }
}
