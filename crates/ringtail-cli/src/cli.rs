use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Ringtail CLI - resolve filtering options for virtual-screening result databases and cross-reference passing ligands across screenings.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve options for adding docking results to a database.
    Write(WriteArgs),
    /// Resolve filters for reading and filtering an existing database.
    Read(ReadArgs),
    /// Cross-reference passing ligands across several filtered databases.
    Selectivity(SelectivityArgs),
}

/// Options shared by `write` and `read`.
#[derive(Args, Debug, Default)]
pub struct CommonArgs {
    /// JSON or TOML file with option definitions. Command line options take precedence.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Docking result format: 'dlg' or 'vina'.
    #[arg(short, long, value_name = "MODE")]
    pub mode: Option<String>,

    /// Existing database to read from or add results to.
    #[arg(long, value_name = "PATH")]
    pub input_db: Option<PathBuf>,

    /// Name of the bookmark holding passing results.
    #[arg(short = 's', long, value_name = "NAME")]
    pub bookmark_name: Option<String>,

    /// Allow overwriting existing output files and databases.
    #[arg(long)]
    pub overwrite: bool,

    /// Set a raw option value, overriding the config file. Can be used multiple times.
    /// Example: -S eworst=-6.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,

    /// Write the resolved plan as JSON to this path instead of standard output.
    #[arg(long, value_name = "PATH")]
    pub emit: Option<PathBuf>,
}

/// Arguments for the `write` subcommand.
#[derive(Args, Debug, Default)]
pub struct WriteArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    // --- Input Sources ---
    /// Docking result file(s) to add.
    #[arg(short = 'f', long, value_name = "PATH", num_args(1..))]
    pub file: Vec<PathBuf>,

    /// Directories searched for result files.
    #[arg(long, value_name = "DIR", num_args(1..))]
    pub file_path: Vec<PathBuf>,

    /// Text files listing result files, one per line.
    #[arg(long, value_name = "PATH", num_args(1..))]
    pub file_list: Vec<PathBuf>,

    /// Glob pattern used when searching directories.
    #[arg(short, long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Search directories recursively.
    #[arg(short, long)]
    pub recursive: bool,

    // --- Database ---
    /// Database file created when no input database is given.
    #[arg(short, long, value_name = "PATH")]
    pub output_db: Option<PathBuf>,

    /// Add results to the database given with --input-db.
    #[arg(short, long)]
    pub add_results: bool,

    /// How duplicate results are handled: 'ignore' or 'replace'.
    #[arg(long, value_name = "POLICY")]
    pub duplicate_handling: Option<String>,

    // --- Receptor and Interactions ---
    /// Store the receptor structure in the database.
    #[arg(long)]
    pub save_receptor: bool,

    /// Receptor PDBQT file.
    #[arg(long, value_name = "PATH")]
    pub receptor_file: Option<PathBuf>,

    /// Compute interactions for results that lack them.
    #[arg(long)]
    pub add_interactions: bool,

    /// Hydrogen bond and van der Waals distance cutoffs, as 'HB,VDW'.
    #[arg(long, value_name = "HB,VDW")]
    pub interaction_cutoffs: Option<String>,

    /// Also count interactions within this distance in other poses of the ligand.
    #[arg(long, value_name = "FLOAT")]
    pub interaction_tolerance: Option<f64>,

    /// Number of poses stored per ligand.
    #[arg(long, value_name = "INT")]
    pub max_poses: Option<u32>,

    /// Store every pose of every ligand.
    #[arg(long)]
    pub store_all_poses: bool,
}

/// Arguments for the `read` subcommand.
#[derive(Args, Debug, Default)]
pub struct ReadArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    // --- Output ---
    /// Log file for passing results.
    #[arg(short, long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Comma-separated fields written to the log (e.g. 'e,le,hb').
    #[arg(long, value_name = "FIELDS")]
    pub out_fields: Option<String>,

    /// Field used to order the results.
    #[arg(long, value_name = "FIELD")]
    pub order_results: Option<String>,

    /// Log every passing pose instead of the best one per ligand.
    #[arg(long)]
    pub all_poses: bool,

    /// Export the named bookmark as CSV.
    #[arg(long, value_name = "BOOKMARK")]
    pub export_bookmark_csv: Option<String>,

    /// Export the result of an SQL query as CSV.
    #[arg(long, value_name = "QUERY")]
    pub export_query_csv: Option<String>,

    /// Directory receiving SDF files for passing poses.
    #[arg(long, value_name = "DIR")]
    pub export_sdf_path: Option<PathBuf>,

    /// Export the bookmark as a standalone database.
    #[arg(long)]
    pub export_bookmark_db: bool,

    /// Write the ligands of an existing bookmark to the log without filtering.
    #[arg(long)]
    pub new_data_from_bookmark: bool,

    /// Filter the results of an existing bookmark instead of the whole database.
    #[arg(long, value_name = "BOOKMARK")]
    pub filter_bookmark: Option<String>,

    /// Plot energy against ligand efficiency.
    #[arg(long)]
    pub plot: bool,

    // --- Property Filters ---
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub eworst: Option<f64>,
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub ebest: Option<f64>,
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub leworst: Option<f64>,
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub lebest: Option<f64>,
    /// Keep the best N percent of results by energy.
    #[arg(long, value_name = "FLOAT")]
    pub energy_percentile: Option<f64>,
    /// Keep the best N percent of results by ligand efficiency.
    #[arg(long, value_name = "FLOAT")]
    pub le_percentile: Option<f64>,

    // --- Ligand Filters ---
    /// Ligand name(s) to keep.
    #[arg(short, long, value_name = "NAME", num_args(1..))]
    pub name: Vec<String>,

    /// SMARTS substructure(s) the ligand must contain.
    #[arg(long, value_name = "SMARTS", num_args(1..))]
    pub substructure: Vec<String>,

    /// How substructures are combined: 'AND' or 'OR'.
    #[arg(long, value_name = "JOIN")]
    pub substructure_join: Option<String>,

    // --- Interaction Filters ---
    /// Van der Waals residues as '[~]CHAIN:RES:NUM:ATOM', comma separated.
    #[arg(long, value_name = "RESIDUES", num_args(1..))]
    pub van_der_waals: Vec<String>,

    /// Hydrogen bond residues as '[~]CHAIN:RES:NUM:ATOM', comma separated.
    #[arg(long, value_name = "RESIDUES", num_args(1..))]
    pub hydrogen_bond: Vec<String>,

    /// Reactive residues as '[~]CHAIN:RES:NUM:ATOM', comma separated.
    #[arg(long, value_name = "RESIDUES", num_args(1..))]
    pub reactive_res: Vec<String>,

    /// Minimum hydrogen bond count; negative values set a maximum.
    #[arg(long, value_name = "INT", allow_hyphen_values = true)]
    pub hb_count: Option<i64>,

    /// Keep ligands that react with any residue.
    #[arg(long)]
    pub react_any: bool,

    /// Number of interaction filters a ligand may miss.
    #[arg(long, value_name = "INT", allow_hyphen_values = true)]
    pub max_miss: Option<i64>,
}

/// Arguments for the `selectivity` subcommand.
#[derive(Args, Debug, Default)]
pub struct SelectivityArgs {
    /// JSON or TOML file with option definitions. Command line options take precedence.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Databases whose ligands MUST be included. The first one is the reference.
    #[arg(short, long, value_name = "DB", num_args(1..))]
    pub wanted: Vec<PathBuf>,

    /// Databases whose ligands MUST NOT be included.
    #[arg(short = 'n', long, value_name = "DB", num_args(1..))]
    pub unwanted: Vec<PathBuf>,

    /// Bookmark name for all databases, or one per database (wanted, then unwanted).
    #[arg(short = 's', long, value_name = "NAME", num_args(1..))]
    pub bookmark_name: Vec<String>,

    /// Log file for passing ligands.
    #[arg(short, long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Save the final bookmark under this name in the reference database.
    #[arg(short = 'b', long, value_name = "NAME")]
    pub save_bookmark: Option<String>,

    /// Export the final bookmark as '<save-bookmark>.csv' or 'crossref.csv'.
    #[arg(short = 'x', long)]
    pub export_csv: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn read_accepts_negative_cutoffs_and_multiple_residues() {
        let cli = Cli::try_parse_from([
            "ringtail",
            "read",
            "--input-db",
            "results.db",
            "--eworst",
            "-6.5",
            "--hb-count",
            "-2",
            "--van-der-waals",
            "A:LYS:162:",
            "~B:THR:276:",
        ])
        .unwrap();
        let Commands::Read(args) = cli.command else {
            panic!("expected read command");
        };
        assert_eq!(args.eworst, Some(-6.5));
        assert_eq!(args.hb_count, Some(-2));
        assert_eq!(args.van_der_waals, vec!["A:LYS:162:", "~B:THR:276:"]);
    }

    #[test]
    fn selectivity_parses_database_lists() {
        let cli = Cli::try_parse_from([
            "ringtail",
            "-v",
            "selectivity",
            "-w",
            "a.db",
            "b.db",
            "-n",
            "c.db",
            "-x",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        let Commands::Selectivity(args) = cli.command else {
            panic!("expected selectivity command");
        };
        assert_eq!(args.wanted.len(), 2);
        assert_eq!(args.unwanted, vec![PathBuf::from("c.db")]);
        assert!(args.export_csv);
        assert!(args.bookmark_name.is_empty());
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["ringtail", "-q", "-v", "read"]).is_err());
    }
}
