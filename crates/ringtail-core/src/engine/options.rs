use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which half of the tool the options are resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Write,
    Read,
}

/// The docking program that produced the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DockingMode {
    Dlg,
    Vina,
}

impl DockingMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dlg" => Some(DockingMode::Dlg),
            "vina" => Some(DockingMode::Vina),
            _ => None,
        }
    }

    /// Interaction data is only recorded for DLG results.
    pub fn has_interactions(self) -> bool {
        matches!(self, DockingMode::Dlg)
    }

    pub fn default_pattern(self) -> &'static str {
        match self {
            DockingMode::Dlg => "*.dlg*",
            DockingMode::Vina => "*.pdbqt*",
        }
    }
}

impl fmt::Display for DockingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DockingMode::Dlg => write!(f, "dlg"),
            DockingMode::Vina => write!(f, "vina"),
        }
    }
}

/// One layer of raw option values.
///
/// Every recognized key is optional so that layers can be stacked with
/// [`RawOptions::layer`]. Unknown keys in a config file are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawOptions {
    // General
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_db: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookmark_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,

    // Write mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_list: Option<Vec<PathBuf>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_db: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_results: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_handling: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_receptor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receptor_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_interactions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_cutoffs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_tolerance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_poses: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_all_poses: Option<bool>,

    // Read mode: output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_fields: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_results: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_poses: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_bookmark_csv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_query_csv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_sdf_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_bookmark_db: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_data_from_bookmark: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_bookmark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<bool>,

    // Read mode: property filters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eworst: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ebest: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leworst: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lebest: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_percentile: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub le_percentile: Option<f64>,

    // Read mode: ligand filters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substructure: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substructure_join: Option<String>,

    // Read mode: interaction filters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub van_der_waals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hydrogen_bond: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactive_res: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hb_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub react_any: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_miss: Option<i64>,
}

impl RawOptions {
    /// The built-in bottom layer.
    pub fn defaults() -> Self {
        Self {
            mode: Some("dlg".to_string()),
            bookmark_name: Some("passing_results".to_string()),
            pattern: Some(DockingMode::Dlg.default_pattern().to_string()),
            output_db: Some(PathBuf::from("output.db")),
            interaction_cutoffs: Some("3.7,4.0".to_string()),
            max_poses: Some(3),
            log: Some(PathBuf::from("output_log.txt")),
            out_fields: Some("e".to_string()),
            substructure_join: Some("OR".to_string()),
            max_miss: Some(0),
            ..Self::default()
        }
    }

    /// Stacks `over` on top of `self`; every value set in `over` wins.
    pub fn layer(self, over: RawOptions) -> RawOptions {
        RawOptions {
            mode: over.mode.or(self.mode),
            input_db: over.input_db.or(self.input_db),
            bookmark_name: over.bookmark_name.or(self.bookmark_name),
            verbose: over.verbose.or(self.verbose),
            overwrite: over.overwrite.or(self.overwrite),

            file: over.file.or(self.file),
            file_path: over.file_path.or(self.file_path),
            file_list: over.file_list.or(self.file_list),
            pattern: over.pattern.or(self.pattern),
            recursive: over.recursive.or(self.recursive),
            output_db: over.output_db.or(self.output_db),
            add_results: over.add_results.or(self.add_results),
            duplicate_handling: over.duplicate_handling.or(self.duplicate_handling),
            save_receptor: over.save_receptor.or(self.save_receptor),
            receptor_file: over.receptor_file.or(self.receptor_file),
            add_interactions: over.add_interactions.or(self.add_interactions),
            interaction_cutoffs: over.interaction_cutoffs.or(self.interaction_cutoffs),
            interaction_tolerance: over.interaction_tolerance.or(self.interaction_tolerance),
            max_poses: over.max_poses.or(self.max_poses),
            store_all_poses: over.store_all_poses.or(self.store_all_poses),

            log: over.log.or(self.log),
            out_fields: over.out_fields.or(self.out_fields),
            order_results: over.order_results.or(self.order_results),
            all_poses: over.all_poses.or(self.all_poses),
            export_bookmark_csv: over.export_bookmark_csv.or(self.export_bookmark_csv),
            export_query_csv: over.export_query_csv.or(self.export_query_csv),
            export_sdf_path: over.export_sdf_path.or(self.export_sdf_path),
            export_bookmark_db: over.export_bookmark_db.or(self.export_bookmark_db),
            new_data_from_bookmark: over.new_data_from_bookmark.or(self.new_data_from_bookmark),
            filter_bookmark: over.filter_bookmark.or(self.filter_bookmark),
            plot: over.plot.or(self.plot),

            eworst: over.eworst.or(self.eworst),
            ebest: over.ebest.or(self.ebest),
            leworst: over.leworst.or(self.leworst),
            lebest: over.lebest.or(self.lebest),
            energy_percentile: over.energy_percentile.or(self.energy_percentile),
            le_percentile: over.le_percentile.or(self.le_percentile),

            name: over.name.or(self.name),
            substructure: over.substructure.or(self.substructure),
            substructure_join: over.substructure_join.or(self.substructure_join),

            van_der_waals: over.van_der_waals.or(self.van_der_waals),
            hydrogen_bond: over.hydrogen_bond.or(self.hydrogen_bond),
            reactive_res: over.reactive_res.or(self.reactive_res),
            hb_count: over.hb_count.or(self.hb_count),
            react_any: over.react_any.or(self.react_any),
            max_miss: over.max_miss.or(self.max_miss),
        }
    }

    /// Defaults, then each layer in increasing priority.
    pub fn merged<I>(layers: I) -> RawOptions
    where
        I: IntoIterator<Item = RawOptions>,
    {
        layers
            .into_iter()
            .fold(RawOptions::defaults(), RawOptions::layer)
    }
}
