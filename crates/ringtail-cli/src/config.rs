mod file;
mod overrides;
pub mod selectivity;

use crate::cli::CommonArgs;
use crate::error::{CliError, Result};
use ringtail::engine::options::RawOptions;
use serde_json::{Map, Value};
use tracing::debug;

// Keys whose values are lists; a single --set value becomes a one-element list.
const LIST_KEYS: &[&str] = &[
    "file",
    "file_path",
    "file_list",
    "name",
    "substructure",
    "van_der_waals",
    "hydrogen_bond",
    "reactive_res",
];

// Keys whose values are always taken verbatim, even when they look like JSON.
const STRING_KEYS: &[&str] = &[
    "mode",
    "input_db",
    "bookmark_name",
    "pattern",
    "output_db",
    "duplicate_handling",
    "receptor_file",
    "interaction_cutoffs",
    "log",
    "out_fields",
    "order_results",
    "export_bookmark_csv",
    "export_query_csv",
    "export_sdf_path",
    "filter_bookmark",
    "substructure_join",
];

/// Builds the merged option set for `write` and `read`.
///
/// Layers, lowest priority first: built-in defaults, the config file, `--set`
/// values, then explicit command line flags.
pub fn merge_layers(common: &CommonArgs, cli_layer: RawOptions) -> Result<RawOptions> {
    let file_layer = match &common.config {
        Some(path) => file::load(path)?,
        None => RawOptions::default(),
    };
    let set_layer = parse_set_values(&common.set_values)?;
    let merged = RawOptions::merged([file_layer, set_layer, cli_layer]);
    debug!("Merged raw options: {:?}", merged);
    Ok(merged)
}

fn parse_set_values(set_values: &[String]) -> Result<RawOptions> {
    let mut overlay = Map::new();
    for kv_pair in set_values {
        let (key, raw) = kv_pair.split_once('=').ok_or_else(|| {
            CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            ))
        })?;
        let key = key.trim().replace('-', "_");
        let value = if LIST_KEYS.contains(&key.as_str()) {
            match serde_json::from_str::<Value>(raw) {
                Ok(Value::Array(items)) => {
                    Value::Array(items.into_iter().map(scalar_as_string).collect())
                }
                _ => Value::Array(vec![Value::String(raw.to_string())]),
            }
        } else if STRING_KEYS.contains(&key.as_str()) {
            Value::String(raw.to_string())
        } else {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        };
        overlay.insert(key, value);
    }
    if overlay.is_empty() {
        return Ok(RawOptions::default());
    }

    let layer: RawOptions = serde_json::from_value(Value::Object(overlay.clone()))
        .map_err(|e| CliError::Config(format!("Invalid --set value: {}", e)))?;

    let known = serde_json::to_value(&layer).map_err(anyhow::Error::from)?;
    if let Some(unknown) = overlay
        .keys()
        .find(|key| known.get(key.as_str()).is_none())
    {
        return Err(CliError::Config(format!(
            "Unsupported configuration key for --set: '{}'",
            unknown
        )));
    }
    Ok(layer)
}

fn scalar_as_string(item: Value) -> Value {
    match item {
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        other => other,
    }
}
