use crate::cli::WriteArgs;
use crate::config;
use crate::error::Result;
use ringtail::engine::config::ResolvedOptions;
use ringtail::engine::options::{RawOptions, RunMode};
use ringtail::engine::resolver;
use tracing::info;

pub fn run(args: WriteArgs) -> Result<()> {
    let resolved = resolve(&args)?;
    super::report_warnings(&resolved.warnings);

    let write = &resolved.write;
    info!(
        "Resolved {} write plan into {} ({})",
        write.mode,
        write.database.display(),
        if write.creates_new_database {
            "new database"
        } else {
            "existing database"
        }
    );
    super::emit_plan(&resolved, args.common.emit.as_deref())
}

fn resolve(args: &WriteArgs) -> Result<ResolvedOptions> {
    info!("Merging configuration from file and CLI arguments...");
    let merged = config::merge_layers(&args.common, RawOptions::from(args))?;
    Ok(resolver::resolve(&merged, RunMode::Write)?)
}
