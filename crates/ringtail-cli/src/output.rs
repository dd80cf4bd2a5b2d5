use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes the plain-text results log.
pub struct Outputter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Outputter {
    /// Creates (or truncates) the log at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        debug!("Writing results log to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn write_results_bookmark_to_log(&mut self, bookmark_name: &str) -> Result<()> {
        writeln!(self.writer, "Passing results bookmark: {}", bookmark_name)?;
        Ok(())
    }

    pub fn log_num_passing_ligands(&mut self, count: u64) -> Result<()> {
        writeln!(self.writer, "Number passing ligands: {}", count)?;
        writeln!(self.writer, "---------------")?;
        Ok(())
    }

    pub fn write_log<S: AsRef<str>>(&mut self, ligands: &[S]) -> Result<()> {
        writeln!(self.writer, "LigName")?;
        for ligand in ligands {
            writeln!(self.writer, "{}", ligand.as_ref())?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        Ok(self.path)
    }
}
