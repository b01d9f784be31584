//! File handling for the converters.

use std::path::{Path, PathBuf};

use blobtrace_export::ExportError;
use blobtrace_pipeline::PipelineError;

/// Errors reported by the command-line tool.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// An input file could not be read.
    #[error("error reading {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The output file could not be written.
    #[error("error writing {}: {source}", path.display())]
    Write {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// `--config-json` is not a valid configuration.
    #[error("error parsing --config-json: {0}")]
    ConfigJson(#[from] serde_json::Error),

    /// A converter failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The result could not be serialized.
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Read a whole input file.
pub fn read_input(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a whole input file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `contents` to `path`, replacing anything already there.
///
/// Called with empty contents before a converter runs so the output
/// file exists even if it fails.
pub fn write_output(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}
