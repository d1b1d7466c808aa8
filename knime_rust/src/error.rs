use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised while locating, installing or running the KNIME platform.
#[derive(Debug, Error)]
pub enum KnimeError {
    #[error("KNIME executable not found under {0:?}")]
    ExecutableNotFound(PathBuf),

    #[error("failed to spawn {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("command {program:?} exited with {status}")]
    CommandFailed { program: PathBuf, status: String },

    #[error("unsupported KNIME version '{0}'")]
    UnsupportedVersion(String),

    #[error("installation failed: {0}")]
    Install(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}
