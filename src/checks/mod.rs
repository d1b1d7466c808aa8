//! Pre- and post-flight checks on the inputs and outputs of a run.
//!
//! Nothing here logs-and-exits: every check hands back a value and the
//! caller decides what it means for the process.

pub mod gate;
pub mod inchi;
pub mod scope;
pub mod sink;

use crate::core::retcode::RetCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a check refused its input.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("could not open {path:?}: {source}")]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("header must start with Name,InChI (found {0:?})")]
    MalformedHeader(Vec<String>),

    #[error("'{0}' is not a valid InChI notation")]
    MalformedInchi(String),

    #[error("sink file is not well-formed at row {0}")]
    SinkMalformed(usize),
}

impl CheckError {
    pub fn retcode(&self) -> RetCode {
        match self {
            CheckError::FileNotFound { .. } => RetCode::FileNotFound,
            CheckError::MalformedHeader(_) | CheckError::MalformedInchi(_) => RetCode::InChI,
            CheckError::SinkMalformed(_) => RetCode::SinkFileMalformed,
        }
    }
}
