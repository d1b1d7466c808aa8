use crate::core::retcode::RetCode;
use glob::{glob, Pattern};
use std::path::Path;
use tracing::warn;

/// `NoSolution` unless the workflow wrote at least one `*_scope.csv`.
pub fn check_scope(outdir: &Path) -> RetCode {
    let pattern = format!("{}/*_scope.csv", Pattern::escape(&outdir.to_string_lossy()));
    let found = glob(&pattern)
        .map(|paths| paths.filter_map(Result::ok).next().is_some())
        .unwrap_or(false);
    if found {
        RetCode::Ok
    } else {
        warn!("       Warning: No solution has been found");
        RetCode::NoSolution
    }
}
