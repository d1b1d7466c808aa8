use crate::core::params::FilePaths;
use anyhow::{Context, Result};
use knime_rust::archive::extract_gz;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// True when the file content is a gzip stream, whatever its extension.
pub fn is_gzip(path: &Path) -> Result<bool> {
    let kind = infer::get_from_path(path).with_context(|| format!("Could not read {:?}", path))?;
    Ok(kind.map_or(false, |k| k.mime_type() == "application/gzip"))
}

/// Inflates a gzip file into `indir` as `<file name>.csv`.
pub fn gunzip_to_csv(path: &Path, indir: &Path) -> Result<PathBuf> {
    let output = indir.join(with_csv_suffix(path));
    extract_gz(path, &output).with_context(|| format!("Could not inflate {:?}", path))?;
    Ok(output)
}

/// Prepares the input files the way KNIME expects them.
///
/// Gzipped rules are inflated into `indir`, then every input lacking a
/// `.csv` extension is copied into `indir` under `<file name>.csv`, since
/// the workflow only accepts that extension.
pub fn format_files(sink: &Path, source: &Path, rules: &Path, indir: &Path, outdir: &Path) -> Result<FilePaths> {
    info!("   |- Formatting files for KNIME");

    let rules = if is_gzip(rules)? {
        gunzip_to_csv(rules, indir)?
    } else {
        rules.to_path_buf()
    };

    let mut files = FilePaths::new(
        std::path::absolute(sink)?,
        std::path::absolute(source)?,
        std::path::absolute(rules)?,
        std::path::absolute(outdir)?,
    );

    for input in files.inputs_mut() {
        if input.extension().map_or(true, |ext| ext != "csv") {
            let renamed = indir.join(with_csv_suffix(input));
            fs::copy(&*input, &renamed).with_context(|| format!("Could not copy {:?} to {:?}", input, renamed))?;
            debug!("{:?} -> {:?}", input, renamed);
            *input = renamed;
        }
    }

    Ok(files)
}

fn with_csv_suffix(path: &Path) -> OsString {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".csv");
    name
}
