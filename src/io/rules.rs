use crate::core::params::StdHydrogen;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::info;

const SNIFF_LINES: usize = 10;
const EXPLICIT_HYDROGEN_PATTERNS: &[&str] = &["[#1"];

/// Guesses how hydrogens are written in a rules file from its first lines.
///
/// Handles plain text, `.gz`, `.tar`/`.tar.gz` (first regular member) and
/// `.zip` (first member whose name does not start with `_`).
pub fn sniff_rules(path: &Path) -> Result<StdHydrogen> {
    let name = path.to_string_lossy();
    let open = || File::open(path).with_context(|| format!("Could not open rules file: {:?}", path));

    let lines = if name.ends_with(".gz") && !name.ends_with(".tar.gz") {
        head_lines(GzDecoder::new(open()?))
    } else if name.ends_with(".tar") || name.ends_with(".tar.gz") {
        let reader: Box<dyn Read> = if name.ends_with(".gz") {
            Box::new(GzDecoder::new(open()?))
        } else {
            Box::new(open()?)
        };
        first_tar_member(reader)?
    } else if name.ends_with(".zip") {
        first_zip_member(open()?)?
    } else {
        head_lines(open()?)
    };

    Ok(classify(&lines))
}

/// `Explicit` as soon as one line carries an explicit hydrogen atom.
pub fn classify(lines: &[String]) -> StdHydrogen {
    let explicit = lines
        .iter()
        .any(|line| EXPLICIT_HYDROGEN_PATTERNS.iter().any(|p| line.contains(p)));
    if explicit {
        info!("Detect explicit hydrogens in reaction rules");
        StdHydrogen::Explicit
    } else {
        info!("Detect implicit hydrogen in reaction rules");
        StdHydrogen::Implicit
    }
}

fn head_lines(reader: impl Read) -> Vec<String> {
    BufReader::new(reader)
        .split(b'\n')
        .take(SNIFF_LINES)
        .map_while(Result::ok)
        .map(|bytes| String::from_utf8_lossy(&bytes).trim_end().to_string())
        .collect()
}

fn first_tar_member(reader: impl Read) -> Result<Vec<String>> {
    let mut archive = tar::Archive::new(reader);
    for entry in archive.entries().context("Could not read tar archive")? {
        let entry = entry.context("Could not read tar entry")?;
        if entry.header().entry_type().is_file() {
            return Ok(head_lines(entry));
        }
    }
    Ok(Vec::new())
}

fn first_zip_member(file: File) -> Result<Vec<String>> {
    let mut zip = zip::ZipArchive::new(BufReader::new(file)).context("Could not read zip archive")?;
    for i in 0..zip.len() {
        let member = zip.by_index(i)?;
        if member.name().starts_with('_') || member.is_dir() {
            continue;
        }
        return Ok(head_lines(member));
    }
    Ok(Vec::new())
}
