use super::CheckError;
use crate::io::table::{open_table, CompoundRecord};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    // InChI=1[S]/<formula>[/<other layers>]
    // The formula layer is the only mandatory one: letters, each run
    // optionally followed by a count.
    static ref RE_INCHI: Regex =
        Regex::new(r"^InChI=1S?/(?:[A-Za-z]+\d*)+(?:/.+)?$").expect("valid InChI pattern");
}

/// Structural check of an InChI string (no chemistry involved).
pub fn is_valid_inchi(inchi: &str) -> bool {
    RE_INCHI.is_match(inchi)
}

/// Reads the InChI of the first compound of a `Name,InChI` table.
///
/// The header is compared on its first two fields, trimmed and
/// case-insensitively. The returned InChI is only stripped of surrounding
/// whitespace.
pub fn check_inchi_from_file(path: &Path) -> Result<String, CheckError> {
    let mut reader = open_table(path).map_err(|source| CheckError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let mut records = reader.records();

    let header = match records.next() {
        Some(Ok(header)) => header,
        _ => return Err(CheckError::MalformedHeader(Vec::new())),
    };
    let columns: Vec<String> = header.iter().take(2).map(|f| f.trim().to_lowercase()).collect();
    if columns != ["name", "inchi"] {
        return Err(CheckError::MalformedHeader(header.iter().map(str::to_string).collect()));
    }

    let compound = match records.next() {
        Some(Ok(row)) => CompoundRecord::from_record(&row),
        _ => None,
    }
    .ok_or_else(|| CheckError::MalformedInchi(String::new()))?;

    let inchi = compound.inchi.trim();
    if !is_valid_inchi(inchi) {
        return Err(CheckError::MalformedInchi(inchi.to_string()));
    }
    Ok(inchi.to_string())
}
