use anyhow::{Context, Result};
use csv::{QuoteStyle, Reader, ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::io;
use std::path::Path;

/// A `(name, InChI)` row of a compound table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundRecord {
    pub name: String,
    pub inchi: String,
}

impl CompoundRecord {
    /// Reads the first two fields of a row; `None` when the row is shorter.
    pub fn from_record(record: &StringRecord) -> Option<Self> {
        Some(Self {
            name: record.get(0)?.to_string(),
            inchi: record.get(1)?.to_string(),
        })
    }
}

/// Opens a comma-separated, double-quoted table.
///
/// Header handling is left to the caller: every row, the first included,
/// comes back as a record, and rows may have different lengths.
pub fn open_table(path: &Path) -> io::Result<Reader<File>> {
    let file = File::open(path)?;
    Ok(ReaderBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .has_headers(false)
        .flexible(true)
        .from_reader(file))
}

/// Reads every row as a compound, skipping the first one when `has_header`.
pub fn read_compounds(path: &Path, has_header: bool) -> Result<Vec<CompoundRecord>> {
    let mut reader = open_table(path).with_context(|| format!("Could not open table: {:?}", path))?;
    let mut compounds = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed row {} in {:?}", idx + 1, path))?;
        if has_header && idx == 0 {
            continue;
        }
        let compound = CompoundRecord::from_record(&record)
            .with_context(|| format!("Row {} of {:?} has fewer than two fields", idx + 1, path))?;
        compounds.push(compound);
    }
    Ok(compounds)
}

/// Writes a one-compound source table (`Name,InChI` header plus one row).
pub fn write_source(path: &Path, name: &str, inchi: &str) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)
        .with_context(|| format!("Could not create source file: {:?}", path))?;
    wtr.write_record(["Name", "InChI"])?;
    wtr.write_record([name, inchi.trim()])?;
    wtr.flush()?;
    Ok(())
}
