use crate::error::KnimeError;
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;

/// Unpacks a `.tar.gz` archive into `dest`.
pub fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<(), KnimeError> {
    let file = File::open(archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    tar.set_preserve_permissions(true);
    tar.unpack(dest)?;
    Ok(())
}

/// Unpacks a `.zip` archive into `dest`.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<(), KnimeError> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))?;
    zip.extract(dest)?;
    Ok(())
}

/// Inflates a single-member gzip file into `dest_file`.
pub fn extract_gz(archive: &Path, dest_file: &Path) -> Result<(), KnimeError> {
    if let Some(parent) = dest_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut decoder = GzDecoder::new(BufReader::new(File::open(archive)?));
    let mut out = File::create(dest_file)?;
    io::copy(&mut decoder, &mut out)?;
    Ok(())
}
