//! Installation of KNIME and the plugins the RetroPath2.0 workflow needs.
//!
//! Archives are taken from the Zenodo records that mirror the KNIME
//! downloads: one platform archive per OS plus the update-site zips that
//! the p2 director installs plugins from.

use crate::archive::{extract_tar_gz, extract_zip};
use crate::error::KnimeError;
use crate::knime::{collect_top_level_dirs, find_executable, find_p2_dir, Knime};
use glob::glob;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub const ZENODO_API: &str = "https://zenodo.org/api/";
pub const DEFAULT_VERSION: &str = "4.6.4";
pub const SUPPORTED_VERSIONS: [&str; 2] = ["4.6.4", "4.7.0"];

pub const PLUGINS: &[&str] = &[
    "org.eclipse.equinox.preferences",
    "org.knime.chem.base",
    "org.knime.datageneration",
    "org.knime.features.chem.types.feature.group",
    "org.knime.features.datageneration.feature.group",
    "org.knime.features.python.feature.group",
    "org.knime.python.nodes",
    "org.rdkit.knime.feature.feature.group",
    "org.rdkit.knime.nodes",
];

lazy_static! {
    static ref RE_VERSION: Regex = Regex::new(r"\d+\.\d+\.\d+").expect("valid version pattern");
}

/// Zenodo record holding the archives of a KNIME version.
pub fn zenodo_record(kver: &str) -> Option<&'static str> {
    match kver {
        "4.6.4" => Some("7515771"),
        "4.7.0" => Some("7564938"),
        _ => None,
    }
}

// ============================================================================
// HOST PLATFORM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Linux,
    MacOs,
    Windows,
}

impl HostOs {
    pub fn current() -> Option<Self> {
        if cfg!(target_os = "linux") {
            Some(HostOs::Linux)
        } else if cfg!(target_os = "macos") {
            Some(HostOs::MacOs)
        } else if cfg!(windows) {
            Some(HostOs::Windows)
        } else {
            None
        }
    }

    /// Token identifying this platform in KNIME archive names.
    pub fn archive_marker(self) -> &'static str {
        match self {
            HostOs::Linux => "linux",
            HostOs::MacOs => "macosx",
            HostOs::Windows => "win32",
        }
    }
}

// ============================================================================
// ZENODO
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ZenodoRecord {
    pub files: Vec<ZenodoFile>,
}

#[derive(Debug, Deserialize)]
pub struct ZenodoFile {
    pub key: String,
    pub links: ZenodoLinks,
}

#[derive(Debug, Deserialize)]
pub struct ZenodoLinks {
    #[serde(rename = "self")]
    pub download: String,
}

pub fn zenodo_show_repo(kver: &str) -> Result<ZenodoRecord, KnimeError> {
    let id = zenodo_record(kver).ok_or_else(|| KnimeError::UnsupportedVersion(kver.to_string()))?;
    let url = format!("{}records/{}", ZENODO_API, id);
    let response = reqwest::blocking::get(&url)?;
    if response.status().as_u16() > 202 {
        return Err(KnimeError::Install(response.text()?));
    }
    Ok(response.json()?)
}

/// Downloads every file of the record for `kver` into `dir`.
pub fn download_from_zenodo(dir: &Path, kver: &str) -> Result<Vec<PathBuf>, KnimeError> {
    let record = zenodo_show_repo(kver)?;
    let mut downloaded = Vec::with_capacity(record.files.len());
    for file in record.files {
        let output = dir.join(&file.key);
        info!("Download: {} to {}", file.links.download, output.display());
        download(&file.links.download, &output)?;
        downloaded.push(output);
    }
    Ok(downloaded)
}

fn download(url: &str, dest: &Path) -> Result<(), KnimeError> {
    let mut response = reqwest::blocking::get(url)?.error_for_status()?;
    let mut out = fs::File::create(dest)?;
    response.copy_to(&mut out)?;
    Ok(())
}

// ============================================================================
// INSTALLATION
// ============================================================================

/// Installs KNIME into `kinstall` from the archives found in `archive_dir`.
///
/// `archive_dir` must hold the content of a Zenodo record: the platform
/// archives (`knime_<ver>.linux...tar.gz`, `.dmg`, `.win32...zip`) and the
/// update-site zips used as plugin repositories.
pub fn install(kinstall: &Path, archive_dir: &Path) -> Result<Knime, KnimeError> {
    let files = list_files(archive_dir)?;
    let host = HostOs::current().ok_or_else(|| KnimeError::Install("unsupported platform".into()))?;

    // 1. Platform
    let dirs_before = collect_top_level_dirs(kinstall)?;
    let archive = files
        .iter()
        .find(|f| file_name(f).contains(host.archive_marker()))
        .ok_or_else(|| {
            KnimeError::Install(format!("no '{}' archive in {}", host.archive_marker(), archive_dir.display()))
        })?;
    info!("Installing {} into {}", archive.display(), kinstall.display());
    match host {
        HostOs::Linux => extract_tar_gz(archive, kinstall)?,
        HostOs::MacOs => install_dmg(archive, kinstall)?,
        HostOs::Windows => extract_zip(archive, kinstall)?,
    }
    let dirs_after = collect_top_level_dirs(kinstall)?;
    let mut new_dirs: Vec<&String> = dirs_after.difference(&dirs_before).collect();
    if new_dirs.len() != 1 {
        return Err(KnimeError::Install(format!(
            "expected exactly one new directory in {}, found {:?}",
            kinstall.display(),
            new_dirs
        )));
    }
    let destination = kinstall.join(new_dirs.remove(0));

    // 2. Plugins
    let repositories: Vec<PathBuf> = files
        .iter()
        .filter(|f| {
            let name = file_name(f);
            name.contains("org.knime.update") || name.contains("TrustedCommunity")
        })
        .map(|f| fs::canonicalize(f).unwrap_or_else(|_| f.clone()))
        .collect();

    let kexec = find_executable(kinstall).ok_or_else(|| KnimeError::ExecutableNotFound(kinstall.to_path_buf()))?;
    let p2_dir = find_p2_dir(kinstall).ok_or_else(|| KnimeError::Install("p2 directory not found after installation".into()))?;
    let destination = fs::canonicalize(&destination).unwrap_or(destination);

    let args = p2_director_args(&repositories, &p2_dir, &destination);
    debug!("{} {}", kexec.display(), args.join(" "));
    let status = Command::new(&kexec)
        .args(&args)
        .status()
        .map_err(|source| KnimeError::Spawn { program: kexec.clone(), source })?;
    if !status.success() {
        warn!("p2 director exited with {}", status);
    }

    Ok(Knime::new(kinstall, PathBuf::new()))
}

/// Arguments of the p2 director call installing [`PLUGINS`].
pub fn p2_director_args(repositories: &[PathBuf], p2_dir: &Path, destination: &Path) -> Vec<String> {
    let repositories = repositories
        .iter()
        .map(|r| format!("jar:file:{}!/", r.display()))
        .collect::<Vec<_>>()
        .join(",");
    vec![
        "-nosplash".into(),
        "-consoleLog".into(),
        "-application".into(),
        "org.eclipse.equinox.p2.director".into(),
        "-repository".into(),
        repositories,
        "-bundlepool".into(),
        p2_dir.display().to_string(),
        "-destination".into(),
        destination.display().to_string(),
        "-i".into(),
        PLUGINS.join(","),
    ]
}

/// Downloads the archives of `kver` and installs them into `kinstall`.
pub fn install_online(kinstall: &Path, kver: &str) -> Result<Knime, KnimeError> {
    fs::create_dir_all(kinstall)?;
    let tempdir = tempfile::tempdir()?;
    download_from_zenodo(tempdir.path(), kver)?;
    install(kinstall, tempdir.path())
}

/// Installs from a Zenodo "Download all" zip already on disk.
pub fn install_local(kinstall: &Path, zenodo_zip: &Path) -> Result<Knime, KnimeError> {
    fs::create_dir_all(kinstall)?;
    let tempdir = tempfile::tempdir()?;
    extract_zip(zenodo_zip, tempdir.path())?;
    install(kinstall, tempdir.path())
}

/// Copies the application bundle out of a mounted disk image.
fn install_dmg(dmg: &Path, kinstall: &Path) -> Result<(), KnimeError> {
    let name = file_name(dmg);
    let kver = RE_VERSION
        .find(&name)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| KnimeError::Install(format!("version can not be guessed from filename: {}", name)))?;

    let app_path = kinstall.join(format!("KNIME_{}.app", kver));
    if app_path.exists() {
        fs::remove_dir_all(&app_path)?;
    }

    let hdiutil = which::which("hdiutil").map_err(|e| KnimeError::Install(e.to_string()))?;
    let tempdir = tempfile::tempdir()?;
    let mountpoint = tempdir.path().join("KNIME");
    run_checked(&hdiutil, &[
        OsStr::new("mount"),
        OsStr::new("-noverify"),
        dmg.as_os_str(),
        OsStr::new("-mountpoint"),
        mountpoint.as_os_str(),
    ])?;
    let copied = copy_dir(&mountpoint.join(format!("KNIME {}.app", kver)), &app_path);
    run_checked(&hdiutil, &[OsStr::new("unmount"), mountpoint.as_os_str()])?;
    copied
}

fn run_checked(program: &Path, args: &[&OsStr]) -> Result<(), KnimeError> {
    debug!("{} {:?}", program.display(), args);
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| KnimeError::Spawn { program: program.to_path_buf(), source })?;
    if !status.success() {
        return Err(KnimeError::CommandFailed { program: program.to_path_buf(), status: status.to_string() });
    }
    Ok(())
}

fn copy_dir(src: &Path, dest: &Path) -> Result<(), KnimeError> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| KnimeError::Install(e.to_string()))?;
        let relative = entry.path().strip_prefix(src).map_err(|e| KnimeError::Install(e.to_string()))?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>, KnimeError> {
    let pattern = dir.join("*");
    let pattern = pattern.to_string_lossy();
    let mut files: Vec<PathBuf> = glob(&pattern)
        .map_err(|e| KnimeError::Install(e.to_string()))?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}
