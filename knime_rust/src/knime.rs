use crate::error::KnimeError;
use crate::preference::Preference;
use std::collections::BTreeSet;
use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use wait_timeout::ChildExt;
use walkdir::WalkDir;

const BATCH_APPLICATION: &str = "org.knime.product.KNIME_BATCH_APPLICATION";

// ============================================================================
// WORKFLOW VARIABLES
// ============================================================================

/// Type tag KNIME expects after a workflow variable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Int,
    String,
}

impl VariableKind {
    fn as_str(self) -> &'static str {
        match self {
            VariableKind::Int => "int",
            VariableKind::String => "String",
        }
    }
}

/// One `-workflow.variable=<name>,"<value>",<type>` entry of a batch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowVariable {
    pub name: String,
    pub value: String,
    pub kind: VariableKind,
}

impl WorkflowVariable {
    pub fn int(name: &str, value: impl fmt::Display) -> Self {
        Self { name: name.to_string(), value: value.to_string(), kind: VariableKind::Int }
    }

    pub fn string(name: &str, value: impl Into<String>) -> Self {
        Self { name: name.to_string(), value: value.into(), kind: VariableKind::String }
    }

    /// String variable holding a path, normalised for the KNIME command line.
    pub fn path(name: &str, path: &Path) -> Self {
        Self::string(name, standardize_path(path))
    }

    pub fn to_arg(&self) -> String {
        format!("-workflow.variable={},\"{}\",{}", self.name, self.value, self.kind.as_str())
    }
}

// ============================================================================
// PLATFORM HANDLE
// ============================================================================

/// How a batch run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
    /// The process exited on its own; `-1` when killed by a signal.
    Completed(i32),
    /// The time limit expired and the process was killed.
    TimedOut(Duration),
}

/// A KNIME installation plus the workflow it should execute.
#[derive(Debug, Clone)]
pub struct Knime {
    pub kinstall: PathBuf,
    pub workflow: PathBuf,
    pub kexec: Option<PathBuf>,
}

impl Knime {
    /// Looks for an executable below `kinstall`.
    pub fn new(kinstall: impl Into<PathBuf>, workflow: impl Into<PathBuf>) -> Self {
        let kinstall = kinstall.into();
        let kexec = find_executable(&kinstall);
        Self { kinstall, workflow: workflow.into(), kexec }
    }

    /// Uses an explicitly provided executable instead of the discovered one.
    pub fn with_kexec(mut self, kexec: impl Into<PathBuf>) -> Self {
        self.kexec = Some(kexec.into());
        self
    }

    pub fn is_installed(&self) -> bool {
        self.kexec.as_deref().map_or(false, Path::is_file)
    }

    /// Arguments of a batch run, without the executable itself.
    pub fn batch_args(&self, variables: &[WorkflowVariable], preference: Option<&Preference>) -> Vec<String> {
        let mut args: Vec<String> = [
            "-nosplash",
            "-nosave",
            "-reset",
            "-consoleLog",
            "--launcher.suppressErrors",
            "-application",
            BATCH_APPLICATION,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(format!("-workflowFile={}", standardize_path(&self.workflow)));
        args.extend(variables.iter().map(WorkflowVariable::to_arg));
        if let Some(pref) = preference.filter(|p| p.is_init()) {
            args.push(format!("-preferences={}", standardize_path(&pref.path)));
        }
        args
    }

    /// Runs the workflow in batch mode, waiting at most `timeout` when given.
    pub fn call(
        &self,
        variables: &[WorkflowVariable],
        preference: Option<&Preference>,
        timeout: Option<Duration>,
    ) -> Result<Invocation, KnimeError> {
        let kexec = self
            .kexec
            .as_ref()
            .filter(|p| p.exists())
            .ok_or_else(|| KnimeError::ExecutableNotFound(self.kinstall.clone()))?;

        if let Some(pref) = preference.filter(|p| p.is_init()) {
            pref.to_file()?;
        }

        let args = self.batch_args(variables, preference);
        info!("Running KNIME...");
        debug!("{} {}", kexec.display(), args.join(" "));

        let mut cmd = Command::new(kexec);
        cmd.args(&args);

        // libGraphMolWrap (RDKit) has to find the conda libfreetype
        let conda_prefix = env::var_os("CONDA_PREFIX").map(PathBuf::from);
        let current = env::var_os("LD_LIBRARY_PATH");
        if let Some(ld) = library_path_shim(conda_prefix.as_deref(), current.as_deref()) {
            cmd.env("LD_LIBRARY_PATH", ld);
        }

        if !tracing::enabled!(tracing::Level::DEBUG) {
            cmd.stdout(Stdio::null());
            cmd.stderr(Stdio::null());
        }

        let mut child = cmd
            .spawn()
            .map_err(|source| KnimeError::Spawn { program: kexec.clone(), source })?;

        // A limit past the clock's range is no limit.
        let timeout = timeout.filter(|d| Instant::now().checked_add(*d).is_some());
        let invocation = match timeout {
            Some(duration) => match child.wait_timeout(duration)? {
                Some(status) => Invocation::Completed(status.code().unwrap_or(-1)),
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    Invocation::TimedOut(duration)
                }
            },
            None => Invocation::Completed(child.wait()?.code().unwrap_or(-1)),
        };
        debug!(?invocation, "KNIME returned");
        Ok(invocation)
    }
}

impl fmt::Display for Knime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "workflow: {}", self.workflow.display())?;
        writeln!(f, "kinstall: {}", self.kinstall.display())?;
        match &self.kexec {
            Some(kexec) => write!(f, "kexec: {}", kexec.display()),
            None => write!(f, "kexec: "),
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// KNIME wants forward slashes on its command line, Windows paths included.
pub fn standardize_path(path: &Path) -> String {
    let s = path.to_string_lossy().into_owned();
    if cfg!(windows) {
        s.replace('\\', "/")
    } else {
        s
    }
}

/// `LD_LIBRARY_PATH` for the child when running inside a conda environment.
///
/// Returns `None` outside conda, leaving the inherited value untouched.
pub fn library_path_shim(conda_prefix: Option<&Path>, current: Option<&OsStr>) -> Option<OsString> {
    let prefix = conda_prefix?;
    let mut parts: Vec<PathBuf> = current
        .map(|c| env::split_paths(c).filter(|p| !p.as_os_str().is_empty()).collect())
        .unwrap_or_default();
    parts.push(prefix.join("lib"));
    parts.push(prefix.join("x86_64-conda-linux-gnu/sysroot/usr/lib64"));
    env::join_paths(parts).ok()
}

/// First executable file below `dir` whose name contains "knime".
pub fn find_executable(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().to_lowercase().contains("knime"))
        .find(|e| is_executable(e.path()))
        .map(|e| fs::canonicalize(e.path()).unwrap_or_else(|_| e.path().to_path_buf()))
}

/// The bundle pool directory (`p2`) of an installation.
pub fn find_p2_dir(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .find(|e| e.file_type().is_dir() && e.file_name() == "p2")
        .map(|e| fs::canonicalize(e.path()).unwrap_or_else(|_| e.path().to_path_buf()))
}

/// Names of the directories directly under `dir`.
pub fn collect_top_level_dirs(dir: &Path) -> Result<BTreeSet<String>, KnimeError> {
    let mut names = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).map(|m| m.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("exe"))
}
