// ============================================================================
// MODULE DECLARATIONS
// ============================================================================
pub mod checks;
pub mod core;
pub mod io;

// ============================================================================
// RE-EXPORTS (Public API)
// ============================================================================
pub use crate::checks::gate::check_input;
pub use crate::checks::inchi::{check_inchi_from_file, is_valid_inchi};
pub use crate::checks::scope::check_scope;
pub use crate::checks::sink::{check_src_in_sink_derived, check_src_in_sink_exact};
pub use crate::checks::CheckError;
pub use crate::core::params::{FilePaths, Rp2Params, StdHydrogen};
pub use crate::core::retcode::RetCode;
pub use knime_rust::{Invocation, Knime, KnimeError, Preference};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::core::defaults;
use crate::io::{format, rules};

// ============================================================================
// HIGH-LEVEL INTERFACE
// ============================================================================

/// Everything one RetroPath2.0 run needs besides the KNIME handle.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub sink_file: PathBuf,
    pub source_file: PathBuf,
    pub rules_file: PathBuf,
    pub outdir: PathBuf,
    pub params: Rp2Params,
    /// RDKit MCS aggregation time limit, in minutes; 0 leaves KNIME's default.
    pub msc_timeout: u32,
    /// Wall-clock limit of the whole KNIME run.
    pub timeout: Option<Duration>,
}

impl RunConfig {
    pub fn new(sink_file: PathBuf, source_file: PathBuf, rules_file: PathBuf, outdir: PathBuf) -> Self {
        Self {
            sink_file,
            source_file,
            rules_file,
            outdir,
            params: Rp2Params::default(),
            msc_timeout: defaults::MSC_TIMEOUT,
            timeout: None,
        }
    }
}

/// Result of [`retropath2`]: the code plus the files KNIME was given, when it got that far.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub code: RetCode,
    pub files: Option<FilePaths>,
}

/// Runs the RetroPath2.0 workflow on checked and formatted inputs.
///
/// A run that hits `config.timeout` is not fatal: whatever KNIME wrote so
/// far is still inspected, and the outcome is `Timeout` unless the
/// source-in-sink report says the source was already available.
pub fn retropath2(config: &RunConfig, knime: &Knime) -> Result<RunOutcome> {
    debug!(?config, "retropath2");
    debug!("knime:\n{}", knime);

    // 1. Input gate
    let (code, inchi) = check_input(&config.source_file, &config.sink_file);
    let Some(inchi) = inchi else {
        return Ok(RunOutcome { code, files: None });
    };
    debug!("source: {}", inchi);

    // 2. Hydrogen representation of the rules
    if !config.rules_file.is_file() {
        error!("Rules file not found: {:?}", config.rules_file);
        return Ok(RunOutcome { code: RetCode::FileNotFound, files: None });
    }
    let mut params = config.params.clone();
    if params.std_hydrogen == StdHydrogen::Auto {
        params.std_hydrogen = rules::sniff_rules(&config.rules_file)?;
    }
    debug!(?params, "rp2_params");

    if !knime.is_installed() {
        error!("KNIME executable not found under {:?}", knime.kinstall);
        return Ok(RunOutcome { code: RetCode::KnimeInstall, files: None });
    }
    if !knime.workflow.is_file() {
        error!("Workflow file not found: {:?}", knime.workflow);
        return Ok(RunOutcome { code: RetCode::FileNotFound, files: None });
    }

    info!("Initializing");
    let tempdir = tempfile::tempdir().context("Could not create a temporary directory")?;

    // 3. Files
    let files = format::format_files(
        &config.sink_file,
        &config.source_file,
        &config.rules_file,
        tempdir.path(),
        &config.outdir,
    )?;
    debug!(?files, "files");
    fs::create_dir_all(&files.outdir).with_context(|| format!("Could not create {:?}", files.outdir))?;

    // 4. KNIME
    let msc_timeout = Some(config.msc_timeout).filter(|m| *m > 0);
    let preference = Preference::new(tempdir.path().join(defaults::PREFERENCE_FILE), msc_timeout);
    let variables = params.workflow_variables(&files);

    let timed_out = match knime.call(&variables, Some(&preference), config.timeout) {
        Ok(Invocation::Completed(status)) => {
            if status != 0 {
                warn!("KNIME exited with status {}", status);
            }
            false
        }
        Ok(Invocation::TimedOut(limit)) => {
            warn!("      |- Time limit ({:?}) reached", limit);
            true
        }
        Err(e @ KnimeError::ExecutableNotFound(_)) => {
            error!("{}", e);
            return Ok(RunOutcome { code: RetCode::KnimeInstall, files: Some(files) });
        }
        Err(e) => {
            error!("{}", e);
            return Ok(RunOutcome { code: RetCode::OsError, files: Some(files) });
        }
    };
    info!("OK");

    // 5. Source in sink, as judged by the workflow
    let code = match check_src_in_sink_derived(&files.src_in_sink_path()) {
        RetCode::SrcInSink => RetCode::SrcInSink,
        _ if timed_out => RetCode::Timeout,
        code => code,
    };

    Ok(RunOutcome { code, files: Some(files) })
}
