use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use knime_rust::install::{self, SUPPORTED_VERSIONS};
use retropath2_wrapper::core::defaults;
use retropath2_wrapper::io::table;
use retropath2_wrapper::{check_scope, retropath2, Knime, RetCode, Rp2Params, RunConfig, StdHydrogen};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    Silent,
    Quiet,
}

impl LogLevel {
    fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error | LogLevel::Critical => LevelFilter::ERROR,
            LogLevel::Silent | LogLevel::Quiet => LevelFilter::OFF,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Runs the RetroPath2.0 KNIME workflow to enumerate pathways producing a source compound from a sink"
)]
struct Cli {
    /// Path of file containing metabolites present in the system
    sink_file: PathBuf,

    /// Path of file containing reaction rules
    rules_file: PathBuf,

    /// Folder path where results will be written into
    outdir: PathBuf,

    // --- Input ---
    /// Path of file containing the InChI
    #[arg(long, alias = "source_file", conflicts_with_all = ["source_name", "source_inchi"])]
    source_file: Option<PathBuf>,

    /// Name of compound to produce
    #[arg(long, alias = "source_name")]
    source_name: Option<String>,

    /// InChI of compound to produce
    #[arg(long, alias = "source_inchi", required_unless_present = "source_file")]
    source_inchi: Option<String>,

    // --- KNIME ---
    /// Path to KNIME executable file (KNIME is installed if missing)
    #[arg(long)]
    kexec: Option<PathBuf>,

    /// Folder holding (or receiving) the KNIME installation
    #[arg(long, env = "RP2_KNIME_FOLDER", default_value = "knime")]
    kinstall: PathBuf,

    /// Version of KNIME to install
    #[arg(long, default_value = install::DEFAULT_VERSION, value_parser = clap::builder::PossibleValuesParser::new(SUPPORTED_VERSIONS))]
    kver: String,

    // --- RetroPath2.0 workflow ---
    /// Version of the RetroPath2.0 workflow
    #[arg(long, alias = "rp2_version", default_value = defaults::RP2_VERSION, value_parser = clap::builder::PossibleValuesParser::new(defaults::RP2_VERSIONS))]
    rp2_version: String,

    /// Folder holding the RetroPath2.0_<version>.knwf workflow files
    #[arg(long, env = "RP2_WORKFLOW_DIR", default_value = "workflows")]
    workflow_dir: PathBuf,

    /// Do not use network (no automatic KNIME installation)
    #[arg(long)]
    no_network: bool,

    #[arg(long, alias = "max_steps", default_value_t = defaults::MAX_STEPS)]
    max_steps: u32,

    #[arg(long, default_value_t = defaults::TOPX)]
    topx: u32,

    #[arg(long, default_value_t = defaults::DMIN)]
    dmin: u32,

    #[arg(long, default_value_t = defaults::DMAX)]
    dmax: u32,

    #[arg(long, alias = "mwmax_source", default_value_t = defaults::MWMAX_SOURCE)]
    mwmax_source: u32,

    /// Minutes after which the RDKit MCS Aggregation stops searching for the best match
    #[arg(long, alias = "msc_timeout", default_value_t = defaults::MSC_TIMEOUT)]
    msc_timeout: u32,

    /// How hydrogens are represented in the rules; auto guesses from the rules file
    #[arg(long, alias = "std_hydrogen", value_enum, default_value_t = StdHydrogen::Auto)]
    std_hydrogen: StdHydrogen,

    /// Minutes after which the KNIME run is stopped
    #[arg(long)]
    timeout: Option<u64>,

    // --- Logging ---
    /// Log level, info when neither this nor RUST_LOG is set
    #[arg(long, value_enum, ignore_case = true)]
    log: Option<LogLevel>,

    /// Run silently
    #[arg(long)]
    silent: bool,

    /// Always exit with 0
    #[arg(long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Explicit flags win over RUST_LOG.
    let filter = match (cli.silent, cli.log) {
        (true, _) => EnvFilter::new(LevelFilter::OFF.to_string()),
        (false, Some(log)) => EnvFilter::new(log.filter().to_string()),
        (false, None) => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(LevelFilter::INFO.to_string()))
        }
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    // The logger lives for this invocation only.
    tracing::subscriber::with_default(subscriber, || {
        let code = match run(&cli) {
            Ok(code) => code,
            Err(e) => {
                error!("{:#}", e);
                RetCode::OsError
            }
        };
        if cli.quiet {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(code.code())
        }
    })
}

fn run(cli: &Cli) -> Result<RetCode> {
    // Hard validation
    if let Some(kexec) = &cli.kexec {
        if !kexec.is_file() {
            bail!("--kexec is not a file: {:?}", kexec);
        }
        if !is_executable(kexec) {
            bail!("--kexec is not executable: {:?}", kexec);
        }
    }

    fs::create_dir_all(&cli.outdir)?;

    let source_file = match (&cli.source_file, &cli.source_inchi) {
        (Some(file), _) => file.clone(),
        (None, Some(inchi)) => {
            let name = cli.source_name.as_deref().filter(|n| !n.is_empty()).unwrap_or("target");
            let path = cli.outdir.join(defaults::SOURCE_FILE);
            table::write_source(&path, name, inchi)?;
            path
        }
        (None, None) => bail!("--source-inchi is mandatory."),
    };

    // KNIME
    let workflow = cli.workflow_dir.join(defaults::workflow_file_name(&cli.rp2_version));
    let mut knime = Knime::new(&cli.kinstall, workflow);
    if let Some(kexec) = &cli.kexec {
        knime = knime.with_kexec(kexec);
    }
    if !knime.is_installed() {
        if cli.no_network {
            error!("KNIME is not installed under {:?} and network is disabled", cli.kinstall);
            return Ok(RetCode::KnimeInstall);
        }
        match install::install_online(&cli.kinstall, &cli.kver) {
            Ok(installed) => knime.kexec = installed.kexec,
            Err(e) => {
                error!("{}", e);
                return Ok(RetCode::KnimeInstall);
            }
        }
    }

    let muted = matches!(
        cli.log,
        Some(LogLevel::Error | LogLevel::Critical | LogLevel::Silent | LogLevel::Quiet)
    );
    if !cli.silent && !muted {
        print_conf(&knime);
    }
    tracing::debug!(?cli, "args");

    let config = RunConfig {
        sink_file: cli.sink_file.clone(),
        source_file,
        rules_file: cli.rules_file.clone(),
        outdir: cli.outdir.clone(),
        params: Rp2Params {
            max_steps: cli.max_steps,
            topx: cli.topx,
            dmin: cli.dmin,
            dmax: cli.dmax,
            mwmax_source: cli.mwmax_source,
            std_hydrogen: cli.std_hydrogen,
        },
        msc_timeout: cli.msc_timeout,
        timeout: cli.timeout.map(|m| Duration::from_secs(m.saturating_mul(60))),
    };

    let outcome = retropath2(&config, &knime)?;

    let code = match outcome.code {
        RetCode::Ok => {
            info!("Results");
            info!("   |- Checking... ");
            let code = check_scope(&cli.outdir);
            info!("   |--path: {}", cli.outdir.display());
            code
        }
        RetCode::Timeout => {
            warn!("Time limit reached, results may be partial.");
            if check_scope(&cli.outdir).is_ok() {
                info!("   |--path: {}", cli.outdir.display());
            }
            RetCode::Timeout
        }
        code if code.is_warning() => {
            match code {
                RetCode::SrcInSink => warn!("It seems that the target product is already in the chassis."),
                _ => warn!("No solution has been found."),
            }
            warn!("Exiting...");
            code
        }
        RetCode::SinkFileMalformed => {
            error!("The sink file is malformed.");
            error!("Exiting...");
            RetCode::SinkFileMalformed
        }
        code => {
            error!("The following error occured: {}", code);
            error!("Exiting...");
            code
        }
    };

    Ok(code)
}

fn print_conf(knime: &Knime) {
    println!("Configuration");
    println!(" + {}", env!("CARGO_PKG_NAME"));
    println!("     |--version: {}", env!("CARGO_PKG_VERSION"));
    println!(" + KNIME");
    println!(
        "     |--path: {}",
        knime.kexec.as_deref().map(|p| p.display().to_string()).unwrap_or_default()
    );
    println!(" + RetroPath2.0 workflow");
    println!("     |--path: {}", knime.workflow.display());
    println!();
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).map(|m| m.permissions().mode() & 0o111 != 0).unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
