use crate::core::defaults;
use knime_rust::WorkflowVariable;
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// WORKFLOW PARAMETERS
// ============================================================================

/// How hydrogens are written in the reaction rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StdHydrogen {
    /// Guess from the rules file.
    #[default]
    Auto,
    Implicit,
    Explicit,
}

impl StdHydrogen {
    pub fn as_str(self) -> &'static str {
        match self {
            StdHydrogen::Auto => "auto",
            StdHydrogen::Implicit => "implicit",
            StdHydrogen::Explicit => "explicit",
        }
    }
}

impl fmt::Display for StdHydrogen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric knobs of the RetroPath2.0 workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rp2Params {
    pub max_steps: u32,
    pub topx: u32,
    pub dmin: u32,
    pub dmax: u32,
    pub mwmax_source: u32,
    pub std_hydrogen: StdHydrogen,
}

impl Default for Rp2Params {
    fn default() -> Self {
        Self {
            max_steps: defaults::MAX_STEPS,
            topx: defaults::TOPX,
            dmin: defaults::DMIN,
            dmax: defaults::DMAX,
            mwmax_source: defaults::MWMAX_SOURCE,
            std_hydrogen: StdHydrogen::Auto,
        }
    }
}

impl Rp2Params {
    /// Workflow variables of a run over `files`, in the order KNIME receives them.
    pub fn workflow_variables(&self, files: &FilePaths) -> Vec<WorkflowVariable> {
        vec![
            WorkflowVariable::int("input.dmin", self.dmin),
            WorkflowVariable::int("input.dmax", self.dmax),
            WorkflowVariable::int("input.max-steps", self.max_steps),
            WorkflowVariable::int("input.topx", self.topx),
            WorkflowVariable::int("input.mwmax-source", self.mwmax_source),
            WorkflowVariable::path("input.sourcefile", &files.source),
            WorkflowVariable::path("input.sinkfile", &files.sink),
            WorkflowVariable::path("input.rulesfile", &files.rules),
            WorkflowVariable::path("output.dir", &files.outdir),
            WorkflowVariable::string("output.solutionfile", files.results.as_str()),
            WorkflowVariable::string("output.sourceinsinkfile", files.src_in_sink.as_str()),
            WorkflowVariable::string("input.std_mode", self.std_hydrogen.as_str()),
        ]
    }
}

// ============================================================================
// FILES
// ============================================================================

/// Absolute input paths handed to KNIME plus the names of its outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePaths {
    pub sink: PathBuf,
    pub source: PathBuf,
    pub rules: PathBuf,
    pub outdir: PathBuf,
    /// Solutions file name, relative to `outdir`.
    pub results: String,
    /// Source-in-sink report name, relative to `outdir`.
    pub src_in_sink: String,
}

impl FilePaths {
    pub fn new(sink: PathBuf, source: PathBuf, rules: PathBuf, outdir: PathBuf) -> Self {
        Self {
            sink,
            source,
            rules,
            outdir,
            results: defaults::RESULTS_FILE.to_string(),
            src_in_sink: defaults::SRC_IN_SINK_FILE.to_string(),
        }
    }

    pub fn results_path(&self) -> PathBuf {
        self.outdir.join(&self.results)
    }

    pub fn src_in_sink_path(&self) -> PathBuf {
        self.outdir.join(&self.src_in_sink)
    }

    /// Inputs that must carry a `.csv` extension for KNIME.
    pub fn inputs_mut(&mut self) -> [&mut PathBuf; 3] {
        [&mut self.sink, &mut self.source, &mut self.rules]
    }
}
