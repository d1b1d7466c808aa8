use std::fmt;

/// Outcome of a wrapper run, doubling as the process exit code.
///
/// Errors are below 10, warnings (expected business outcomes) from 10 up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetCode {
    Ok,
    FileNotFound,
    OsError,
    InChI,
    SinkFileMalformed,
    KnimeInstall,
    Timeout,
    SrcInSink,
    NoSolution,
}

impl RetCode {
    pub fn code(self) -> u8 {
        match self {
            RetCode::Ok => 0,
            RetCode::FileNotFound => 1,
            RetCode::OsError => 2,
            RetCode::InChI => 3,
            RetCode::SinkFileMalformed => 4,
            RetCode::KnimeInstall => 5,
            RetCode::Timeout => 6,
            RetCode::SrcInSink => 10,
            RetCode::NoSolution => 11,
        }
    }

    pub fn is_ok(self) -> bool {
        self == RetCode::Ok
    }

    /// Not a defect: the run worked but produced nothing to report.
    pub fn is_warning(self) -> bool {
        matches!(self, RetCode::SrcInSink | RetCode::NoSolution)
    }
}

impl fmt::Display for RetCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RetCode::Ok => "OK",
            RetCode::FileNotFound => "FileNotFound",
            RetCode::OsError => "OSError",
            RetCode::InChI => "InChI",
            RetCode::SinkFileMalformed => "SinkFileMalformed",
            RetCode::KnimeInstall => "KnimeInstallationError",
            RetCode::Timeout => "Timeout",
            RetCode::SrcInSink => "SrcInSink",
            RetCode::NoSolution => "NoSolution",
        };
        write!(f, "{} ({})", name, self.code())
    }
}
