use chrono::Utc;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Eclipse preference file (`.epf`) handed to KNIME with `-preferences=`.
#[derive(Debug, Clone)]
pub struct Preference {
    pub path: PathBuf,
    /// Time limit of the RDKit MCS aggregation node, in minutes.
    pub rdkit_timeout_minutes: Option<u32>,
}

impl Preference {
    pub fn new(path: impl Into<PathBuf>, rdkit_timeout_minutes: Option<u32>) -> Self {
        Self { path: path.into(), rdkit_timeout_minutes }
    }

    /// Whether there is anything worth writing.
    pub fn is_init(&self) -> bool {
        matches!(self.rdkit_timeout_minutes, Some(m) if m > 0)
    }

    pub fn render(&self) -> String {
        let mut out = format!("#{}\n", Utc::now().format("%a %b %d %H:%M:%S UTC %Y"));
        out.push_str("\\!/=\n");
        if let Some(minutes) = self.rdkit_timeout_minutes.filter(|m| *m > 0) {
            out.push_str(&format!(
                "/instance/org.rdkit.knime.nodes/mcsAggregation.timeout={}\n",
                u64::from(minutes) * 60
            ));
        }
        out
    }

    pub fn to_file(&self) -> io::Result<()> {
        fs::write(&self.path, self.render())
    }
}
