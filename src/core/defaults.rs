//! Default values of the RetroPath2.0 run.

pub const RP2_VERSION: &str = "r20250728";
pub const RP2_VERSIONS: [&str; 5] = ["v9", "r20210127", "r20220104", "r20220224", "r20250728"];

/// Time limit of the RDKit MCS aggregation, in minutes.
pub const MSC_TIMEOUT: u32 = 10;

pub const MAX_STEPS: u32 = 3;
pub const TOPX: u32 = 100;
pub const DMIN: u32 = 0;
pub const DMAX: u32 = 1000;
pub const MWMAX_SOURCE: u32 = 1000;

pub const RESULTS_FILE: &str = "results.csv";
pub const SRC_IN_SINK_FILE: &str = "source-in-sink.csv";
pub const SOURCE_FILE: &str = "source.csv";
pub const PREFERENCE_FILE: &str = "rp2.epf";

pub fn workflow_file_name(rp2_version: &str) -> String {
    format!("RetroPath2.0_{}.knwf", rp2_version)
}
