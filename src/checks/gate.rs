use super::inchi::check_inchi_from_file;
use super::sink::check_src_in_sink_exact;
use crate::core::retcode::RetCode;
use std::path::Path;
use tracing::{error, info};

/// Validates the source, then checks it is not already in the sink.
///
/// The InChI check always runs first and short-circuits, so a malformed
/// source is reported even when the sink is missing. The InChI is returned
/// only when both checks pass.
pub fn check_input(source: &Path, sink: &Path) -> (RetCode, Option<String>) {
    info!("Checking input data");
    info!("   |- InChI");

    let inchi = match check_inchi_from_file(source) {
        Ok(inchi) => inchi,
        Err(e) => {
            error!("        {}", e);
            return (e.retcode(), None);
        }
    };

    match check_src_in_sink_exact(&inchi, sink) {
        RetCode::Ok => (RetCode::Ok, Some(inchi)),
        code => (code, None),
    }
}
