use super::CheckError;
use crate::core::retcode::RetCode;
use crate::io::table::open_table;
use std::path::Path;
use tracing::{debug, info, warn};

/// Looks for a sink row whose second field is exactly `inchi`.
///
/// The sink has no header: its first row is compared like any other.
pub fn find_in_sink(inchi: &str, sink: &Path) -> Result<bool, CheckError> {
    let mut reader = open_table(sink).map_err(|source| CheckError::FileNotFound {
        path: sink.to_path_buf(),
        source,
    })?;
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|_| CheckError::SinkMalformed(idx + 1))?;
        match record.get(1) {
            Some(field) if field == inchi => return Ok(true),
            Some(_) => {}
            None => return Err(CheckError::SinkMalformed(idx + 1)),
        }
    }
    Ok(false)
}

/// Pre-flight check: InChIs have to be strictly equal.
pub fn check_src_in_sink_exact(inchi: &str, sink: &Path) -> RetCode {
    info!("   |- Source in Sink (simple)");
    match find_in_sink(inchi, sink) {
        Ok(true) => {
            warn!("        source has been found in sink");
            RetCode::SrcInSink
        }
        Ok(false) => RetCode::Ok,
        Err(e) => {
            debug!("{}", e);
            e.retcode()
        }
    }
}

/// Post-flight check on the source-in-sink report written by the workflow.
///
/// The workflow matches compounds its own way, so the report may list the
/// source even when the exact check found nothing. Any row beyond the first
/// one means the source is already in the sink.
pub fn check_src_in_sink_derived(report: &Path) -> RetCode {
    debug!("src_in_sink_file: {:?}", report);
    info!("   |- Checking Source in Sink (advanced)");
    let reader = match open_table(report) {
        Ok(reader) => reader,
        Err(e) => {
            debug!("{:?}: {}", report, e);
            return RetCode::FileNotFound;
        }
    };
    if reader.into_records().take(2).count() > 1 {
        warn!("        |- source has been found in sink");
        RetCode::SrcInSink
    } else {
        RetCode::Ok
    }
}
