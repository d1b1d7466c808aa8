#![cfg(unix)]

mod common;

use common::{fake_knime, sink, source, write, ACETONE, ETHANOL};
use retropath2_wrapper::{retropath2, Knime, RetCode, RunConfig, StdHydrogen};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

struct Fixture {
    _dir: tempfile::TempDir,
    config: RunConfig,
    knime: Knime,
}

fn fixture(source_inchi: &str, body: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let kinstall = dir.path().join("knime_install");
    fs::create_dir_all(&kinstall).unwrap();
    fake_knime(&kinstall, body);
    let workflow = write(dir.path(), "RetroPath2.0_r20250728.knwf", "");

    let config = RunConfig::new(
        sink(dir.path()),
        source(dir.path(), source_inchi),
        write(dir.path(), "rules.csv", "\"Rule ID\",\"Rule\"\n\"R1\",\"[C:1]>>[C:1]\"\n"),
        dir.path().join("out"),
    );
    let knime = Knime::new(&kinstall, workflow);
    Fixture { _dir: dir, config, knime }
}

#[test]
fn test_discovers_executable() {
    let f = fixture(ACETONE, "");
    assert!(f.knime.is_installed());
}

#[test]
fn test_run_ok() {
    let f = fixture(ACETONE, "echo '\"source name\",\"source inchi\"' > \"$out/source-in-sink.csv\"");

    let outcome = retropath2(&f.config, &f.knime).expect("run");
    assert_eq!(outcome.code, RetCode::Ok);

    let files = outcome.files.expect("files");
    let args = fs::read_to_string(files.outdir.join("args.txt")).unwrap();
    assert!(args.contains("-application org.knime.product.KNIME_BATCH_APPLICATION"));
    assert!(args.contains("-workflow.variable=input.max-steps,\"3\",int"));
    assert!(args.contains("-workflow.variable=input.std_mode,\"implicit\",String"));
    assert!(args.contains("-workflow.variable=output.sourceinsinkfile,\"source-in-sink.csv\",String"));
    assert!(args.contains("-preferences="));
}

#[test]
fn test_run_derived_src_in_sink() {
    let f = fixture(
        ACETONE,
        "printf '\"source name\",\"source inchi\"\\n\"target\",\"x\"\\n' > \"$out/source-in-sink.csv\"",
    );

    let outcome = retropath2(&f.config, &f.knime).expect("run");
    assert_eq!(outcome.code, RetCode::SrcInSink);
}

#[test]
fn test_run_missing_report() {
    let f = fixture(ACETONE, "exit 1");

    let outcome = retropath2(&f.config, &f.knime).expect("run");
    assert_eq!(outcome.code, RetCode::FileNotFound);
}

#[test]
fn test_gate_stops_before_knime() {
    let f = fixture(ETHANOL, "touch \"$out/called\"");

    let outcome = retropath2(&f.config, &f.knime).expect("run");
    assert_eq!(outcome.code, RetCode::SrcInSink);
    assert!(outcome.files.is_none());
    assert!(!f.config.outdir.join("called").exists());
}

#[test]
fn test_run_timeout_keeps_partial_outputs() {
    let mut f = fixture(ACETONE, "touch \"$out/partial_scope.csv\"\nsleep 5");
    f.config.timeout = Some(Duration::from_millis(500));
    f.config.params.std_hydrogen = StdHydrogen::Explicit;

    let outcome = retropath2(&f.config, &f.knime).expect("run");
    assert_eq!(outcome.code, RetCode::Timeout);
    assert!(f.config.outdir.join("partial_scope.csv").exists());
}

#[test]
fn test_missing_workflow() {
    let mut f = fixture(ACETONE, "");
    f.knime.workflow = PathBuf::from("/nonexistent/RetroPath2.0_v9.knwf");

    let outcome = retropath2(&f.config, &f.knime).expect("run");
    assert_eq!(outcome.code, RetCode::FileNotFound);
}

#[test]
fn test_malformed_source_reported_before_missing_rules() {
    let mut f = fixture("not-an-inchi", "touch \"$out/called\"");
    f.config.rules_file = f.config.outdir.with_file_name("missing_rules.csv");

    let outcome = retropath2(&f.config, &f.knime).expect("run");
    assert_eq!(outcome.code, RetCode::InChI);
    assert!(outcome.files.is_none());
}

#[test]
fn test_missing_rules() {
    let mut f = fixture(ACETONE, "touch \"$out/called\"");
    f.config.rules_file = f.config.outdir.with_file_name("missing_rules.csv");

    let outcome = retropath2(&f.config, &f.knime).expect("run");
    assert_eq!(outcome.code, RetCode::FileNotFound);
    assert!(!f.config.outdir.join("called").exists());
}
