use knime_rust::install::{p2_director_args, zenodo_record, HostOs, PLUGINS, SUPPORTED_VERSIONS};
use knime_rust::knime::{collect_top_level_dirs, find_p2_dir, library_path_shim, standardize_path};
use knime_rust::{Knime, Preference, WorkflowVariable};
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

#[test]
fn test_workflow_variable_args() {
    assert_eq!(WorkflowVariable::int("input.dmin", 0).to_arg(), "-workflow.variable=input.dmin,\"0\",int");
    assert_eq!(
        WorkflowVariable::string("input.std_mode", "implicit").to_arg(),
        "-workflow.variable=input.std_mode,\"implicit\",String"
    );
    assert_eq!(
        WorkflowVariable::path("output.dir", Path::new("/tmp/out")).to_arg(),
        "-workflow.variable=output.dir,\"/tmp/out\",String"
    );
}

#[test]
fn test_standardize_path() {
    let cwd = env::current_dir().unwrap();
    assert!(!standardize_path(&cwd).contains('\\'));
}

#[test]
fn test_batch_args() {
    let dir = tempfile::tempdir().unwrap();
    let knime = Knime::new(dir.path(), "/wf/RetroPath2.0_r20250728.knwf");
    assert!(!knime.is_installed());

    let vars = vec![WorkflowVariable::int("input.topx", 100)];
    let pref = Preference::new(dir.path().join("rp2.epf"), Some(10));
    let args = knime.batch_args(&vars, Some(&pref));

    assert_eq!(args[..4], ["-nosplash", "-nosave", "-reset", "-consoleLog"]);
    assert!(args.contains(&"org.knime.product.KNIME_BATCH_APPLICATION".to_string()));
    assert!(args.contains(&"-workflowFile=/wf/RetroPath2.0_r20250728.knwf".to_string()));
    assert!(args.contains(&"-workflow.variable=input.topx,\"100\",int".to_string()));
    assert!(args.last().unwrap().starts_with("-preferences="));

    let no_pref = Preference::new(dir.path().join("rp2.epf"), None);
    let args = knime.batch_args(&vars, Some(&no_pref));
    assert!(!args.iter().any(|a| a.starts_with("-preferences=")));
}

#[test]
fn test_call_without_executable() {
    let dir = tempfile::tempdir().unwrap();
    let knime = Knime::new(dir.path(), "wf.knwf");

    assert!(matches!(
        knime.call(&[], None, None),
        Err(knime_rust::KnimeError::ExecutableNotFound(_))
    ));
}

#[test]
fn test_preference() {
    assert!(!Preference::new("p.epf", None).is_init());
    assert!(Preference::new("p.epf", Some(10)).is_init());

    let dir = tempfile::tempdir().unwrap();
    let pref = Preference::new(dir.path().join("rp2.epf"), Some(10));
    pref.to_file().unwrap();
    let content = fs::read_to_string(&pref.path).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert!(lines[0].starts_with('#'));
    assert_eq!(lines[1..], ["\\!/=", "/instance/org.rdkit.knime.nodes/mcsAggregation.timeout=600"]);
}

#[test]
fn test_library_path_shim() {
    assert_eq!(library_path_shim(None, Some(OsStr::new("/usr/lib"))), None);

    let shim = library_path_shim(Some(Path::new("/opt/conda")), Some(OsStr::new("/usr/lib"))).unwrap();
    let parts: Vec<PathBuf> = env::split_paths(&shim).collect();
    assert_eq!(
        parts,
        vec![
            PathBuf::from("/usr/lib"),
            PathBuf::from("/opt/conda/lib"),
            PathBuf::from("/opt/conda/x86_64-conda-linux-gnu/sysroot/usr/lib64"),
        ]
    );

    let shim = library_path_shim(Some(Path::new("/opt/conda")), None).unwrap();
    assert_eq!(env::split_paths(&shim).count(), 2);
}

#[cfg(unix)]
#[test]
fn test_find_executable() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let install = dir.path().join("knime_4.6.4");
    fs::create_dir_all(install.join("configuration")).unwrap();
    fs::write(install.join("knime.ini"), "").unwrap();
    let kexec = install.join("knime");
    fs::write(&kexec, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&kexec, fs::Permissions::from_mode(0o755)).unwrap();

    let knime = Knime::new(dir.path(), "wf.knwf");
    assert!(knime.is_installed());
    assert_eq!(knime.kexec.unwrap().file_name().unwrap(), "knime");
}

#[test]
fn test_install_layout_helpers() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("knime_4.6.4/p2/org.eclipse.equinox.p2.engine")).unwrap();
    fs::write(dir.path().join("archive.tar.gz"), "").unwrap();

    let dirs = collect_top_level_dirs(dir.path()).unwrap();
    assert_eq!(dirs.into_iter().collect::<Vec<_>>(), vec!["knime_4.6.4".to_string()]);

    let p2 = find_p2_dir(dir.path()).unwrap();
    assert!(p2.ends_with("knime_4.6.4/p2"));
}

#[test]
fn test_p2_director_args() {
    let repos = vec![
        PathBuf::from("/tmp/org.knime.update.analytics-platform_4.6.4.zip"),
        PathBuf::from("/tmp/TrustedCommunityContributions_4.6.zip"),
    ];
    let args = p2_director_args(&repos, Path::new("/k/p2"), Path::new("/k/knime_4.6.4"));

    let repository = args.iter().position(|a| a == "-repository").unwrap();
    assert_eq!(
        args[repository + 1],
        "jar:file:/tmp/org.knime.update.analytics-platform_4.6.4.zip!/,jar:file:/tmp/TrustedCommunityContributions_4.6.zip!/"
    );
    assert_eq!(args.last().unwrap(), &PLUGINS.join(","));
    assert!(args.contains(&"org.eclipse.equinox.p2.director".to_string()));
}

#[test]
fn test_zenodo_records() {
    for kver in SUPPORTED_VERSIONS {
        assert!(zenodo_record(kver).is_some());
    }
    assert_eq!(zenodo_record("4.6.4"), Some("7515771"));
    assert_eq!(zenodo_record("5.0.0"), None);
}

#[test]
fn test_host_marker() {
    if let Some(host) = HostOs::current() {
        assert!(["linux", "macosx", "win32"].contains(&host.archive_marker()));
    }
}
