#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const ACETONE: &str = "InChI=1S/C3H6O/c1-3(2)4/h1-2H3";
pub const ETHANOL: &str = "InChI=1S/C2H6O/c1-2-3/h3H,2H2,1H3";
pub const WATER: &str = "InChI=1S/H2O/h1H2";

pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

pub fn source(dir: &Path, inchi: &str) -> PathBuf {
    write(dir, "source.csv", &format!("Name,InChI\n\"target\",\"{}\"\n", inchi))
}

pub fn sink(dir: &Path) -> PathBuf {
    write(
        dir,
        "sink.csv",
        &format!("\"Name\",\"InChI\"\n\"ethanol\",\"{}\"\n\"water\",\"{}\"\n", ETHANOL, WATER),
    )
}

/// Writes an executable standing in for KNIME: it finds `output.dir` in
/// its arguments and runs `body` with `$out` set to it.
#[cfg(unix)]
pub fn fake_knime(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = format!(
        "#!/bin/sh\nfor arg in \"$@\"; do\n  case \"$arg\" in\n    -workflow.variable=output.dir,*)\n      out=${{arg#*,\\\"}}\n      out=${{out%%\\\"*}}\n      ;;\n  esac\ndone\necho \"$@\" > \"$out/args.txt\"\n{}\n",
        body
    );
    let path = write(dir, "knime", &script);
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}
