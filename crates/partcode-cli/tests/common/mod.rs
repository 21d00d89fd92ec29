#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const RAW_HEADER: &str = "part_type,pos_from,pos_to,attr_name,lookup_table\n";

pub const IK_SCHEMA: &str = "V111,5,5,material_code,material_lookup\n\
                             V111,6,6,surface_code,surface_lookup\n\
                             V111,7,8,nominal,\n\
                             V112,5,6,material_code,material_lookup\n";

pub const OK_SCHEMA: &str = "2655,5,6,material_code,material_lookup\n\
                             2655,7,7,grade,\n\
                             26551,6,7,material_code,material_lookup\n";

pub const CROSS_MAP: &str = "ik_part_type,ok_part_type\nV111,2655\nV112,26551\n";

pub const MATERIAL_LOOKUP: &str = "part_type,code,material\n*,7,SS400\nV111,7,SUS304\n*,8,SUS316\n";

/// Raw inputs and lookup tables in a temporary directory
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let workspace = Self {
            dir: tempfile::tempdir().expect("temporary directory should be created"),
        };
        workspace.write("codeSchema_IK.csv", &format!("{RAW_HEADER}{IK_SCHEMA}"));
        workspace.write("codeSchema_OK.csv", &format!("{RAW_HEADER}{OK_SCHEMA}"));
        workspace.write("Cross_Map.csv", CROSS_MAP);
        fs::create_dir(workspace.path("lookups")).expect("lookup directory should be created");
        workspace.write("lookups/material_lookup.csv", MATERIAL_LOOKUP);
        workspace
    }

    /// A workspace whose union schema is already built
    pub fn built() -> Self {
        let workspace = Self::new();
        let output = workspace.build(&[]);
        assert_exit_code(&output, 0);
        workspace
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn write(&self, name: &str, content: &str) {
        fs::write(self.path(name), content).expect("fixture file should be written");
    }

    pub fn union_schema(&self) -> PathBuf {
        self.path("union_schema.csv")
    }

    pub fn build(&self, extra: &[&str]) -> Output {
        let mut args = vec![
            "build".to_string(),
            "--ik".to_string(),
            arg(&self.path("codeSchema_IK.csv")),
            "--ok".to_string(),
            arg(&self.path("codeSchema_OK.csv")),
            "--cross-map".to_string(),
            arg(&self.path("Cross_Map.csv")),
            "--output".to_string(),
            arg(&self.union_schema()),
        ];
        args.extend(extra.iter().map(|s| (*s).to_string()));
        run(&args)
    }

    /// Run a codec command against this workspace's union schema
    pub fn run_with_union(&self, args: &[&str]) -> Output {
        let mut args: Vec<String> = args.iter().map(|s| (*s).to_string()).collect();
        args.push("--union".to_string());
        args.push(arg(&self.union_schema()));
        run(&args)
    }
}

pub fn arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

pub fn run<S: AsRef<std::ffi::OsStr>>(args: &[S]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_partcode"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("partcode should execute")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn assert_exit_code(output: &Output, expected: i32) {
    let actual = output.status.code().unwrap_or(-1);
    assert_eq!(
        actual,
        expected,
        "unexpected exit code; stdout: {}; stderr: {}",
        stdout(output),
        stderr(output)
    );
}
