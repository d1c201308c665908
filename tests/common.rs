#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Two events on 2025-10-31 (folder stamp `25 10 31 ...`).
pub const SCENARIO_LOG: &str = "\
[Header]
Site=Ganaraska
; exported by the counter

[Data]
25 10 31 08 00
1001 1 2 10 31 8 15 + 3
1002 4 5 10 31 8 16 - 6
";

/// A scratch project: `<tmp>/project` holds the log and the store,
/// `<tmp>/clips` the videos, `<tmp>/conf` the config dir.
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new(log: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("project")).expect("project dir");
        fs::create_dir_all(dir.path().join("clips")).expect("clips dir");
        fs::create_dir_all(dir.path().join("conf")).expect("conf dir");
        let p = Self { dir };
        p.write_log(log);
        p
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("project")
    }

    pub fn clips(&self) -> PathBuf {
        self.dir.path().join("clips")
    }

    pub fn write_log(&self, log: &str) {
        fs::write(self.root().join("counter.log"), log).expect("write log");
    }

    pub fn add_clip(&self, rel: &str) {
        let path = self.clips().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("clip dir");
        }
        fs::write(path, b"not really a video").expect("write clip");
    }

    pub fn out(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// `fishreview --test --project <root> --videos <clips>` with an isolated
    /// config dir.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("fishreview");
        cmd.env("FISHREVIEW_CONFIG_DIR", self.dir.path().join("conf"))
            .arg("--test")
            .arg("--project")
            .arg(self.root())
            .arg("--videos")
            .arg(self.clips());
        cmd
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read file")
}
