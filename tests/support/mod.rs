#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub const HISTORY_HEADER: &str = "Task Name,Task ID,Task Type,Date,Value";

/// Scratch directory holding a config file and an archive export.
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Write `rows` under a header line to `data/history.csv`.
    pub fn write_archive(&self, rows: &[&str]) -> std::io::Result<PathBuf> {
        let mut contents = String::from(HISTORY_HEADER);
        contents.push('\n');
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }
        self.write_file("data/history.csv", &contents)
    }

    /// Config pointing at `data/history.csv` with the remote disabled.
    pub fn write_config(&self, extra: &str) -> std::io::Result<PathBuf> {
        let contents = format!(
            "[sources]\narchive = \"data/history.csv\"\nremote_enabled = false\n\n{extra}"
        );
        self.write_file(".habitviz.toml", &contents)
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join(".habitviz.toml")
    }
}

/// The habitviz binary, run inside `dir` with no ambient credentials.
pub fn habitviz_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("habitviz").expect("binary");
    cmd.current_dir(dir)
        .env_remove("HABITVIZ_CONFIG")
        .env_remove("HABITVIZ_API_USER")
        .env_remove("HABITVIZ_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}
