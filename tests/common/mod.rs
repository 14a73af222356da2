#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};

pub const REVISION: &str = "abc123";

pub fn tagger_cmd() -> Command {
    let mut cmd = Command::cargo_bin("iac-tagger").unwrap();
    cmd.env_remove("IAC_TAGGER_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Tagger command with the revision pinned, so results do not depend on git
pub fn pinned_cmd() -> Command {
    let mut cmd = tagger_cmd();
    cmd.arg("--revision").arg(REVISION);
    cmd
}

pub fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}
