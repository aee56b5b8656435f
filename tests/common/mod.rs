#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use oscscript_rs::{Diagnostic, Vocabulary, validate};
use tempfile::TempDir;

/// A temporary directory of scripts.
pub struct Workspace {
    dir: TempDir,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Path of `name` inside the workspace, without creating it.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `text` to `name`, creating parent directories.
    pub fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, text).expect("write script");
        path
    }

    /// Write raw `bytes` to `name`, which need not be UTF-8.
    pub fn write_bytes(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, bytes).expect("write script");
        path
    }

    /// Validate the on-disk content of `name`.
    pub fn validate(&self, name: &str) -> Vec<Diagnostic> {
        let path = self.path(name);
        let text = fs::read_to_string(&path).expect("read script");
        validate(&path, &text, &Vocabulary::default())
    }
}

/// File names of `paths`, in order.
pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.file_name()
                .expect("file name")
                .to_string_lossy()
                .into_owned()
        })
        .collect()
}

/// Messages of `diagnostics`, in order.
pub fn messages(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics.iter().map(Diagnostic::message).collect()
}
