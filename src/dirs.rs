//! Directory registry: known directories and the current directory
//!
//! Purely nominal bookkeeping. Directories are canonical slash-terminated
//! absolute paths in a set; nothing here touches the block store, and parent
//! directories are not required to exist before a child is created.

use crate::error::{LogdiskError, Result};
use crate::path;
use serde::Serialize;
use std::collections::BTreeSet;

pub const ROOT: &str = "/";

/// Outcome of a directory creation attempt. Duplicates are reported, not
/// treated as errors: the command keeps processing its remaining paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DirCreate {
    Created(String),
    AlreadyExists(String),
}

/// Known directories plus the resolution base for relative paths.
#[derive(Debug, Clone)]
pub struct DirRegistry {
    dirs: BTreeSet<String>,
    current: String,
}

impl DirRegistry {
    /// Fresh registry: root exists and is the current directory.
    pub fn new() -> Self {
        let mut dirs = BTreeSet::new();
        dirs.insert(ROOT.to_string());
        DirRegistry {
            dirs,
            current: ROOT.to_string(),
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Resolve a file path against the current directory.
    pub fn resolve(&self, raw: &str) -> String {
        path::resolve(raw, &self.current)
    }

    /// Create a directory from a raw (possibly relative) path.
    pub fn create(&mut self, raw: &str) -> DirCreate {
        let dir = self.canonical_dir(raw);
        if self.dirs.insert(dir.clone()) {
            tracing::debug!(%dir, "created directory");
            DirCreate::Created(dir)
        } else {
            DirCreate::AlreadyExists(dir)
        }
    }

    /// Change the current directory. The target must already exist.
    pub fn change(&mut self, raw: &str) -> Result<&str> {
        let dir = self.canonical_dir(raw);
        if !self.dirs.contains(&dir) {
            return Err(LogdiskError::DirectoryNotFound(dir));
        }
        self.current = dir;
        Ok(&self.current)
    }

    pub fn contains(&self, dir: &str) -> bool {
        self.dirs.contains(dir)
    }

    /// Resolve and slash-terminate a directory path.
    fn canonical_dir(&self, raw: &str) -> String {
        let mut dir = path::resolve(raw, &self.current);
        if !dir.ends_with('/') {
            dir.push('/');
        }
        dir
    }
}

impl Default for DirRegistry {
    fn default() -> Self {
        Self::new()
    }
}
