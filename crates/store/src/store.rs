// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-workflow YAML record store.
//!
//! `Get` loads a workflow from its YAML file; `Save` writes it back
//! atomically (write-to-temp, fsync, rename, fsync parent directory). If the
//! rename fails the in-memory state remains authoritative — callers must
//! retry `Save` before taking any destructive action.

use crate::error::StoreError;
use crate::paths::Paths;
use meow_core::Workflow;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reads and writes the YAML record for a single workflow.
pub struct WorkflowStore {
    paths: Paths,
}

impl WorkflowStore {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Load the workflow record for `workflow_id`.
    ///
    /// Malformed YAML is a hard error — this never silently resets state.
    pub fn get(&self, workflow_id: &str) -> Result<Workflow, StoreError> {
        let path = self.paths.workflow_yaml(workflow_id);
        let bytes = std::fs::read(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        serde_yaml::from_slice(&bytes).map_err(|source| StoreError::Parse { path, source })
    }

    /// True if a record already exists for `workflow_id`.
    pub fn exists(&self, workflow_id: &str) -> bool {
        self.paths.workflow_yaml(workflow_id).is_file()
    }

    /// Persist `workflow` atomically under its own id.
    pub fn save(&self, workflow: &Workflow) -> Result<(), StoreError> {
        let dir = self.paths.workflows_dir();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        let path = self.paths.workflow_yaml(workflow.id.as_str());
        let yaml = serde_yaml::to_string(workflow).map_err(|source| StoreError::Parse {
            path: path.clone(),
            source,
        })?;

        write_atomic(&dir, &path, yaml.as_bytes())
    }

    /// List workflow ids with a persisted record, derived from file names
    /// under the workflows directory.
    pub fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        let dir = self.paths.workflows_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: dir, source }),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Write `data` to `final_path` via a sibling temp file, fsync the temp
/// file, rename into place, then fsync `dir` so the rename itself survives
/// a crash.
fn write_atomic(dir: &Path, final_path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let tmp_path = tmp_path_for(final_path);

    let mut file = File::create(&tmp_path).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    file.write_all(data).map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    file.sync_all().map_err(|source| StoreError::Io {
        path: tmp_path.clone(),
        source,
    })?;
    drop(file);

    std::fs::rename(&tmp_path, final_path).map_err(|source| StoreError::RenameFailed {
        path: final_path.to_path_buf(),
        source,
    })?;

    if let Ok(dir_handle) = File::open(dir) {
        let _ = dir_handle.sync_all();
    }

    Ok(())
}

fn tmp_path_for(final_path: &Path) -> PathBuf {
    let file_name = final_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("workflow");
    final_path.with_file_name(format!("{file_name}.{}.tmp", std::process::id()))
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
