//! Changeset Sources
//!
//! Where normalized changesets come from. A missing or unreadable archive is
//! `None`: the caller skips that changeset, nothing more.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::Changeset;

/// Lookup of a normalized changeset by id
pub trait ChangesetSource {
    fn load(&self, changeset_id: &str) -> Option<Changeset>;
}

/// Reads `<dir>/<changeset_id>.json`
#[derive(Debug, Clone)]
pub struct DirectoryChangesetSource {
    dir: PathBuf,
}

impl DirectoryChangesetSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `None` for ids that would escape the directory
    pub fn archive_path(&self, changeset_id: &str) -> Option<PathBuf> {
        let safe = !changeset_id.is_empty()
            && changeset_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        safe.then(|| self.dir.join(format!("{}.json", changeset_id)))
    }
}

impl ChangesetSource for DirectoryChangesetSource {
    fn load(&self, changeset_id: &str) -> Option<Changeset> {
        let path = match self.archive_path(changeset_id) {
            Some(path) => path,
            None => {
                log::debug!("Rejected changeset id {:?}", changeset_id);
                return None;
            }
        };

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!("No changeset archive at {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => {
                let changeset = Changeset::from_json(changeset_id, &value);
                if changeset.is_empty() {
                    log::debug!(
                        "Changeset archive {} holds no feature versions (expected a normalized FeatureCollection)",
                        path.display()
                    );
                }
                Some(changeset)
            }
            Err(e) => {
                log::debug!("Unreadable changeset archive {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Changesets already held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryChangesets {
    changesets: HashMap<String, Changeset>,
}

impl InMemoryChangesets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, changeset: Changeset) {
        self.changesets.insert(changeset.id.clone(), changeset);
    }
}

impl FromIterator<Changeset> for InMemoryChangesets {
    fn from_iter<I: IntoIterator<Item = Changeset>>(iter: I) -> Self {
        let mut source = Self::new();
        for changeset in iter {
            source.insert(changeset);
        }
        source
    }
}

impl ChangesetSource for InMemoryChangesets {
    fn load(&self, changeset_id: &str) -> Option<Changeset> {
        self.changesets.get(changeset_id).cloned()
    }
}
