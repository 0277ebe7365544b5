//! User Details - per-user statistics lookup
//!
//! Unknown or unreadable users resolve to `UserDetails::default()`
//! (0 mapping days), never to an error.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

// ============================================================================
// USER DETAILS
// ============================================================================

/// Aggregate statistics for one user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDetails {
    /// Days since first mapping activity, when precomputed
    #[serde(default)]
    pub mapping_days: Option<i64>,
    /// First edit, used with `extracted_at` when `mapping_days` is absent
    #[serde(default)]
    pub first_edit: Option<DateTime<Utc>>,
    /// Point in time the statistics were collected
    #[serde(default)]
    pub extracted_at: Option<DateTime<Utc>>,
}

impl UserDetails {
    pub fn with_mapping_days(days: i64) -> Self {
        Self {
            mapping_days: Some(days),
            ..Default::default()
        }
    }

    /// Days of mapping activity, never negative; 0 when unknown
    pub fn mapping_days(&self) -> i64 {
        if let Some(days) = self.mapping_days {
            return days.max(0);
        }
        match (self.first_edit, self.extracted_at) {
            (Some(first), Some(at)) => (at - first).num_days().max(0),
            _ => 0,
        }
    }
}

// ============================================================================
// SOURCES
// ============================================================================

/// Read-only lookup keyed by username
pub trait UserDetailsSource {
    fn user_details(&self, username: &str) -> UserDetails;
}

/// Reads `<dir>/<username>.json`, memoizing every lookup
#[derive(Debug)]
pub struct DirectoryUserDetails {
    dir: PathBuf,
    cache: Mutex<HashMap<String, UserDetails>>,
}

impl DirectoryUserDetails {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of usernames looked up so far
    pub fn cached_users(&self) -> usize {
        self.cache.lock().len()
    }

    fn read(&self, username: &str) -> UserDetails {
        // Usernames are free text; keep them inside the directory
        if username.is_empty() || username.contains(|c: char| c == '/' || c == '\\') || username.starts_with('.') {
            return UserDetails::default();
        }

        let path = self.dir.join(format!("{}.json", username));
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(_) => return UserDetails::default(),
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            log::warn!("Unreadable user details {}: {}", path.display(), e);
            UserDetails::default()
        })
    }
}

impl UserDetailsSource for DirectoryUserDetails {
    fn user_details(&self, username: &str) -> UserDetails {
        if let Some(details) = self.cache.lock().get(username) {
            return details.clone();
        }

        let details = self.read(username);
        self.cache.lock().insert(username.to_string(), details.clone());
        details
    }
}

/// User statistics already in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDetails {
    users: HashMap<String, UserDetails>,
}

impl InMemoryUserDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, username: impl Into<String>, details: UserDetails) {
        self.users.insert(username.into(), details);
    }
}

impl UserDetailsSource for InMemoryUserDetails {
    fn user_details(&self, username: &str) -> UserDetails {
        self.users.get(username).cloned().unwrap_or_default()
    }
}
