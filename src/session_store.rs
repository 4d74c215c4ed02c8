use std::fs;
use std::path::{Path, PathBuf};
use log::{info, error};

use crate::browser::SessionCookie;
use crate::error::{MonitorError, Result};

/// Cookie jar persisted between walks and between runs.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SessionStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored cookies, or an empty jar when the file is missing or unreadable.
    pub fn load(&self) -> Vec<SessionCookie> {
        if !self.path.exists() {
            info!("No stored cookies found at {:?}. Continuing without a session.", self.path);
            return Vec::new();
        }
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to read session file {:?}: {}", self.path, e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<SessionCookie>>(&content) {
            Ok(cookies) => {
                info!("Loaded {} stored cookies.", cookies.len());
                cookies
            }
            Err(e) => {
                error!("Failed to parse session file {:?}: {}. Continuing without a session.", self.path, e);
                Vec::new()
            }
        }
    }

    /// Replaces the stored jar with `cookies`.
    pub fn save(&self, cookies: &[SessionCookie]) -> Result<()> {
        let json = serde_json::to_string_pretty(cookies)?;
        fs::write(&self.path, json)
            .map_err(|e| MonitorError::Session(format!("writing {:?}: {}", self.path, e)))
    }
}
