// 🔑 Session - Logged-in user for the terminal client
//
// Stored as JSON next to the database. A missing file means logged out;
// a file that no longer parses is removed and treated the same way.

use crate::entities::User;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub user: User,
    pub logged_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Session {
    path: PathBuf,
    data: Option<SessionData>,
}

impl Session {
    pub fn load(path: &Path) -> Result<Self> {
        let data = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<SessionData>(&raw) {
                Ok(data) => Some(data),
                Err(err) => {
                    warn!(
                        "event=session_corrupt path={} error={}",
                        path.display(),
                        err
                    );
                    remove_if_present(path)?;
                    None
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read session {}", path.display()))
            }
        };

        Ok(Session {
            path: path.to_path_buf(),
            data,
        })
    }

    pub fn current_user(&self) -> Option<&User> {
        self.data.as_ref().map(|d| &d.user)
    }

    pub fn data(&self) -> Option<&SessionData> {
        self.data.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.data.is_some()
    }

    /// Store `user` as the logged-in user and write the file
    pub fn save(&mut self, user: User) -> Result<()> {
        let data = SessionData {
            user,
            logged_in_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&data)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write session {}", self.path.display()))?;

        info!("event=session_saved user_id={}", data.user.id);
        self.data = Some(data);
        Ok(())
    }

    /// Logout
    pub fn clear(&mut self) -> Result<()> {
        remove_if_present(&self.path)?;
        if let Some(data) = self.data.take() {
            info!("event=session_cleared user_id={}", data.user.id);
        }
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("Failed to remove session {}", path.display())),
    }
}
