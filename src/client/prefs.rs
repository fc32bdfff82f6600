//! Local preferences file
//!
//! Small JSON document holding the stable user id and the remembered
//! session, the way the browser original kept them in local storage.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

const USER_ID_LEN: usize = 20;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Prefs {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug)]
pub struct PrefsFile {
    path: PathBuf,
    prefs: Prefs,
}

impl PrefsFile {
    /// Load preferences; a missing file yields empty defaults
    pub fn load(path: &Path) -> Result<Self> {
        let prefs = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("unable to read prefs file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("invalid prefs file {}", path.display()))?
        } else {
            Prefs::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            prefs,
        })
    }

    fn save(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.prefs)?;
        fs::write(&self.path, format!("{text}\n"))
            .with_context(|| format!("unable to write prefs file {}", self.path.display()))?;
        Ok(())
    }

    /// The stable opaque user identifier, generated and persisted on first use
    pub fn ensure_user_id(&mut self) -> Result<String> {
        if let Some(user_id) = &self.prefs.user_id {
            return Ok(user_id.clone());
        }
        let user_id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(USER_ID_LEN)
            .map(char::from)
            .collect();
        self.prefs.user_id = Some(user_id.clone());
        self.save()?;
        Ok(user_id)
    }

    pub fn remembered_session(&self) -> Option<&str> {
        self.prefs.session_id.as_deref()
    }

    pub fn remember_session(&mut self, session_id: &str) -> Result<()> {
        self.prefs.session_id = Some(session_id.to_string());
        self.save()
    }

    pub fn forget_session(&mut self) -> Result<()> {
        if self.prefs.session_id.take().is_some() {
            self.save()?;
        }
        Ok(())
    }
}
