//! Operator configuration file shared by every bot process.
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use runtime::Credentials;
use serde::Deserialize;

/// `config.json`:
///
/// ```json
/// {
///   "bots": { "alpha": { "email": "...", "password": "..." } },
///   "admins": ["dee"],
///   "command_prompt": "dbots",
///   "max_errors": 3
/// }
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BotsFile {
    pub bots: BTreeMap<String, Credentials>,
    #[serde(default)]
    pub admins: Vec<String>,
    #[serde(default)]
    pub command_prompt: Option<String>,
    #[serde(default)]
    pub max_errors: Option<u32>,
}

impl BotsFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn credentials(&self, bot: &str) -> Option<Credentials> {
        self.bots.get(bot).cloned()
    }

    /// Every other bot in the file.
    pub fn friends_of<'a>(&'a self, bot: &'a str) -> impl Iterator<Item = &'a str> {
        self.bots.keys().map(String::as_str).filter(move |name| *name != bot)
    }
}
