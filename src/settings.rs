use crate::CONFY_APP_NAME;

use log::warn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Directory `list` falls back to when none is given.
    pub last_dir: Option<PathBuf>,
    /// Copy a file aside before overwriting it in place.
    pub backup: bool,
    pub backup_suffix: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            last_dir: None,
            backup: true,
            backup_suffix: ".bak".to_string(),
        }
    }
}

impl ToolSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "tool").unwrap_or_default()
    }

    pub fn save(&self) {
        if let Err(e) = confy::store(CONFY_APP_NAME, "tool", self) {
            warn!("could not save settings: {e}");
        }
    }

    pub fn backup_path(&self, path: &std::path::Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(&self.backup_suffix);
        PathBuf::from(name)
    }
}
