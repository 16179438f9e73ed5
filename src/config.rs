//! Config model and persistence helpers.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Top-level configuration stored in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings.
    pub api: ApiCfg,
    /// Local upload sources.
    pub upload: UploadCfg,
    /// User profile values.
    pub user: UserCfg,
}

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCfg {
    /// Base URL every call is relative to.
    pub base_url: String,
    /// Path of the persisted session token file.
    pub session_file: String,
}

/// Local upload sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadCfg {
    /// Directory scanned for ASN spreadsheet files.
    pub input_dir: String,
}

/// User profile values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCfg {
    /// Login email, prefilled on the login screen.
    pub email: String,
}

impl Config {
    /// Load from disk or create defaults when missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)?;
            Ok(toml::from_str(&s)?)
        } else {
            let cfg = Self::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    /// Persist the config as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let s = toml::to_string_pretty(self)?;
        fs::write(path, s)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiCfg {
                base_url: "https://blinker-api.onrender.com".into(),
                session_file: "session.json".into(),
            },
            upload: UploadCfg {
                input_dir: "asn_files".into(),
            },
            user: UserCfg { email: "".into() },
        }
    }
}
