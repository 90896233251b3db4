use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::validation;
use crate::error::{IetError, Result};

/// Environment variable that points at an alternative settings file
pub const CONFIG_ENV: &str = "IETLV_CONFIG";

pub const DEFAULT_IETD_CONFIG: &str = "/etc/iet/ietd.conf";
pub const DEFAULT_VOLUME_TABLE: &str = "/proc/net/iet/volume";
pub const DEFAULT_SESSION_TABLE: &str = "/proc/net/iet/session";

/// How ietd performs I/O against a LUN's backing device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoType {
    #[default]
    Blockio,
    Fileio,
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoType::Blockio => write!(f, "blockio"),
            IoType::Fileio => write!(f, "fileio"),
        }
    }
}

impl FromStr for IoType {
    type Err = IetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "blockio" => Ok(IoType::Blockio),
            "fileio" => Ok(IoType::Fileio),
            other => Err(IetError::invalid_input(format!(
                "unknown iotype '{}' (expected blockio or fileio)",
                other
            ))),
        }
    }
}

/// Persisted defaults, stored as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base IQN; the full target name is `<iqn_base>:<name>`
    #[serde(default)]
    pub iqn_base: Option<String>,
    /// Volume group that backs new LUNs
    #[serde(default)]
    pub volgroup: Option<String>,
    /// Static ietd configuration kept in sync with the running daemon
    #[serde(default = "default_ietd_config")]
    pub ietd_config: PathBuf,
    #[serde(default = "default_volume_table")]
    pub volume_table: PathBuf,
    #[serde(default = "default_session_table")]
    pub session_table: PathBuf,
    #[serde(default)]
    pub iotype: IoType,
    #[serde(default = "default_daemon")]
    pub daemon: String,
    #[serde(default = "default_daemon_user")]
    pub daemon_user: String,
}

fn default_ietd_config() -> PathBuf {
    PathBuf::from(DEFAULT_IETD_CONFIG)
}

fn default_volume_table() -> PathBuf {
    PathBuf::from(DEFAULT_VOLUME_TABLE)
}

fn default_session_table() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_TABLE)
}

fn default_daemon() -> String {
    "ietd".to_string()
}

fn default_daemon_user() -> String {
    "root".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            iqn_base: None,
            volgroup: None,
            ietd_config: default_ietd_config(),
            volume_table: default_volume_table(),
            session_table: default_session_table(),
            iotype: IoType::default(),
            daemon: default_daemon(),
            daemon_user: default_daemon_user(),
        }
    }
}

/// Per-invocation values that take precedence over the persisted defaults
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub iqn_base: Option<String>,
    pub volgroup: Option<String>,
    pub ietd_config: Option<PathBuf>,
}

/// Fully resolved settings handed to every operation
#[derive(Debug, Clone)]
pub struct Settings {
    pub iqn_base: Option<String>,
    pub volgroup: Option<String>,
    pub ietd_config: PathBuf,
    pub volume_table: PathBuf,
    pub session_table: PathBuf,
    pub iotype: IoType,
    pub daemon: String,
    pub daemon_user: String,
}

impl Settings {
    /// IQN base, required by anything that names a target
    pub fn iqn_base(&self) -> Result<&str> {
        self.iqn_base.as_deref().ok_or_else(|| {
            IetError::config("no IQN base configured (use 'ietlv set iqn-base <iqn>' or --iqn-base)")
        })
    }

    /// Volume group, required by anything that touches LVM
    pub fn volgroup(&self) -> Result<&str> {
        self.volgroup.as_deref().ok_or_else(|| {
            IetError::config("no volume group configured (use 'ietlv set volgroup <vg>' or --volgroup)")
        })
    }

    /// Lock file guarding ietd.conf edits and TID allocation
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self
            .ietd_config
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "ietd.conf".into());
        name.push(".lock");
        self.ietd_config.with_file_name(name)
    }
}

impl Config {
    /// Load settings from `$IETLV_CONFIG` or the user config directory.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = Self::get_config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No settings file at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::get_config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        log::info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| IetError::config("Could not determine config directory"))?;

        Ok(config_dir.join("ietlv").join("config.json"))
    }

    /// Merge per-call overrides over the stored defaults
    pub fn resolve(&self, overrides: &Overrides) -> Result<Settings> {
        let iqn_base = overrides.iqn_base.clone().or_else(|| self.iqn_base.clone());
        if let Some(base) = &iqn_base {
            validation::validate_iqn_base(base)?;
        }

        let volgroup = overrides.volgroup.clone().or_else(|| self.volgroup.clone());
        if let Some(vg) = &volgroup {
            validation::validate_volgroup(vg)?;
        }

        Ok(Settings {
            iqn_base,
            volgroup,
            ietd_config: overrides
                .ietd_config
                .clone()
                .unwrap_or_else(|| self.ietd_config.clone()),
            volume_table: self.volume_table.clone(),
            session_table: self.session_table.clone(),
            iotype: self.iotype,
            daemon: self.daemon.clone(),
            daemon_user: self.daemon_user.clone(),
        })
    }

    pub fn set_iqn_base(&mut self, iqn_base: String) {
        self.iqn_base = Some(iqn_base);
    }

    pub fn set_volgroup(&mut self, volgroup: String) {
        self.volgroup = Some(volgroup);
    }

    pub fn set_ietd_config(&mut self, path: PathBuf) {
        self.ietd_config = path;
    }

    pub fn set_iotype(&mut self, iotype: IoType) {
        self.iotype = iotype;
    }
}
