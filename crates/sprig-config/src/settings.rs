use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::file::ConfigFile;

const SECTION: &str = "core";

/// Typed view of the `[core]` section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreSettings {
    /// Whether executable bits in the working tree are trusted.
    pub filemode: bool,
    /// Whether the repository has no working tree.
    pub bare: bool,
    /// Whether commits record the previous head in `ORIG_HEAD`.
    pub local_ref_updates: bool,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            filemode: false,
            bare: false,
            local_ref_updates: true,
        }
    }
}

impl CoreSettings {
    /// Read `[core]` from `config`. Missing keys take their default.
    pub fn from_config(config: &ConfigFile) -> ConfigResult<Self> {
        let defaults = Self::default();
        Ok(Self {
            filemode: read_bool(config, "filemode", defaults.filemode)?,
            bare: read_bool(config, "bare", defaults.bare)?,
            local_ref_updates: read_bool(config, "localrefupdates", defaults.local_ref_updates)?,
        })
    }

    /// Write these settings into `config`, replacing any existing values.
    pub fn write_to(&self, config: &mut ConfigFile) {
        for (key, value) in [
            ("filemode", self.filemode),
            ("bare", self.bare),
            ("localrefupdates", self.local_ref_updates),
        ] {
            config.replace_all(SECTION, key, &value.to_string());
        }
    }
}

fn read_bool(config: &ConfigFile, key: &str, default: bool) -> ConfigResult<bool> {
    let Some(value) = config.get(SECTION, key) else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: format!("{SECTION}.{key}"),
            value: value.to_string(),
        }),
    }
}
