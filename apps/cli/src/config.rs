use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_MONTHS: u32 = 6;
const DEFAULT_FORMAT: &str = "text";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Months covered by `generate` when `--months` is not given.
    pub default_months: u32,
    /// Format used by `generate` when `--format` is not given.
    pub default_format: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_months: DEFAULT_MONTHS,
            default_format: DEFAULT_FORMAT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: CliConfig,
    pub file: PathBuf,
    pub created: bool,
}

pub fn load_or_create(dir: &Path) -> Result<ConfigLoad, String> {
    fs::create_dir_all(dir)
        .map_err(|err| format!("create config dir {}: {}", dir.display(), err))?;
    let file = dir.join(CONFIG_FILE_NAME);

    if file.exists() {
        let contents = fs::read_to_string(&file)
            .map_err(|err| format!("read config {}: {}", file.display(), err))?;
        let config: CliConfig = toml::from_str(&contents)
            .map_err(|err| format!("parse config {}: {}", file.display(), err))?;
        return Ok(ConfigLoad {
            config,
            file,
            created: false,
        });
    }

    let config = CliConfig::default();
    let contents =
        toml::to_string_pretty(&config).map_err(|err| format!("serialize config: {}", err))?;
    fs::write(&file, contents).map_err(|err| format!("write config {}: {}", file.display(), err))?;

    Ok(ConfigLoad {
        config,
        file,
        created: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_default_config_once() {
        let dir = tempfile::tempdir().expect("temp dir");
        let first = load_or_create(dir.path()).expect("create");
        assert!(first.created);
        assert_eq!(first.config, CliConfig::default());

        let second = load_or_create(dir.path()).expect("load");
        assert!(!second.created);
        assert_eq!(second.config.default_months, 6);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join(CONFIG_FILE_NAME), "default_format = \"csv\"\n").expect("seed");
        let loaded = load_or_create(dir.path()).expect("load");
        assert_eq!(loaded.config.default_format, "csv");
        assert_eq!(loaded.config.default_months, 6);
    }

    #[test]
    fn malformed_config_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join(CONFIG_FILE_NAME), "default_months = \"many\"\n").expect("seed");
        let err = load_or_create(dir.path()).expect_err("parse error");
        assert!(err.starts_with("parse config"));
    }
}
