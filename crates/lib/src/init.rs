//! Initialize the configuration directory: create ~/.airbot and a default config.json.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Create the config directory and write the default config if the file does not exist.
/// An existing file is left untouched. Returns the config directory.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        let default_config = serde_json::to_string_pretty(&Config::default())
            .context("serializing default config")?;
        std::fs::write(config_path, default_config)
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    } else {
        log::debug!("config already exists at {}, skipping", config_path.display());
    }

    Ok(config_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("airbot-init-{}-{}", tag, uuid::Uuid::new_v4()))
    }

    #[test]
    fn writes_loadable_default_config() {
        let dir = temp_dir("fresh");
        let path = dir.join("nested").join("config.json");
        let out = init_config_dir(&path).unwrap();
        assert_eq!(out, dir.join("nested"));
        let s = std::fs::read_to_string(&path).unwrap();
        let c: Config = serde_json::from_str(&s).unwrap();
        assert_eq!(c.server.port, 8080);
        assert!(s.contains("\"webhookPath\": \"/callback\""));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn keeps_existing_file() {
        let dir = temp_dir("existing");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"server":{"port":9999}}"#).unwrap();
        init_config_dir(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"server":{"port":9999}}"#
        );
        let _ = std::fs::remove_dir_all(dir);
    }
}
