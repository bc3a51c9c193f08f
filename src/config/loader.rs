use super::types::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    pub fn new() -> Self {
        let config_path = Self::get_config_path();
        Self { config_path }
    }

    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    fn get_config_path() -> PathBuf {
        // Use executable directory for config file
        // This allows multiple instances to run with different configs
        let exe_path = std::env::current_exe().unwrap_or_else(|_| PathBuf::from("."));

        let exe_dir = exe_path.parent().unwrap_or_else(|| std::path::Path::new("."));

        exe_dir.join("ahbot.toml")
    }

    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            info!(
                "Config file not found, creating default config at {:?}",
                self.config_path
            );
            let config = Config::default();
            self.save(&config)?;
            return Ok(config);
        }

        let contents =
            fs::read_to_string(&self.config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        info!("Loaded configuration from {:?}", self.config_path);
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, toml_string).context("Failed to write config file")?;

        info!("Saved configuration to {:?}", self.config_path);
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_file() {
        let dir = std::env::temp_dir().join("ahbot-config-test");
        let _ = fs::remove_dir_all(&dir);
        let loader = ConfigLoader::with_path(dir.join("ahbot.toml"));

        // First load creates the default file
        let created = loader.load().unwrap();
        assert!(!created.seller.enabled);

        let mut config = created;
        config.seller.enabled = true;
        config.houses.horde = 40;
        loader.save(&config).unwrap();

        let reloaded = loader.load().unwrap();
        assert!(reloaded.seller.enabled);
        assert_eq!(reloaded.houses.horde, 40);

        let _ = fs::remove_dir_all(&dir);
    }
}
