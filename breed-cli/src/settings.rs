//! Resolution of the data directory, config file and database path.

use anyhow::{Context, Result};
use breed_client::BreedsClient;
use breed_store::Config;
use std::path::{Path, PathBuf};

/// Default config file name inside the data directory.
pub const CONFIG_FILE: &str = "breeds.toml";

/// Default database file name inside the data directory.
pub const DATABASE_FILE: &str = "breeds.db";

/// Everything a command needs to open the client.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Loaded configuration, with overrides applied.
    pub config: Config,
    /// Database file to open.
    pub database: PathBuf,
}

impl Settings {
    /// Resolve settings from the command-line overrides.
    ///
    /// An explicit `--config` must exist; the default config file is optional.
    pub async fn resolve(
        data_dir: Option<PathBuf>,
        config: Option<PathBuf>,
        database: Option<PathBuf>,
        api_key: Option<String>,
    ) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        tokio::fs::create_dir_all(&data_dir)
            .await
            .context("Failed to create data directory")?;

        let config = match config {
            Some(path) => Config::from_file(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::load_or_default(&data_dir.join(CONFIG_FILE))
                .context("Failed to load default config")?,
        };
        let config = config.with_env_overrides().with_api_key_override(api_key);

        let database = database
            .or_else(|| config.storage.database.clone())
            .map(|path| resolve_against(&data_dir, path))
            .unwrap_or_else(|| data_dir.join(DATABASE_FILE));

        Ok(Self { config, database })
    }

    /// Open the client against the resolved database and remote.
    pub async fn open(&self) -> Result<BreedsClient> {
        BreedsClient::open(&self.config, &self.database)
            .await
            .with_context(|| format!("Failed to open {}", self.database.display()))
    }
}

fn resolve_against(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Get the default data directory for breeds.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("io", "ydun", "breeds")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn defaults_live_in_data_dir() {
        let dir = tempdir().unwrap();
        let settings = Settings::resolve(Some(dir.path().to_path_buf()), None, None, None)
            .await
            .unwrap();

        assert_eq!(settings.database, dir.path().join(DATABASE_FILE));
        assert_eq!(settings.config.search.debounce_ms, 1350);
    }

    #[tokio::test]
    async fn config_file_database_is_relative_to_data_dir() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[storage]\ndatabase = \"cats.db\"\n",
        )
        .unwrap();

        let settings = Settings::resolve(Some(dir.path().to_path_buf()), None, None, None)
            .await
            .unwrap();
        assert_eq!(settings.database, dir.path().join("cats.db"));
    }

    #[tokio::test]
    async fn database_flag_wins() {
        let dir = tempdir().unwrap();
        let explicit = dir.path().join("elsewhere.db");

        let settings = Settings::resolve(
            Some(dir.path().to_path_buf()),
            None,
            Some(explicit.clone()),
            None,
        )
        .await
        .unwrap();
        assert_eq!(settings.database, explicit);
    }

    #[tokio::test]
    async fn missing_explicit_config_fails() {
        let dir = tempdir().unwrap();
        let result = Settings::resolve(
            Some(dir.path().to_path_buf()),
            Some(dir.path().join("absent.toml")),
            None,
            None,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn api_key_flag_overrides() {
        let dir = tempdir().unwrap();
        let settings = Settings::resolve(
            Some(dir.path().to_path_buf()),
            None,
            None,
            Some("secret".into()),
        )
        .await
        .unwrap();
        assert_eq!(settings.config.remote.api_key.as_deref(), Some("secret"));
    }
}
