use directories::ProjectDirs;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, ser::SerializeMap};
use std::{
    fs,
    io::{self},
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No home directory found")]
    NoHomeDir,

    #[error("Failed to create config directory: {0}")]
    CreateConfigDir(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Credentials for accessing the Kagami evaluation API.
/// Sources, in order of precedence:
/// - CLI arguments (by clap)
/// - Environment variables (`KAGAMI_API_URL` / `KAGAMI_API_KEY`, dotenv honored)
/// - Credentials file under the config dir (or an explicit directory)
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    /// API key for bearer authentication
    pub api_key: SecretString,

    /// Evaluation server base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    // for internal use
    credentials_dir: Option<String>,
}

/// Masked rendering for terminal output: everything but the last 4
/// characters is hidden.
pub fn partial_show_secret(secret: &SecretString) -> String {
    let exposed = secret.expose_secret();
    if exposed.chars().count() <= 4 {
        "**************************".to_string()
    } else {
        let tail: String = exposed
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("**********************{}", tail)
    }
}

impl Serialize for Credentials {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        // credentials_dir never hits the file
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("api_key", &self.api_key.expose_secret())?;
        map.serialize_entry("api_url", &self.api_url)?;
        map.end()
    }
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            api_key: SecretString::new(Box::default()),
            api_url: default_api_url(),
            credentials_dir: None,
        }
    }
}

impl Credentials {
    pub fn new(credentials_dir: String) -> Self {
        Self {
            credentials_dir: Some(credentials_dir),
            ..Default::default()
        }
    }

    /// Resolves the effective credentials: the file (when a directory is
    /// given) overlaid by any explicit url/key.
    pub fn initialize(
        credentials_dir: Option<String>,
        url: Option<String>,
        key: Option<String>,
    ) -> Self {
        let mut credentials = if let Some(dir) = credentials_dir {
            let mut credentials = Credentials::new(dir);
            let _ = credentials.load_credentials();
            credentials
        } else {
            Credentials::default()
        };

        if let Some(url) = url {
            if !url.is_empty() {
                credentials.api_url = url;
            }
        }

        if let Some(key) = key {
            if !key.is_empty() {
                credentials.api_key = SecretString::new(Box::from(key));
            }
        }
        credentials
    }

    /// Path of the credentials file, creating the directory if needed.
    pub fn credentials_file_path(&self) -> ConfigResult<PathBuf> {
        if let Some(parent) = self.credentials_dir.clone() {
            let parent_path = Path::new(&parent);
            if !parent_path.exists() {
                fs::create_dir_all(parent_path)
                    .map_err(|e| ConfigError::CreateConfigDir(e.to_string()))?;
            }
            return Ok(parent_path.join("credentials.json"));
        }

        let proj_dirs =
            ProjectDirs::from("com", "kagami", "kagami-cli").ok_or(ConfigError::NoHomeDir)?;
        let config_dir = proj_dirs.config_dir();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)
                .map_err(|e| ConfigError::CreateConfigDir(e.to_string()))?;
        }

        Ok(config_dir.join("credentials.json"))
    }

    pub fn load_credentials(&mut self) -> ConfigResult<Credentials> {
        let file_path = self.credentials_file_path()?;
        if file_path.exists() {
            let contents = fs::read_to_string(&file_path)?;
            let loaded: Self = serde_json::from_str(&contents)?;
            self.api_key = loaded.api_key;
            self.api_url = loaded.api_url;
        }

        Ok(self.clone())
    }

    pub fn save_credentials(&self) -> ConfigResult<()> {
        let file_path = self.credentials_file_path()?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(file_path, json)?;
        Ok(())
    }
}
