/// `load_config` module: reads the static YAML configuration and injects API secrets from the environment.
///
/// # Responsibilities
/// - Parse the YAML file into the mount policy ([`MountConfig`]), API and job runner settings
/// - Fill every omitted key with its default, so an empty file is a valid configuration
/// - Read `UPLOADCARE_PUBLIC_KEY` / `UPLOADCARE_SECRET_KEY` from the environment; secrets never live in the file
///
/// # Errors
/// All errors use `anyhow::Error` and name the file, the YAML problem or the missing variable.
use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use tokio::sync::Semaphore;
use tracing::{error, info};
use uploadcare_mount_core::MountConfig;

pub const PUBLIC_KEY_VAR: &str = "UPLOADCARE_PUBLIC_KEY";
pub const SECRET_KEY_VAR: &str = "UPLOADCARE_SECRET_KEY";

pub const DEFAULT_API_BASE_URL: &str = "https://api.uploadcare.com";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub uploadcare: MountConfig,
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub jobs: JobsSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        ApiSection {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobsSection {
    pub max_concurrent: u32,
    pub queue_size: usize,
}

impl Default for JobsSection {
    fn default() -> Self {
        JobsSection {
            max_concurrent: 4,
            queue_size: 100,
        }
    }
}

/// API key pair for the Uploadcare REST API.
#[derive(Clone, Default)]
pub struct Credentials {
    pub public_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Loads the static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty document deserializes to unit, not a map.
    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(CliConfig::default());
    }

    let config: CliConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if config.jobs.max_concurrent == 0 || config.jobs.queue_size == 0 {
        anyhow::bail!("jobs.max_concurrent and jobs.queue_size must be at least 1");
    }
    if config.jobs.max_concurrent as usize > Semaphore::MAX_PERMITS
        || config.jobs.queue_size > Semaphore::MAX_PERMITS
    {
        anyhow::bail!(
            "jobs.max_concurrent and jobs.queue_size must not exceed {}",
            Semaphore::MAX_PERMITS
        );
    }

    config.uploadcare.trace_loaded();
    info!(
        base_url = %config.api.base_url,
        max_concurrent = config.jobs.max_concurrent,
        queue_size = config.jobs.queue_size,
        "Config loaded successfully"
    );
    Ok(config)
}

/// Reads the API key pair from the environment.
pub fn credentials_from_env() -> Result<Credentials> {
    let public_key = require_env(PUBLIC_KEY_VAR)?;
    let secret_key = require_env(SECRET_KEY_VAR)?;
    info!("Uploadcare API credentials found in env");
    Ok(Credentials {
        public_key,
        secret_key,
    })
}

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        Ok(_) => {
            error!(var = name, "Environment variable is empty");
            Err(anyhow::anyhow!("{name} environment variable is empty"))
        }
        Err(e) => {
            error!(error = ?e, var = name, "Environment variable not set");
            Err(anyhow::anyhow!("{name} environment variable not set: {e}"))
        }
    }
}
