//! Client Configuration Module
//!
//! Provides settings loading for GovTalk clients.
//! Supports loading from TOML files with environment-specific overrides.

use crate::gateway::defaults;
use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Settings needed to construct a GovTalk client
#[derive(Deserialize, Serialize, Clone)]
pub struct ClientSettings {
    /// Gateway submission endpoint
    pub gateway_url: String,

    /// Endpoint used instead of `gateway_url` while test mode is on
    #[serde(default)]
    pub test_gateway_url: Option<String>,

    /// Gateway sender id
    pub sender_id: String,

    /// Gateway password
    pub password: String,

    #[serde(default)]
    pub test_mode: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Re-read each packaged envelope for well-formedness before sending
    #[serde(default)]
    pub schema_validation: bool,

    /// Record rejected setter calls in the client's error collector
    #[serde(default = "default_true")]
    pub record_validation_errors: bool,
}

fn default_timeout_secs() -> u64 {
    defaults::REQUEST_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    defaults::USER_AGENT.to_string()
}

fn default_true() -> bool {
    true
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("gateway_url", &self.gateway_url)
            .field("test_gateway_url", &self.test_gateway_url)
            .field("sender_id", &self.sender_id)
            .field("password", &"<redacted>")
            .field("test_mode", &self.test_mode)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("schema_validation", &self.schema_validation)
            .field("record_validation_errors", &self.record_validation_errors)
            .finish()
    }
}

impl ClientSettings {
    /// Settings with defaults for everything but the endpoint and credentials
    pub fn new(
        gateway_url: impl Into<String>,
        sender_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            test_gateway_url: None,
            sender_id: sender_id.into(),
            password: password.into(),
            test_mode: false,
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            schema_validation: false,
            record_validation_errors: true,
        }
    }

    /// Load settings from files with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new("config/govtalk.toml"));

        let mut builder = Config::builder().add_source(File::from(base).required(true));

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = base
                .parent()
                .unwrap_or(Path::new("config"))
                .join("environments")
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (GOVTALK_ prefix)
        builder = builder.add_source(
            Environment::with_prefix("GOVTALK")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Expand `${VAR}` references in endpoint and credential values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        self.gateway_url = shellexpand::env(&self.gateway_url)
            .context("Failed to expand gateway URL")?
            .into_owned();

        if let Some(test_url) = &self.test_gateway_url {
            let expanded =
                shellexpand::env(test_url).context("Failed to expand test gateway URL")?;
            self.test_gateway_url = Some(expanded.into_owned());
        }

        self.sender_id = shellexpand::env(&self.sender_id)
            .context("Failed to expand sender id")?
            .into_owned();

        self.password = shellexpand::env(&self.password)
            .context("Failed to expand password")?
            .into_owned();

        debug!(gateway = %self.gateway_url, "Expanded client settings");
        Ok(())
    }
}

/// Convenience function to load settings with defaults
pub fn load_settings(path: Option<PathBuf>, environment: Option<&str>) -> Result<ClientSettings> {
    let mut settings = ClientSettings::load(path.as_deref(), environment)?;
    settings.expand_env_vars()?;
    Ok(settings)
}
