//! # Deployment Configuration Module
//!
//! Deployment configuration: where song events go and how the confirmation
//! sound is played. Loaded once from a JSON file at startup.

use anyhow::{Context, Result};
use ocarina_core::ListenerConfig;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "OCARINA_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub listener: ListenerConfig,
    pub osc: OscConfig,
    pub webhooks: Vec<WebhookConfig>,
    pub feedback: FeedbackConfig,
}

/// Where the OSC notifier sends song ids.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OscConfig {
    pub enabled: bool,
    /// `host:port` of the receiving broker.
    pub target: String,
    /// OSC address the song id is published under.
    pub address: String,
}

impl Default for OscConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target: "127.0.0.1:9000".to_string(),
            address: "/songID".to_string(),
        }
    }
}

/// An HTTP endpoint called when one particular song is played.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    pub song_id: u8,
    pub url: String,
    #[serde(default = "default_webhook_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_webhook_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub enabled: bool,
    /// WAV file to play. A synthesised chime is used when absent.
    pub sound: Option<PathBuf>,
    /// Output gain, 0.0 to 1.0.
    pub volume: f32,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: None,
            volume: 0.5,
        }
    }
}

impl DeploymentConfig {
    /// Loads the configuration from a JSON file.
    ///
    /// # Arguments
    /// * `path` - File path to load the configuration from (e.g., "ocarina.json")
    pub fn load(path: &Path) -> Result<Self> {
        let mut file =
            File::open(path).with_context(|| format!("opening config {}", path.display()))?;
        let mut data = String::new();
        file.read_to_string(&mut data)?;
        let config: DeploymentConfig = serde_json::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.listener.validate()?;
        Ok(config)
    }

    /// Loads `path` when one was given, otherwise the built-in defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
