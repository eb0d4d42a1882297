// Synapse Host - Configuration
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Broker base URL and loop timings. Defaults compiled in, base URL
// overridable through SYNAPSE_URL. Nothing is read from or written to disk.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Hosted broker used when SYNAPSE_URL is not set
pub const DEFAULT_BASE_URL: &str = "https://synapse-worker.s-oadisa-dev.workers.dev";

/// Environment variable overriding the broker base URL
pub const BASE_URL_ENV: &str = "SYNAPSE_URL";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("URL must start with http:// or https://")]
    InvalidScheme(String),
}

/// Runtime configuration for the host agent
#[derive(Debug, Clone, Serialize)]
pub struct AgentConfig {
    /// Session broker base URL (no trailing slash)
    pub base_url: String,
    /// Pause after a fault while processing one frame
    #[serde(with = "duration_ms")]
    pub frame_error_pause: Duration,
    /// Pause before retrying a connection attempt that failed outright
    #[serde(with = "duration_ms")]
    pub connect_retry_pause: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            frame_error_pause: Duration::from_secs(1),
            connect_retry_pause: Duration::from_secs(1),
        }
    }
}

impl AgentConfig {
    /// Defaults with SYNAPSE_URL applied, if set
    pub fn from_env() -> Self {
        Self::with_base_url(std::env::var(BASE_URL_ENV).ok())
    }

    /// Defaults with an optional base URL override.
    /// Empty overrides are ignored.
    pub fn with_base_url(base_url: Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        config
    }

    /// Reject base URLs without a recognised scheme
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.starts_with("http://") || self.base_url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidScheme(self.base_url.clone()))
        }
    }

    /// Broker endpoint that hands out sessions
    pub fn new_session_url(&self) -> String {
        format!("{}/api/new-session", self.base_url)
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

// ============================================================================
// TESTS
// ============================================================================
