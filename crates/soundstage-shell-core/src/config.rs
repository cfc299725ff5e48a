use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the readiness probe polling loop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProbeConfig {
    /// Overall deadline for the backend to become ready (in milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Delay between health-check attempts (in milliseconds)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl ProbeConfig {
    /// Create a ProbeConfig with the stock deadline and interval
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ProbeConfig with short delays, suitable for tests and
    /// development loops where the backend binds its port immediately
    pub fn quick() -> Self {
        Self {
            timeout_ms: 1_000,
            interval_ms: 100,
        }
    }

    /// Validate the configuration and return errors if invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval_ms == 0 {
            return Err(anyhow::anyhow!("interval_ms must be greater than zero"));
        }

        if self.interval_ms > self.timeout_ms {
            return Err(anyhow::anyhow!(
                "interval_ms cannot be greater than timeout_ms"
            ));
        }

        if self.timeout_ms > 120_000 {
            return Err(anyhow::anyhow!("timeout_ms should not exceed 120 seconds"));
        }

        Ok(())
    }

    /// Get the overall deadline as Duration
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }

    /// Get the inter-attempt delay as Duration
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interval_ms)
    }

    /// Number of delayed re-attempts after the initial one; the total
    /// wall-clock spent sleeping is bounded by the configured timeout
    pub fn max_retries(&self) -> usize {
        (self.timeout_ms / self.interval_ms) as usize
    }
}

/// Where the backend binary lives relative to the shell installation
#[derive(Debug, Clone, PartialEq)]
pub enum Deployment {
    /// Running from a source checkout; binaries under `<root>/bin`
    Development { root: PathBuf },
    /// Running from a packaged install; binaries under `<resources>/bin`
    Packaged { resources: PathBuf },
}

impl Default for Deployment {
    fn default() -> Self {
        Deployment::Development {
            root: PathBuf::from("."),
        }
    }
}

/// Main shell configuration
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(setter(into, strip_option))]
pub struct ShellConfig {
    pub name: String,
    pub version: String,
    #[builder(default)]
    pub deployment: Deployment,
    /// Loopback URL polled by the readiness probe
    #[builder(default = "default_health_url()")]
    pub health_url: String,
    #[builder(default)]
    pub probe: ProbeConfig,
    /// Whether closing all windows leaves the host application running
    /// (the macOS convention); the child process is stopped either way
    #[builder(default = "cfg!(target_os = \"macos\")")]
    pub persistent_session: bool,
}

impl ShellConfig {
    pub fn builder() -> ShellConfigBuilder {
        ShellConfigBuilder::default()
    }

    /// Resolve the backend binary path for the platform we are running on
    pub fn backend_binary(&self) -> PathBuf {
        crate::binary::resolve_server_binary(&self.deployment, std::env::consts::OS)
    }
}

// Default value functions for serde and the builder
fn default_timeout_ms() -> u64 {
    10_000
}
fn default_interval_ms() -> u64 {
    500
}
fn default_health_url() -> String {
    "http://127.0.0.1:8000/".to_string()
}
