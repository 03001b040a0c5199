use std::path::Path;

use serde::Deserialize;

use crate::mib::SpeedCapPolicy;

pub const DEFAULT_AGENTX_ADDRESS: &str = "localhost:705";
pub const DEFAULT_PERIOD_SECS: u64 = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub agent: AgentSection,
    pub polling: PollingSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    /// AgentX master address the transport connects to.
    pub address: String,
    /// Encoding of the 32-bit ifSpeed field for links faster than 4.29 Gbps.
    pub speed_cap: SpeedCapPolicy,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            address: DEFAULT_AGENTX_ADDRESS.into(),
            speed_cap: SpeedCapPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollingSection {
    pub period_secs: u64,
    pub timeout_secs: u64,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            period_secs: DEFAULT_PERIOD_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AgentConfig {
    /// Loads the optional TOML config file. An unreadable or malformed file
    /// is logged and ignored; the agent keeps running on defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match std::fs::read_to_string(path) {
            Ok(s) => {
                tracing::info!(path = %path.display(), "loading config file");
                Self::load_from_str(&s)
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "could not read config file, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse config from a string (e.g. for tests). Unknown keys are ignored;
    /// a parse error falls back to defaults.
    pub fn load_from_str(s: &str) -> Self {
        match toml::from_str(s) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "malformed config file, using defaults");
                Self::default()
            }
        }
    }

    /// Command-line flags win over file values.
    pub fn apply_overrides(
        &mut self,
        address: Option<String>,
        period_secs: Option<u64>,
        timeout_secs: Option<u64>,
    ) {
        if let Some(address) = address {
            self.agent.address = address;
        }
        if let Some(period_secs) = period_secs {
            self.polling.period_secs = period_secs;
        }
        if let Some(timeout_secs) = timeout_secs {
            self.polling.timeout_secs = timeout_secs;
        }
    }

    /// Validates the effective (file + CLI) settings.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.agent.address.is_empty(),
            "agent.address must be non-empty"
        );
        anyhow::ensure!(
            self.polling.period_secs > 0,
            "polling.period_secs must be > 0, got {}",
            self.polling.period_secs
        );
        anyhow::ensure!(
            self.polling.timeout_secs > 0,
            "polling.timeout_secs must be > 0, got {}",
            self.polling.timeout_secs
        );
        Ok(())
    }
}
