//! Provisioning configuration.
//!
//! All names, sizing and location parameters live here, loaded from a
//! TOML file. Nothing is hardcoded in the provisioning path.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::providers::gcp::models::images;
use crate::providers::ProvisionError;

/// Configuration for one provisioning run.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvisionConfig {
    /// GCP project ID.
    pub project: String,
    /// Region for the static address (e.g. "us-central1").
    pub region: String,
    /// Zone for the instance (e.g. "us-central1-a").
    pub zone: String,

    /// Name of the reserved address.
    #[serde(default = "default_address_name")]
    pub address_name: String,
    /// Name of the firewall rule.
    #[serde(default = "default_firewall_name")]
    pub firewall_name: String,
    /// Name of the instance.
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// Machine type short name (e.g. "n1-standard-2").
    #[serde(default = "default_machine_type")]
    pub machine_type: String,
    /// Boot disk capacity in GB.
    #[serde(default = "default_disk_size_gb")]
    pub disk_size_gb: u64,
    /// Boot disk source image reference.
    #[serde(default = "default_source_image")]
    pub source_image: String,

    /// Network tags applied to the instance and targeted by the
    /// firewall rule. One field feeds both sides, so the association
    /// cannot drift.
    #[serde(default = "default_network_tags")]
    pub network_tags: Vec<String>,

    /// Firewall rule contents.
    #[serde(default)]
    pub firewall: FirewallConfig,

    /// Seconds between operation status polls.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Optional deadline in seconds for each operation wait.
    #[serde(default)]
    pub poll_timeout_secs: Option<u64>,
}

/// Ingress rule contents.
#[derive(Debug, Clone, Deserialize)]
pub struct FirewallConfig {
    /// IP protocol.
    #[serde(default = "default_protocol")]
    pub protocol: String,
    /// Allowed ports.
    #[serde(default = "default_ports")]
    pub ports: Vec<u16>,
    /// Source CIDR ranges. The default admits all of IPv4; restrict it
    /// in production configs.
    #[serde(default = "default_source_ranges")]
    pub source_ranges: Vec<String>,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            ports: default_ports(),
            source_ranges: default_source_ranges(),
        }
    }
}

fn default_address_name() -> String {
    "vm-static-ip".to_string()
}

fn default_firewall_name() -> String {
    "allow-ssh-http".to_string()
}

fn default_instance_name() -> String {
    "vm-instance".to_string()
}

fn default_machine_type() -> String {
    "n1-standard-2".to_string()
}

fn default_disk_size_gb() -> u64 {
    250
}

fn default_source_image() -> String {
    images::UBUNTU_22_04.to_string()
}

fn default_network_tags() -> Vec<String> {
    vec!["http-server".to_string(), "ssh-server".to_string()]
}

fn default_protocol() -> String {
    "tcp".to_string()
}

fn default_ports() -> Vec<u16> {
    vec![22, 80]
}

fn default_source_ranges() -> Vec<String> {
    vec!["0.0.0.0/0".to_string()]
}

fn default_poll_interval_secs() -> u64 {
    1
}

impl ProvisionConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns [`ProvisionError::Config`] if the file cannot be read or
    /// parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProvisionError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ProvisionError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| ProvisionError::Config(format!("{}: {e}", path.display())))?;
        Ok(config)
    }

    /// Validate the configuration before any request is submitted.
    ///
    /// # Errors
    /// Returns [`ProvisionError::Config`] describing the first problem
    /// found.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        let required = [
            ("project", &self.project),
            ("region", &self.region),
            ("zone", &self.zone),
            ("address_name", &self.address_name),
            ("firewall_name", &self.firewall_name),
            ("instance_name", &self.instance_name),
            ("machine_type", &self.machine_type),
            ("source_image", &self.source_image),
        ];
        for (field, value) in required {
            if value.is_empty() {
                return Err(ProvisionError::Config(format!("{field} must not be empty")));
            }
        }

        // Zones are named "<region>-<letter>".
        if !self.zone.starts_with(&self.region) {
            return Err(ProvisionError::Config(format!(
                "zone {} is not in region {}",
                self.zone, self.region
            )));
        }

        if self.disk_size_gb == 0 {
            return Err(ProvisionError::Config(
                "disk_size_gb must be greater than zero".to_string(),
            ));
        }

        if self.network_tags.is_empty() {
            return Err(ProvisionError::Config(
                "network_tags must not be empty; the firewall rule matches instances by tag"
                    .to_string(),
            ));
        }

        if self.firewall.ports.is_empty() {
            return Err(ProvisionError::Config(
                "firewall.ports must not be empty".to_string(),
            ));
        }

        if self.firewall.source_ranges.is_empty() {
            return Err(ProvisionError::Config(
                "firewall.source_ranges must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Interval between operation status polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Optional deadline for each operation wait.
    #[must_use]
    pub fn poll_timeout(&self) -> Option<Duration> {
        self.poll_timeout_secs.map(Duration::from_secs)
    }
}
