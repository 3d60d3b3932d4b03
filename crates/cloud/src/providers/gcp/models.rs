//! GCP API request and response models.

use serde::{Deserialize, Serialize};

// ============================================================================
// Operation types
// ============================================================================

/// Terminal operation status.
pub const STATUS_DONE: &str = "DONE";

/// GCP operation (async task).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Operation name.
    pub name: String,
    /// Status: `PENDING`, `RUNNING` or `DONE`.
    pub status: String,
    /// Target link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_link: Option<String>,
    /// Operation type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    /// Error payload, populated only when terminal and failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

impl Operation {
    /// Whether the operation has reached its terminal state.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == STATUS_DONE
    }
}

/// Operation error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationError {
    /// Errors.
    #[serde(default)]
    pub errors: Vec<OperationErrorDetail>,
}

/// Operation error detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationErrorDetail {
    /// Error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl std::fmt::Display for OperationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "unknown error");
        }
        let messages: Vec<&str> = self
            .errors
            .iter()
            .map(|e| e.message.as_deref().unwrap_or("unknown error"))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

// ============================================================================
// Address types
// ============================================================================

/// A reserved static external IP address.
///
/// `address` is assigned by the control plane and stays empty until the
/// allocation operation is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Address name (caller-assigned, unique within region).
    pub name: String,
    /// Assigned IP value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Address {
    /// Allocation request body for a named address.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
        }
    }
}

// ============================================================================
// Firewall types
// ============================================================================

/// An ingress firewall rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRule {
    /// Rule name.
    pub name: String,
    /// Allowed (protocol, ports) entries.
    pub allowed: Vec<Allowed>,
    /// Traffic direction (`INGRESS`).
    pub direction: String,
    /// Source CIDR ranges.
    pub source_ranges: Vec<String>,
    /// Network tags of the instances this rule applies to.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub target_tags: Vec<String>,
}

/// Allowed protocol and port list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allowed {
    /// IP protocol (e.g. "tcp").
    #[serde(rename = "IPProtocol")]
    pub ip_protocol: String,
    /// Port numbers, as strings per the API.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub ports: Vec<String>,
}

// ============================================================================
// Instance types
// ============================================================================

/// Desired compute instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSpec {
    /// Instance name.
    pub name: String,
    /// Machine type (URL).
    pub machine_type: String,
    /// Disks.
    pub disks: Vec<AttachedDisk>,
    /// Network interfaces.
    pub network_interfaces: Vec<NetworkInterface>,
    /// Network tags, matched against firewall `target_tags`.
    pub tags: Tags,
}

/// Attached disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedDisk {
    /// Boot disk.
    pub boot: bool,
    /// Delete the disk with the instance.
    pub auto_delete: bool,
    /// Initialize params.
    pub initialize_params: InitializeParams,
}

/// Disk initialization parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Source image (URL).
    pub source_image: String,
    /// Disk size in GB. The API takes int64 fields as strings.
    pub disk_size_gb: String,
}

/// Network interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    /// Network (URL).
    pub network: String,
    /// Access configs (for external IP).
    pub access_configs: Vec<AccessConfig>,
}

/// Access configuration binding an external address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessConfig {
    /// Display name.
    pub name: String,
    /// Access type.
    #[serde(rename = "type")]
    pub access_type: String,
    /// External NAT IP.
    #[serde(rename = "natIP", skip_serializing_if = "Option::is_none")]
    pub nat_ip: Option<String>,
}

/// Instance network tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tags {
    /// Tag items.
    pub items: Vec<String>,
}

/// Compose the machine-type URL the API expects from a zone and a short
/// name like `n1-standard-2`.
#[must_use]
pub fn machine_type_url(zone: &str, machine_type: &str) -> String {
    format!("zones/{zone}/machineTypes/{machine_type}")
}

// ============================================================================
// Common GCP constants
// ============================================================================

/// Default VPC network reference.
pub const DEFAULT_NETWORK: &str = "global/networks/default";

/// One-to-one NAT access type for external connectivity.
pub const ONE_TO_ONE_NAT: &str = "ONE_TO_ONE_NAT";

/// Common GCP images.
pub mod images {
    /// Ubuntu 24.04 LTS.
    pub const UBUNTU_24_04: &str =
        "projects/ubuntu-os-cloud/global/images/family/ubuntu-2404-lts-amd64";
    /// Ubuntu 22.04 LTS.
    pub const UBUNTU_22_04: &str = "projects/ubuntu-os-cloud/global/images/family/ubuntu-2204-lts";
    /// Ubuntu 20.04 LTS.
    pub const UBUNTU_20_04: &str = "projects/ubuntu-os-cloud/global/images/family/ubuntu-2004-lts";
    /// Debian 12.
    pub const DEBIAN_12: &str = "projects/debian-cloud/global/images/family/debian-12";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_machine_type_url() {
        assert_eq!(
            machine_type_url("us-central1-a", "n1-standard-2"),
            "zones/us-central1-a/machineTypes/n1-standard-2"
        );
    }

    #[test]
    fn test_operation_terminality() {
        let op = Operation {
            name: "op-1".to_string(),
            status: "RUNNING".to_string(),
            target_link: None,
            operation_type: None,
            error: None,
        };
        assert!(!op.is_done());

        let op = Operation {
            status: STATUS_DONE.to_string(),
            ..op
        };
        assert!(op.is_done());
    }

    #[test]
    fn test_operation_error_display() {
        let error = OperationError {
            errors: vec![
                OperationErrorDetail {
                    code: Some("QUOTA_EXCEEDED".to_string()),
                    message: Some("quota exceeded".to_string()),
                },
                OperationErrorDetail {
                    code: None,
                    message: Some("region exhausted".to_string()),
                },
            ],
        };
        assert_eq!(error.to_string(), "quota exceeded; region exhausted");

        let empty = OperationError { errors: vec![] };
        assert_eq!(empty.to_string(), "unknown error");
    }

    #[test]
    fn test_access_config_wire_casing() {
        let config = AccessConfig {
            name: "External_NAT".to_string(),
            access_type: ONE_TO_ONE_NAT.to_string(),
            nat_ip: Some("34.1.2.3".to_string()),
        };

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["natIP"], "34.1.2.3");
        assert_eq!(json["type"], "ONE_TO_ONE_NAT");
    }

    #[test]
    fn test_firewall_wire_casing() {
        let rule = FirewallRule {
            name: "allow-ssh-http".to_string(),
            allowed: vec![Allowed {
                ip_protocol: "tcp".to_string(),
                ports: vec!["22".to_string(), "80".to_string()],
            }],
            direction: "INGRESS".to_string(),
            source_ranges: vec!["0.0.0.0/0".to_string()],
            target_tags: vec!["http-server".to_string()],
        };

        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["allowed"][0]["IPProtocol"], "tcp");
        assert_eq!(json["sourceRanges"][0], "0.0.0.0/0");
        assert_eq!(json["targetTags"][0], "http-server");
    }

    #[test]
    fn test_operation_error_roundtrip() {
        let body = r#"{
            "name": "operation-123",
            "status": "DONE",
            "error": {"errors": [{"code": "QUOTA_EXCEEDED", "message": "quota exceeded"}]}
        }"#;

        let op: Operation = serde_json::from_str(body).unwrap();
        assert!(op.is_done());
        let error = op.error.expect("error payload");
        assert_eq!(error.errors[0].message.as_deref(), Some("quota exceeded"));
    }
}
