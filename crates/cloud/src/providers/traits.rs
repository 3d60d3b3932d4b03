//! Control-plane trait and error types.

use async_trait::async_trait;
use thiserror::Error;

use super::gcp::models::{Address, FirewallRule, InstanceSpec, Operation, OperationError};

/// Errors that can occur while provisioning.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// HTTP request failed before the control plane answered.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Control plane rejected the request.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Authentication error.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// An asynchronous operation reached `DONE` with an error payload.
    #[error("Operation {name} failed: {error}")]
    Operation {
        name: String,
        error: OperationError,
    },

    /// Poll loop exceeded its deadline.
    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Identifying context for querying an operation's status.
///
/// Compute Engine exposes three operation collections; which one an
/// operation lives in depends on the resource the mutation touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationScope {
    /// Instance-level operations (`zoneOperations`).
    Zonal { zone: String },
    /// Address-level operations (`regionOperations`).
    Regional { region: String },
    /// Project-wide operations such as firewalls (`globalOperations`).
    Global,
}

impl std::fmt::Display for OperationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zonal { zone } => write!(f, "zonal ({zone})"),
            Self::Regional { region } => write!(f, "regional ({region})"),
            Self::Global => write!(f, "global"),
        }
    }
}

/// Trait for the compute control plane.
///
/// Mutating calls return an [`Operation`] handle; the caller is
/// responsible for polling it to a terminal state (see
/// [`crate::waiter::OperationWaiter`]).
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Request allocation of a static external address.
    async fn insert_address(&self, region: &str, name: &str) -> Result<Operation, ProvisionError>;

    /// Fetch an address resource by name.
    async fn get_address(&self, region: &str, name: &str) -> Result<Address, ProvisionError>;

    /// Request creation of a firewall rule.
    async fn insert_firewall(&self, rule: &FirewallRule) -> Result<Operation, ProvisionError>;

    /// Request creation of a compute instance.
    async fn insert_instance(
        &self,
        zone: &str,
        spec: &InstanceSpec,
    ) -> Result<Operation, ProvisionError>;

    /// Fetch the current status of an operation.
    async fn get_operation(
        &self,
        scope: &OperationScope,
        name: &str,
    ) -> Result<Operation, ProvisionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_display() {
        let scope = OperationScope::Zonal {
            zone: "us-central1-a".to_string(),
        };
        assert_eq!(scope.to_string(), "zonal (us-central1-a)");
        assert_eq!(OperationScope::Global.to_string(), "global");
    }
}
