//! Provisioning steps and their orchestration.
//!
//! Three resources are created in a fixed dependency order: the static
//! address first, then the firewall rule, then the instance that binds
//! the allocated address. Each step submits one mutating request and
//! waits for its operation to settle before the next step starts, so a
//! later step never references a resource that is not durably
//! provisioned. The chain short-circuits on the first failure; nothing
//! is rolled back.

use tracing::info;

use crate::config::ProvisionConfig;
use crate::providers::gcp::models::{
    machine_type_url, AccessConfig, Allowed, AttachedDisk, FirewallRule, InitializeParams,
    InstanceSpec, NetworkInterface, Tags, DEFAULT_NETWORK, ONE_TO_ONE_NAT,
};
use crate::providers::{ComputeApi, OperationScope, ProvisionError};
use crate::waiter::OperationWaiter;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    /// The reserved static external IP, as allocated by the control
    /// plane and bound to the instance.
    pub static_ip: String,
}

/// Runs the provisioning chain against a control plane.
pub struct Provisioner<'a, C: ComputeApi + ?Sized> {
    api: &'a C,
    waiter: OperationWaiter,
    config: &'a ProvisionConfig,
}

impl<'a, C: ComputeApi + ?Sized> Provisioner<'a, C> {
    /// Create a provisioner from a validated configuration.
    pub fn new(api: &'a C, config: &'a ProvisionConfig) -> Self {
        let mut waiter = OperationWaiter::new(config.poll_interval());
        if let Some(timeout) = config.poll_timeout() {
            waiter = waiter.with_timeout(timeout);
        }
        Self {
            api,
            waiter,
            config,
        }
    }

    /// Reserve the static address and return its allocated value.
    ///
    /// # Errors
    /// Fails if the allocation request is rejected, the operation
    /// terminates with an error payload, or the fetched resource has no
    /// assigned value.
    pub async fn provision_address(&self) -> Result<String, ProvisionError> {
        let cfg = self.config;
        info!(name = %cfg.address_name, region = %cfg.region, "Reserving static address");

        let operation = self
            .api
            .insert_address(&cfg.region, &cfg.address_name)
            .await?;

        let scope = OperationScope::Regional {
            region: cfg.region.clone(),
        };
        self.waiter.wait(self.api, &scope, &operation).await?;

        let address = self.api.get_address(&cfg.region, &cfg.address_name).await?;
        let value = address.address.ok_or_else(|| {
            ProvisionError::NotFound(format!(
                "address {} has no allocated value",
                cfg.address_name
            ))
        })?;

        info!(name = %cfg.address_name, address = %value, "Static address reserved");
        Ok(value)
    }

    /// Create the ingress firewall rule.
    ///
    /// # Errors
    /// Fails on a rejected request or an operation error payload.
    pub async fn provision_firewall(&self) -> Result<(), ProvisionError> {
        let cfg = self.config;
        info!(name = %cfg.firewall_name, "Creating firewall rule");

        let rule = FirewallRule {
            name: cfg.firewall_name.clone(),
            allowed: vec![Allowed {
                ip_protocol: cfg.firewall.protocol.clone(),
                ports: cfg.firewall.ports.iter().map(ToString::to_string).collect(),
            }],
            direction: "INGRESS".to_string(),
            source_ranges: cfg.firewall.source_ranges.clone(),
            target_tags: cfg.network_tags.clone(),
        };

        let operation = self.api.insert_firewall(&rule).await?;
        self.waiter
            .wait(self.api, &OperationScope::Global, &operation)
            .await?;

        info!(name = %cfg.firewall_name, "Firewall rule created");
        Ok(())
    }

    /// Create the instance, binding the previously allocated address.
    ///
    /// # Errors
    /// Fails on a rejected request or an operation error payload.
    pub async fn provision_instance(&self, static_ip: &str) -> Result<(), ProvisionError> {
        let cfg = self.config;
        info!(name = %cfg.instance_name, zone = %cfg.zone, "Creating instance");

        let spec = InstanceSpec {
            name: cfg.instance_name.clone(),
            machine_type: machine_type_url(&cfg.zone, &cfg.machine_type),
            disks: vec![AttachedDisk {
                boot: true,
                auto_delete: true,
                initialize_params: InitializeParams {
                    source_image: cfg.source_image.clone(),
                    disk_size_gb: cfg.disk_size_gb.to_string(),
                },
            }],
            network_interfaces: vec![NetworkInterface {
                network: DEFAULT_NETWORK.to_string(),
                access_configs: vec![AccessConfig {
                    name: "External_NAT".to_string(),
                    access_type: ONE_TO_ONE_NAT.to_string(),
                    nat_ip: Some(static_ip.to_string()),
                }],
            }],
            // Same tag set the firewall rule targets.
            tags: Tags {
                items: cfg.network_tags.clone(),
            },
        };

        let operation = self.api.insert_instance(&cfg.zone, &spec).await?;

        let scope = OperationScope::Zonal {
            zone: cfg.zone.clone(),
        };
        self.waiter.wait(self.api, &scope, &operation).await?;

        info!(name = %cfg.instance_name, "Instance created");
        Ok(())
    }

    /// Run the full chain: address, then firewall, then instance.
    ///
    /// # Errors
    /// The first failing step aborts the rest and its error is
    /// propagated unchanged. Already-created resources are left in
    /// place.
    pub async fn run(&self) -> Result<ProvisionOutcome, ProvisionError> {
        self.config.validate()?;

        let static_ip = self.provision_address().await?;
        self.provision_firewall().await?;
        self.provision_instance(&static_ip).await?;

        info!(address = %static_ip, "Provisioning complete");
        Ok(ProvisionOutcome { static_ip })
    }
}
