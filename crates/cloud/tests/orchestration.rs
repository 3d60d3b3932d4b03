//! Orchestration scenarios against a mocked control plane.
//!
//! These exercise the sequencing contract: each step waits for its
//! operation to settle, the allocated address flows into the instance
//! spec verbatim, and the chain short-circuits on the first failure.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use mockall::Sequence;

use vmup_cloud::providers::gcp::models::{
    Address, FirewallRule, InstanceSpec, Operation, OperationError, OperationErrorDetail,
};
use vmup_cloud::{
    ComputeApi, FirewallConfig, OperationScope, OperationWaiter, ProvisionConfig, ProvisionError,
    Provisioner,
};

mock! {
    pub Compute {}

    #[async_trait]
    impl ComputeApi for Compute {
        async fn insert_address(&self, region: &str, name: &str) -> Result<Operation, ProvisionError>;
        async fn get_address(&self, region: &str, name: &str) -> Result<Address, ProvisionError>;
        async fn insert_firewall(&self, rule: &FirewallRule) -> Result<Operation, ProvisionError>;
        async fn insert_instance(&self, zone: &str, spec: &InstanceSpec) -> Result<Operation, ProvisionError>;
        async fn get_operation(&self, scope: &OperationScope, name: &str) -> Result<Operation, ProvisionError>;
    }
}

fn test_config() -> ProvisionConfig {
    ProvisionConfig {
        project: "test-project".to_string(),
        region: "us-central1".to_string(),
        zone: "us-central1-a".to_string(),
        address_name: "vm-static-ip".to_string(),
        firewall_name: "allow-ssh-http".to_string(),
        instance_name: "vm-instance".to_string(),
        machine_type: "n1-standard-2".to_string(),
        disk_size_gb: 250,
        source_image: "projects/ubuntu-os-cloud/global/images/family/ubuntu-2204-lts".to_string(),
        network_tags: vec!["http-server".to_string(), "ssh-server".to_string()],
        firewall: FirewallConfig::default(),
        poll_interval_secs: 0,
        poll_timeout_secs: None,
    }
}

fn operation(name: &str, status: &str) -> Operation {
    Operation {
        name: name.to_string(),
        status: status.to_string(),
        target_link: None,
        operation_type: None,
        error: None,
    }
}

fn failed_operation(name: &str, message: &str) -> Operation {
    Operation {
        error: Some(OperationError {
            errors: vec![OperationErrorDetail {
                code: None,
                message: Some(message.to_string()),
            }],
        }),
        ..operation(name, "DONE")
    }
}

#[tokio::test]
async fn happy_path_binds_allocated_ip_to_instance() {
    let config = test_config();
    let mut api = MockCompute::new();
    let mut seq = Sequence::new();

    api.expect_insert_address()
        .withf(|region, name| region == "us-central1" && name == "vm-static-ip")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(operation("op-addr", "PENDING")));

    api.expect_get_operation()
        .withf(|scope, name| {
            *scope
                == OperationScope::Regional {
                    region: "us-central1".to_string(),
                }
                && name == "op-addr"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, name| Ok(operation(name, "DONE")));

    api.expect_get_address()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, name| {
            Ok(Address {
                name: name.to_string(),
                address: Some("34.1.2.3".to_string()),
            })
        });

    api.expect_insert_firewall()
        .withf(|rule| {
            rule.name == "allow-ssh-http"
                && rule.direction == "INGRESS"
                && rule.target_tags == ["http-server", "ssh-server"]
                && rule.allowed[0].ports == ["22", "80"]
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(operation("op-fw", "PENDING")));

    api.expect_get_operation()
        .withf(|scope, name| *scope == OperationScope::Global && name == "op-fw")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, name| Ok(operation(name, "DONE")));

    api.expect_insert_instance()
        .withf(|zone, spec| {
            let nat_ip = spec.network_interfaces[0].access_configs[0]
                .nat_ip
                .as_deref();
            zone == "us-central1-a"
                && nat_ip == Some("34.1.2.3")
                && spec.machine_type == "zones/us-central1-a/machineTypes/n1-standard-2"
                && spec.tags.items == ["http-server", "ssh-server"]
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(operation("op-vm", "PENDING")));

    api.expect_get_operation()
        .withf(|scope, name| {
            *scope
                == OperationScope::Zonal {
                    zone: "us-central1-a".to_string(),
                }
                && name == "op-vm"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, name| Ok(operation(name, "DONE")));

    let outcome = Provisioner::new(&api, &config).run().await.unwrap();
    assert_eq!(outcome.static_ip, "34.1.2.3");
}

#[tokio::test]
async fn address_operation_error_aborts_the_chain() {
    let config = test_config();
    let mut api = MockCompute::new();

    api.expect_insert_address()
        .times(1)
        .returning(|_, _| Ok(operation("op-addr", "PENDING")));

    api.expect_get_operation()
        .times(1)
        .returning(|_, name| Ok(failed_operation(name, "quota exceeded")));

    // Nothing after the failed step may run.
    api.expect_get_address().times(0);
    api.expect_insert_firewall().times(0);
    api.expect_insert_instance().times(0);

    let err = Provisioner::new(&api, &config).run().await.unwrap_err();

    // Payload travels unchanged.
    match err {
        ProvisionError::Operation { name, error } => {
            assert_eq!(name, "op-addr");
            assert_eq!(error.errors[0].message.as_deref(), Some("quota exceeded"));
        }
        other => panic!("expected operation error, got {other}"),
    }
}

#[tokio::test]
async fn firewall_failure_skips_instance_creation() {
    let config = test_config();
    let mut api = MockCompute::new();

    api.expect_insert_address()
        .times(1)
        .returning(|_, _| Ok(operation("op-addr", "PENDING")));

    api.expect_get_address().times(1).returning(|_, name| {
        Ok(Address {
            name: name.to_string(),
            address: Some("34.1.2.3".to_string()),
        })
    });

    api.expect_insert_firewall()
        .times(1)
        .returning(|_| Ok(operation("op-fw", "PENDING")));

    api.expect_get_operation()
        .times(2)
        .returning(|scope, name| match scope {
            OperationScope::Global => Ok(failed_operation(name, "name collision")),
            _ => Ok(operation(name, "DONE")),
        });

    api.expect_insert_instance().times(0);

    let err = Provisioner::new(&api, &config).run().await.unwrap_err();
    assert!(err.to_string().contains("name collision"));
}

#[tokio::test]
async fn missing_address_value_is_an_error() {
    let config = test_config();
    let mut api = MockCompute::new();

    api.expect_insert_address()
        .times(1)
        .returning(|_, _| Ok(operation("op-addr", "PENDING")));

    api.expect_get_operation()
        .times(1)
        .returning(|_, name| Ok(operation(name, "DONE")));

    // Allocation settled but the resource carries no value; the
    // provisioner must not hand a placeholder to the instance step.
    api.expect_get_address().times(1).returning(|_, name| {
        Ok(Address {
            name: name.to_string(),
            address: None,
        })
    });

    api.expect_insert_firewall().times(0);
    api.expect_insert_instance().times(0);

    let err = Provisioner::new(&api, &config).run().await.unwrap_err();
    assert!(matches!(err, ProvisionError::NotFound(_)));
}

#[tokio::test]
async fn waiter_polls_until_terminal_status() {
    let mut api = MockCompute::new();
    let polls = AtomicUsize::new(0);

    // RUNNING for three polls, then DONE: exactly four status queries.
    api.expect_get_operation()
        .times(4)
        .returning(move |_, name| {
            let n = polls.fetch_add(1, Ordering::SeqCst);
            let status = if n < 3 { "RUNNING" } else { "DONE" };
            Ok(operation(name, status))
        });

    let waiter = OperationWaiter::new(Duration::from_millis(1));
    waiter
        .wait(&api, &OperationScope::Global, &operation("op-slow", "PENDING"))
        .await
        .unwrap();
}

#[tokio::test]
async fn waiter_times_out_on_stuck_operation() {
    let mut api = MockCompute::new();

    api.expect_get_operation()
        .returning(|_, name| Ok(operation(name, "RUNNING")));

    let waiter =
        OperationWaiter::new(Duration::from_millis(1)).with_timeout(Duration::from_millis(20));
    let err = waiter
        .wait(&api, &OperationScope::Global, &operation("op-stuck", "PENDING"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Timeout(_)));
}

#[tokio::test]
async fn transport_error_on_submission_propagates() {
    let config = test_config();
    let mut api = MockCompute::new();

    api.expect_insert_address().times(1).returning(|_, _| {
        Err(ProvisionError::Api {
            status: 409,
            message: "address already exists".to_string(),
        })
    });

    api.expect_get_operation().times(0);
    api.expect_insert_firewall().times(0);
    api.expect_insert_instance().times(0);

    let err = Provisioner::new(&api, &config).run().await.unwrap_err();
    assert!(matches!(err, ProvisionError::Api { status: 409, .. }));
}
