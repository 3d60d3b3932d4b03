//! Single-VM provisioning against Google Compute Engine.
//!
//! This crate sequences three dependent resource creations:
//!
//! 1. **Static address** - reserved in a region, allocated value read
//!    back once the operation settles
//! 2. **Firewall rule** - project-wide ingress rule targeting the
//!    instance's network tags
//! 3. **Instance** - bound to the allocated address via its access
//!    config
//!
//! Every mutation returns an asynchronous operation handle that is
//! polled to a terminal state before the next step starts; the
//! instance never references an address that is not durably
//! provisioned. See [`provision::Provisioner`] for the chain and
//! [`waiter::OperationWaiter`] for the poll loop.

pub mod config;
pub mod providers;
pub mod provision;
pub mod waiter;

pub use config::{FirewallConfig, ProvisionConfig};
pub use providers::{ComputeApi, GcpCompute, OperationScope, ProvisionError};
pub use provision::{ProvisionOutcome, Provisioner};
pub use waiter::OperationWaiter;
