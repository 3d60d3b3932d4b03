//! Control-plane abstractions.
//!
//! This module defines the provider-agnostic trait boundary and the
//! Google Compute Engine implementation behind it.

pub mod gcp;
mod traits;

pub use traits::{ComputeApi, OperationScope, ProvisionError};

// Re-export the provider client
pub use gcp::GcpCompute;
