//! GCP (Google Cloud Platform) control plane.
//!
//! Implements the [`ComputeApi`] trait against the Compute Engine v1
//! REST surface.
//!
//! ## Resources touched
//!
//! - **Addresses** - static external IPs (regional)
//! - **Firewalls** - ingress rules (global)
//! - **Instances** - virtual machines (zonal)
//!
//! [`ComputeApi`]: crate::providers::traits::ComputeApi

mod client;
pub mod models;

pub use client::GcpCompute;
