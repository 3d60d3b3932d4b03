//! GCP API client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::models::{Address, FirewallRule, InstanceSpec, Operation};
use crate::providers::traits::{ComputeApi, OperationScope, ProvisionError};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Compute Engine v1 endpoint.
const COMPUTE_V1: &str = "https://compute.googleapis.com/compute/v1";

/// Google Compute Engine client.
#[derive(Clone)]
pub struct GcpCompute {
    /// HTTP client.
    client: Client,
    /// Project ID.
    project_id: String,
    /// Access token (from service account or user).
    access_token: String,
    /// API base URL.
    base_url: String,
}

impl GcpCompute {
    /// Create a new Compute Engine client.
    ///
    /// # Arguments
    /// * `project_id` - GCP project ID
    /// * `access_token` - `OAuth2` access token
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new(
        project_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, ProvisionError> {
        Self::with_base_url(project_id, access_token, COMPUTE_V1)
    }

    /// Create a client against a non-default endpoint. Used by tests.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn with_base_url(
        project_id: impl Into<String>,
        access_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ProvisionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ProvisionError::Http)?;

        Ok(Self {
            client,
            project_id: project_id.into(),
            access_token: access_token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// URL prefix for this project.
    fn project_url(&self) -> String {
        format!("{}/projects/{}", self.base_url, self.project_id)
    }

    /// Make an authenticated GET request.
    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ProvisionError> {
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Make an authenticated POST request.
    async fn post<T, B>(&self, url: &str, body: &B) -> Result<T, ProvisionError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize,
    {
        debug!(url = %url, "POST request");

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ProvisionError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&text).map_err(|e| {
                warn!(error = %e, body = %text, "Failed to parse response");
                ProvisionError::Serialization(e)
            })
        } else if status == StatusCode::NOT_FOUND {
            Err(ProvisionError::NotFound(text))
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(ProvisionError::Auth(text))
        } else {
            Err(ProvisionError::Api {
                status: status.as_u16(),
                message: text,
            })
        }
    }
}

#[async_trait]
impl ComputeApi for GcpCompute {
    async fn insert_address(&self, region: &str, name: &str) -> Result<Operation, ProvisionError> {
        let url = format!("{}/regions/{}/addresses", self.project_url(), region);
        self.post(&url, &Address::named(name)).await
    }

    async fn get_address(&self, region: &str, name: &str) -> Result<Address, ProvisionError> {
        let url = format!("{}/regions/{}/addresses/{}", self.project_url(), region, name);
        self.get(&url).await
    }

    async fn insert_firewall(&self, rule: &FirewallRule) -> Result<Operation, ProvisionError> {
        let url = format!("{}/global/firewalls", self.project_url());
        self.post(&url, rule).await
    }

    async fn insert_instance(
        &self,
        zone: &str,
        spec: &InstanceSpec,
    ) -> Result<Operation, ProvisionError> {
        let url = format!("{}/zones/{}/instances", self.project_url(), zone);
        self.post(&url, spec).await
    }

    async fn get_operation(
        &self,
        scope: &OperationScope,
        name: &str,
    ) -> Result<Operation, ProvisionError> {
        let url = match scope {
            OperationScope::Zonal { zone } => {
                format!("{}/zones/{}/operations/{}", self.project_url(), zone, name)
            }
            OperationScope::Regional { region } => {
                format!(
                    "{}/regions/{}/operations/{}",
                    self.project_url(),
                    region,
                    name
                )
            }
            OperationScope::Global => {
                format!("{}/global/operations/{}", self.project_url(), name)
            }
        };
        self.get(&url).await
    }
}
