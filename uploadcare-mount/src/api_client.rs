#![doc = "File API client: implements the core `FileApi` trait against the Uploadcare REST API."]
//
//! # Uploadcare REST client
//!
//! - Construct [`UploadcareClient`] from the `api` config section and the env-supplied [`Credentials`].
//! - Store: `PUT /files/{uuid}/storage/`. Delete: `DELETE /files/{uuid}/storage/`.
//! - Requests carry the versioned `Accept` header and `Uploadcare.Simple` authentication.
//! - Any non-2xx response is an error carrying status and body; nothing is retried here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Method;

use uploadcare_mount_core::contract::FileApi;
use uploadcare_mount_core::BoxError;

use crate::load_config::{ApiSection, Credentials};

pub const API_ACCEPT: &str = "application/vnd.uploadcare-v0.7+json";

pub struct UploadcareClient {
    http: reqwest::Client,
    base_url: String,
    authorization: String,
}

impl UploadcareClient {
    pub fn new(api: &ApiSection, credentials: &Credentials) -> Result<Self, BoxError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to build HTTP client");
                e
            })?;
        tracing::info!(
            base_url = %api.base_url,
            public_key_set = !credentials.public_key.is_empty(),
            "Initialized Uploadcare API client"
        );
        Ok(UploadcareClient {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            authorization: format!(
                "Uploadcare.Simple {}:{}",
                credentials.public_key, credentials.secret_key
            ),
        })
    }

    pub fn storage_url(&self, file_uuid: &str) -> String {
        format!("{}/files/{}/storage/", self.base_url, file_uuid)
    }

    async fn storage_request(&self, method: Method, file_uuid: &str) -> Result<(), BoxError> {
        let url = self.storage_url(file_uuid);
        let response = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, API_ACCEPT)
            .header(AUTHORIZATION, &self.authorization)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, %method, url = %url, "Request to Uploadcare API failed");
                e
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%status, %method, url = %url, body = %body, "Uploadcare API rejected request");
        Err(format!("Uploadcare API returned {status} for {method} {url}: {body}").into())
    }
}

#[async_trait]
impl FileApi for UploadcareClient {
    async fn store_file(&self, file_uuid: &str) -> Result<(), BoxError> {
        tracing::info!(file_uuid, "Storing file");
        self.storage_request(Method::PUT, file_uuid).await?;
        tracing::info!(file_uuid, "Successfully stored file");
        Ok(())
    }

    async fn delete_file(&self, file_uuid: &str) -> Result<(), BoxError> {
        tracing::info!(file_uuid, "Deleting file");
        self.storage_request(Method::DELETE, file_uuid).await?;
        tracing::info!(file_uuid, "Successfully deleted file");
        Ok(())
    }
}
