//! Product image storage through the hosted storage REST API.
//!
//! Objects live in a single public bucket. Uploads and deletes use the
//! service-role key; reads go through the public object URL.

use std::time::Duration;

use axum::body::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::{debug, instrument};

use super::{SupabaseError, error_for_status};
use crate::config::SupabaseConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one storage bucket.
#[derive(Clone)]
pub struct SupabaseStorageClient {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
}

impl SupabaseStorageClient {
    /// Create a new storage client.
    ///
    /// # Errors
    ///
    /// Returns error if a key is not a valid header value or the HTTP client
    /// fails to build.
    pub fn new(config: &SupabaseConfig) -> Result<Self, SupabaseError> {
        let key = config.service_role_key.expose_secret();
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(key)
                .map_err(|e| SupabaseError::Parse(format!("Invalid service role key format: {e}")))?,
        );
        let mut bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|e| SupabaseError::Parse(format!("Invalid service role key format: {e}")))?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            bucket: config.storage_bucket.clone(),
        })
    }

    /// Upload an object. Fails if the path already exists.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` if the service rejects the upload.
    #[instrument(skip(self, body), fields(bytes = body.len()))]
    pub async fn upload(
        &self,
        path: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), SupabaseError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            self.bucket,
            encode_path(path)
        );

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .header("cache-control", "max-age=31536000")
            .body(body)
            .send()
            .await?;
        error_for_status(response).await?;

        debug!(path, "Object uploaded");
        Ok(())
    }

    /// Delete objects by path. Missing objects are not an error.
    ///
    /// # Errors
    ///
    /// Returns `SupabaseError::Api` if the service rejects the request.
    #[instrument(skip(self), fields(count = paths.len()))]
    pub async fn remove(&self, paths: &[String]) -> Result<(), SupabaseError> {
        if paths.is_empty() {
            return Ok(());
        }

        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);
        let response = self
            .client
            .delete(url)
            .json(&json!({ "prefixes": paths }))
            .send()
            .await?;
        error_for_status(response).await?;

        debug!("Objects removed");
        Ok(())
    }

    /// Public URL of an object.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        format!("{}{}", self.public_prefix(), encode_path(path))
    }

    /// Inverse of [`Self::public_url`]. Returns `None` for URLs outside this
    /// bucket, such as images hosted elsewhere.
    #[must_use]
    pub fn path_from_public_url(&self, url: &str) -> Option<String> {
        let encoded = url.strip_prefix(&self.public_prefix())?;
        let encoded = encoded.split(['?', '#']).next().unwrap_or_default();
        if encoded.is_empty() {
            return None;
        }

        let segments = encoded
            .split('/')
            .map(|segment| urlencoding::decode(segment).map(std::borrow::Cow::into_owned))
            .collect::<Result<Vec<_>, _>>()
            .ok()?;
        if segments.iter().any(|s| s.is_empty() || s == "." || s == "..") {
            return None;
        }
        Some(segments.join("/"))
    }

    fn public_prefix(&self) -> String {
        format!("{}/storage/v1/object/public/{}/", self.base_url, self.bucket)
    }
}

/// Percent-encode each path segment, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
