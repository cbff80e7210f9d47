//! Object-storage client (Backblaze B2 native API)
//!
//! The rest of the system only sees the narrow ObjectStore contract:
//! hand out a browser-direct upload target, and save a file by its opaque
//! id to a local path. The B2 implementation authorizes once and reuses
//! the returned apiUrl/downloadUrl for the session. Integrity on upload
//! is asserted by the uploader via the X-Bz-Content-Sha1 header; download
//! integrity is B2's problem.

use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::debug;

const B2_AUTH_URL: &str = "https://api.backblazeb2.com/b2api/v2/b2_authorize_account";

/// Upload handshake handed to the browser: POST the audio bytes to
/// `upload_url` with `authorization_token` and a sha1 header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadTarget {
    #[serde(rename = "uploadUrl")]
    pub upload_url: String,
    #[serde(rename = "authorizationToken")]
    pub authorization_token: String,
}

/// Narrow object-storage contract consumed by the scheduler (upload
/// handshake) and the puller (download by id)
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Obtain a direct-upload URL and token for the bucket
    async fn upload_target(&self, bucket_id: &str) -> Result<UploadTarget>;

    /// Download the file with `file_id`, saving it to `dest`.
    ///
    /// Writes to a temp name beside `dest` and renames into place, so a
    /// partially transferred file is never observable at `dest`.
    async fn download_to(&self, file_id: &str, dest: &Path) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct AuthorizeResponse {
    #[serde(rename = "apiUrl")]
    api_url: String,
    #[serde(rename = "downloadUrl")]
    download_url: String,
    #[serde(rename = "authorizationToken")]
    authorization_token: String,
}

/// B2 native-API client. Holds the session token from authorize_account.
pub struct B2Client {
    client: reqwest::Client,
    api_url: String,
    download_url: String,
    token: String,
}

impl B2Client {
    /// Authorize against B2 with an application key pair
    pub async fn authorize(key_id: &str, key: &str) -> Result<Self> {
        let client = reqwest::Client::new();
        let response = client
            .get(B2_AUTH_URL)
            .basic_auth(key_id, Some(key))
            .send()
            .await
            .map_err(|e| Error::StorageUnavailable(format!("b2_authorize_account: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::StorageUnavailable(format!(
                "b2_authorize_account returned http status {}",
                response.status()
            )));
        }

        let auth: AuthorizeResponse = response
            .json()
            .await
            .map_err(|e| Error::StorageUnavailable(format!("b2_authorize_account body: {}", e)))?;

        Ok(Self {
            client,
            api_url: auth.api_url,
            download_url: auth.download_url,
            token: auth.authorization_token,
        })
    }

    /// Construct a client against an arbitrary endpoint without the
    /// authorize round-trip (local/test stand-ins for B2)
    pub fn with_endpoints(api_url: String, download_url: String, token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            download_url,
            token,
        }
    }
}

#[async_trait]
impl ObjectStore for B2Client {
    async fn upload_target(&self, bucket_id: &str) -> Result<UploadTarget> {
        let url = format!("{}/b2api/v2/b2_get_upload_url", self.api_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", &self.token)
            .json(&serde_json::json!({ "bucketId": bucket_id }))
            .send()
            .await
            .map_err(|e| Error::StorageUnavailable(format!("b2_get_upload_url: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::StorageUnavailable(format!(
                "b2_get_upload_url returned http status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::StorageUnavailable(format!("b2_get_upload_url body: {}", e)))
    }

    async fn download_to(&self, file_id: &str, dest: &Path) -> Result<()> {
        let url = format!(
            "{}/b2api/v2/b2_download_file_by_id?fileId={}",
            self.download_url, file_id
        );
        debug!(file_id, dest = %dest.display(), "downloading from object storage");

        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.token)
            .send()
            .await
            .map_err(|e| Error::StorageUnavailable(format!("b2_download_file_by_id: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::StorageUnavailable(format!(
                "b2_download_file_by_id '{}' returned http status {}",
                file_id,
                response.status()
            )));
        }

        let tmp = temp_sibling(dest)?;
        {
            let mut file = std::fs::File::create(&tmp)?;
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk
                    .map_err(|e| Error::StorageUnavailable(format!("download stream: {}", e)))?;
                file.write_all(&chunk)?;
            }
            file.flush()?;
        }
        std::fs::rename(&tmp, dest)?;
        Ok(())
    }
}

/// Temp path in the same directory as `dest` so the final rename stays on
/// one filesystem
pub fn temp_sibling(dest: &Path) -> Result<std::path::PathBuf> {
    let file_name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::Validation(format!("bad destination path: {}", dest.display())))?;
    Ok(dest.with_file_name(format!(".{}.part", file_name)))
}
