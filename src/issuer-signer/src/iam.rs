// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Access to the [IAM Service Account Credentials API].
//!
//! [IAM Service Account Credentials API]: https://cloud.google.com/iam/docs/reference/credentials/rest

use crate::Result;
use crate::credentials::Credentials;
use crate::errors::Error;
use base64::{Engine, prelude::BASE64_STANDARD};
use bytes::Bytes;
use google_cloud_auth::credentials::CacheableResource;
use http::Extensions;
use reqwest::Client as ReqwestClient;

pub(crate) const IAM_CREDENTIALS_ENDPOINT: &str = "https://iamcredentials.googleapis.com";

/// The result of a successful `signBlob` call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignBlobResponse {
    /// The ID of the service account key used to sign the blob.
    pub key_id: String,
    /// The signature for the blob. It is never re-encoded locally.
    pub signed_blob: Bytes,
}

impl SignBlobResponse {
    pub fn new<K, B>(key_id: K, signed_blob: B) -> Self
    where
        K: Into<String>,
        B: Into<Bytes>,
    {
        Self {
            key_id: key_id.into(),
            signed_blob: signed_blob.into(),
        }
    }
}

/// Signs blobs on behalf of a service account.
#[async_trait::async_trait]
pub trait SignBlobService: Send + Sync + std::fmt::Debug {
    /// Signs `payload` with the system-managed key of the service account
    /// named by `resource`, e.g. `projects/-/serviceAccounts/{email}`.
    async fn sign_blob(
        &self,
        resource: &str,
        payload: &[u8],
        credentials: &Credentials,
    ) -> Result<SignBlobResponse>;
}

/// Calls the `signBlob` RPC over HTTP.
///
/// The request is sent once. Any failure is reported as a signing error,
/// except failures to obtain the authorization headers, which are reported
/// as credentials errors before any request is sent.
#[derive(Clone, Debug)]
pub struct Client {
    endpoint: String,
    inner: ReqwestClient,
}

#[derive(Debug, serde::Serialize)]
struct SignBlobRequest {
    payload: String,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignBlobResponseBody {
    #[serde(default)]
    key_id: String,
    signed_blob: String,
}

impl Client {
    /// Creates a client for `endpoint`, or for the production endpoint if
    /// `None`.
    pub fn new(endpoint_override: Option<String>) -> Self {
        let endpoint = endpoint_override.unwrap_or_else(|| IAM_CREDENTIALS_ENDPOINT.to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            inner: ReqwestClient::new(),
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait::async_trait]
impl SignBlobService for Client {
    async fn sign_blob(
        &self,
        resource: &str,
        payload: &[u8],
        credentials: &Credentials,
    ) -> Result<SignBlobResponse> {
        let headers = credentials
            .headers(Extensions::new())
            .await
            .map_err(Error::credentials)?;
        let headers = match headers {
            CacheableResource::New { data, .. } => data,
            CacheableResource::NotModified => {
                unreachable!("requested credentials headers without a caching etag")
            }
        };

        let url = format!("{}/v1/{resource}:signBlob", self.endpoint);
        let body = SignBlobRequest {
            payload: BASE64_STANDARD.encode(payload),
        };
        tracing::debug!(%url, "calling signBlob");

        let response = self
            .inner
            .post(url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(Error::signing)?;

        let status = response.status();
        if !status.is_success() {
            let err_text = response.text().await.map_err(Error::signing)?;
            return Err(Error::signing(format!(
                "err status: {status}, body: {err_text:?}"
            )));
        }

        let response = response
            .json::<SignBlobResponseBody>()
            .await
            .map_err(Error::signing)?;
        let signed_blob = BASE64_STANDARD
            .decode(response.signed_blob)
            .map_err(Error::signing)?;

        Ok(SignBlobResponse::new(response.key_id, signed_blob))
    }
}
