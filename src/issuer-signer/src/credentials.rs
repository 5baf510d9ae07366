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

//! Credentials used to authenticate the signing requests.

use crate::Result;
use crate::errors::Error;
pub use google_cloud_auth::credentials::Credentials;

/// The OAuth scope required to call the IAM Credentials API.
pub const IAM_SCOPE: &str = "https://www.googleapis.com/auth/iam";

/// Finds the credentials used to call the signing service.
#[async_trait::async_trait]
pub trait CredentialsProvider: Send + Sync + std::fmt::Debug {
    /// Returns the default credentials for the environment, restricted to
    /// `scopes`.
    async fn default_credentials(&self, scopes: &[String]) -> Result<Credentials>;
}

/// Uses [Application Default Credentials] to find the credentials.
///
/// A new [Credentials] is built on every call. Token caching and refresh are
/// handled inside the credentials themselves.
///
/// [Application Default Credentials]: https://cloud.google.com/docs/authentication/application-default-credentials
#[derive(Clone, Debug, Default)]
pub struct ApplicationDefaultCredentials;

#[async_trait::async_trait]
impl CredentialsProvider for ApplicationDefaultCredentials {
    async fn default_credentials(&self, scopes: &[String]) -> Result<Credentials> {
        google_cloud_auth::credentials::Builder::default()
            .with_scopes(scopes.iter().cloned())
            .build()
            .map_err(Error::credentials)
    }
}
