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

use crate::Result;
use crate::credentials::{ApplicationDefaultCredentials, CredentialsProvider, IAM_SCOPE};
use crate::iam::{self, SignBlobService};
use crate::issuer::Issuer;
use crate::mds::{self, MetadataProvider};
use crate::signer::Signer;
use crate::signer::iam::IamSigner;
use std::sync::Arc;

/// Resolves the service account of the application and signs blobs on its
/// behalf.
///
/// The service account email is fetched from the metadata service the first
/// time it is needed, and cached for the lifetime of this value and all its
/// clones. Signers created by [signer()][IssuerAndSigner::signer] share that
/// cache.
///
/// # Example
/// ```no_run
/// # use google_cloud_issuer_signer::IssuerAndSigner;
/// # tokio_test::block_on(async {
/// let issuer_and_signer = IssuerAndSigner::builder().build();
/// let issuer = issuer_and_signer.issuer().await?;
/// let signature = issuer_and_signer.signer().sign(b"string to sign").await?;
/// println!("{issuer} signed the blob: {signature:?}");
/// # Ok::<(), anyhow::Error>(())
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct IssuerAndSigner {
    issuer: Arc<Issuer>,
    credentials: Arc<dyn CredentialsProvider>,
    service: Arc<dyn SignBlobService>,
    scopes: Arc<[String]>,
}

impl IssuerAndSigner {
    /// Returns a builder with the default collaborators.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Returns the email of the service account the application runs as.
    pub async fn issuer(&self) -> Result<String> {
        self.issuer.get_issuer().await
    }

    /// Returns a signer for the service account.
    ///
    /// This performs no I/O. All the work happens in [Signer::sign], and each
    /// call to it fetches credentials and calls the signing service.
    pub fn signer(&self) -> Signer {
        Signer::from(IamSigner::new(
            self.issuer.clone(),
            self.credentials.clone(),
            self.service.clone(),
            self.scopes.clone(),
        ))
    }
}

impl Default for IssuerAndSigner {
    fn default() -> Self {
        Builder::default().build()
    }
}

/// A builder for [IssuerAndSigner].
///
/// By default the service account is found with the metadata service at
/// `http://metadata.google.internal` (or `$GCE_METADATA_HOST`), credentials
/// are found with [Application Default Credentials] using the
/// `https://www.googleapis.com/auth/iam` scope, and blobs are signed with the
/// production IAM Credentials API.
///
/// [Application Default Credentials]: https://cloud.google.com/docs/authentication/application-default-credentials
#[derive(Debug, Default)]
pub struct Builder {
    metadata_endpoint: Option<String>,
    iam_endpoint: Option<String>,
    scopes: Option<Vec<String>>,
    metadata: Option<Arc<dyn MetadataProvider>>,
    credentials: Option<Arc<dyn CredentialsProvider>>,
    service: Option<Arc<dyn SignBlobService>>,
}

impl Builder {
    /// Sets the endpoint of the metadata service.
    ///
    /// The `GCE_METADATA_HOST` environment variable takes precedence over this
    /// setting. Ignored if a custom [MetadataProvider] is configured.
    pub fn with_metadata_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.metadata_endpoint = Some(endpoint.into());
        self
    }

    /// Sets the endpoint of the IAM Credentials API.
    ///
    /// Ignored if a custom [SignBlobService] is configured.
    pub fn with_iam_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.iam_endpoint = Some(endpoint.into());
        self
    }

    /// Sets the scopes requested for the signing credentials.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Uses `provider` to discover the service account email.
    pub fn with_metadata_provider<T>(mut self, provider: T) -> Self
    where
        T: MetadataProvider + 'static,
    {
        self.metadata = Some(Arc::new(provider));
        self
    }

    /// Uses `provider` to obtain the credentials for the signing service.
    pub fn with_credentials_provider<T>(mut self, provider: T) -> Self
    where
        T: CredentialsProvider + 'static,
    {
        self.credentials = Some(Arc::new(provider));
        self
    }

    /// Uses `service` to sign blobs.
    pub fn with_sign_blob_service<T>(mut self, service: T) -> Self
    where
        T: SignBlobService + 'static,
    {
        self.service = Some(Arc::new(service));
        self
    }

    /// Creates the [IssuerAndSigner]. No I/O happens until it is used.
    pub fn build(self) -> IssuerAndSigner {
        let metadata = self
            .metadata
            .unwrap_or_else(|| Arc::new(mds::Client::new(self.metadata_endpoint)));
        let credentials = self
            .credentials
            .unwrap_or_else(|| Arc::new(ApplicationDefaultCredentials));
        let service = self
            .service
            .unwrap_or_else(|| Arc::new(iam::Client::new(self.iam_endpoint)));
        let scopes = self
            .scopes
            .unwrap_or_else(|| vec![IAM_SCOPE.to_string()]);

        IssuerAndSigner {
            issuer: Arc::new(Issuer::from_shared(metadata)),
            credentials,
            service,
            scopes: Arc::from(scopes),
        }
    }
}
