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
use crate::credentials::CredentialsProvider;
use crate::iam::SignBlobService;
use crate::issuer::Issuer;
use crate::signer::SigningProvider;
use bytes::Bytes;
use std::sync::Arc;

// Implements Signer using the IAM signBlob API, on behalf of the service
// account found in the metadata service.
#[derive(Clone, Debug)]
pub(crate) struct IamSigner {
    issuer: Arc<Issuer>,
    credentials: Arc<dyn CredentialsProvider>,
    service: Arc<dyn SignBlobService>,
    scopes: Arc<[String]>,
}

impl IamSigner {
    pub(crate) fn new(
        issuer: Arc<Issuer>,
        credentials: Arc<dyn CredentialsProvider>,
        service: Arc<dyn SignBlobService>,
        scopes: Arc<[String]>,
    ) -> Self {
        Self {
            issuer,
            credentials,
            service,
            scopes,
        }
    }
}

pub(crate) fn resource_name(client_email: &str) -> String {
    format!("projects/-/serviceAccounts/{client_email}")
}

impl SigningProvider for IamSigner {
    async fn client_email(&self) -> Result<String> {
        self.issuer.get_issuer().await
    }

    async fn sign(&self, content: &[u8]) -> Result<Bytes> {
        // A credentials failure must not reach the metadata or signing services.
        let credentials = self.credentials.default_credentials(&self.scopes).await?;
        let client_email = self.issuer.get_issuer().await?;
        let resource = resource_name(&client_email);

        let response = self
            .service
            .sign_blob(&resource, content, &credentials)
            .await?;
        Ok(response.signed_blob)
    }
}
