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

//! Types to sign blobs with a remote signing authority.

use crate::Result;
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;

pub(crate) mod iam;

/// Signs blobs on behalf of a service account.
///
/// Applications obtain a `Signer` from [IssuerAndSigner::signer], or wrap
/// their own [SigningProvider] implementation, for example in tests:
///
/// ```
/// # use google_cloud_issuer_signer::signer::{Signer, SigningProvider};
/// # use google_cloud_issuer_signer::Result;
/// # use bytes::Bytes;
/// #[derive(Debug)]
/// struct Fake;
/// impl SigningProvider for Fake {
///     async fn client_email(&self) -> Result<String> {
///         Ok("sa@project.iam.gserviceaccount.com".to_string())
///     }
///     async fn sign(&self, content: &[u8]) -> Result<Bytes> {
///         Ok(Bytes::from(content.iter().rev().copied().collect::<Vec<_>>()))
///     }
/// }
/// let signer = Signer::from(Fake);
/// ```
///
/// [IssuerAndSigner::signer]: crate::IssuerAndSigner::signer
#[derive(Clone, Debug)]
pub struct Signer {
    pub(crate) inner: Arc<dyn dynamic::SigningProvider>,
}

impl<T> std::convert::From<T> for Signer
where
    T: SigningProvider + Send + Sync + 'static,
{
    fn from(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }
}

impl Signer {
    /// The email of the service account that signs the blobs.
    pub async fn client_email(&self) -> Result<String> {
        self.inner.client_email().await
    }

    /// Returns the signature of `content`, exactly as produced by the
    /// signing authority.
    pub async fn sign<T>(&self, content: T) -> Result<Bytes>
    where
        T: AsRef<[u8]>,
    {
        self.inner.sign(content.as_ref()).await
    }
}

/// The interface implemented by blob signers.
pub trait SigningProvider: Send + Sync + std::fmt::Debug {
    /// Represents the issuer of the signatures.
    ///
    /// This is typically a service account email, in the form
    /// `name@project.iam.gserviceaccount.com`.
    fn client_email(&self) -> impl Future<Output = Result<String>> + Send;

    /// Signs `content` and returns the raw signature bytes.
    fn sign(&self, content: &[u8]) -> impl Future<Output = Result<Bytes>> + Send;
}

pub(crate) mod dynamic {
    use super::Result;
    use bytes::Bytes;

    /// A dyn-compatible, crate-private version of `SigningProvider`.
    #[async_trait::async_trait]
    pub trait SigningProvider: Send + Sync + std::fmt::Debug {
        async fn client_email(&self) -> Result<String>;
        async fn sign(&self, content: &[u8]) -> Result<Bytes>;
    }

    /// The public SigningProvider implements the dyn-compatible SigningProvider.
    #[async_trait::async_trait]
    impl<T> SigningProvider for T
    where
        T: super::SigningProvider + Send + Sync,
    {
        async fn client_email(&self) -> Result<String> {
            T::client_email(self).await
        }

        async fn sign(&self, content: &[u8]) -> Result<Bytes> {
            T::sign(self, content).await
        }
    }
}
