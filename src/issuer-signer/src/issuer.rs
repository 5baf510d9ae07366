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
use crate::errors::Error;
use crate::mds::MetadataProvider;
use std::sync::Arc;
use tokio::sync::OnceCell;

pub(crate) const EMAIL_CATEGORY: &str = "instance";
pub(crate) const EMAIL_KEY: &str = "service-accounts/default/email";

/// Resolves the email of the service account the application runs as.
///
/// The email is fetched from the metadata service on first use and then
/// cached for the lifetime of this value. There is no refresh: the service
/// account of a running workload does not change. Failed lookups are not
/// cached.
#[derive(Debug)]
pub struct Issuer {
    metadata: Arc<dyn MetadataProvider>,
    email: OnceCell<String>,
}

impl Issuer {
    /// Creates a resolver backed by `metadata`.
    pub fn new<T>(metadata: T) -> Self
    where
        T: MetadataProvider + 'static,
    {
        Self::from_shared(Arc::new(metadata))
    }

    pub(crate) fn from_shared(metadata: Arc<dyn MetadataProvider>) -> Self {
        Self {
            metadata,
            email: OnceCell::new(),
        }
    }

    /// Returns the service account email, querying the metadata service at
    /// most once.
    ///
    /// Concurrent callers wait for the first resolution instead of issuing
    /// their own queries.
    pub async fn get_issuer(&self) -> Result<String> {
        if let Some(email) = self.email.get() {
            tracing::debug!("using cached issuer {email}");
            return Ok(email.clone());
        }
        let email = self
            .email
            .get_or_try_init(|| email_from_metadata(self.metadata.as_ref()))
            .await?;
        Ok(email.clone())
    }
}

async fn email_from_metadata(metadata: &dyn MetadataProvider) -> Result<String> {
    if !metadata.metadata_available().await {
        return Err(Error::metadata_unavailable(
            "no Google Cloud environment metadata present",
        ));
    }

    let email = metadata.lookup(EMAIL_CATEGORY, EMAIL_KEY).await?;
    let email = email.as_deref().map(str::trim).unwrap_or_default();
    if email.is_empty() {
        return Err(Error::identity_not_found(format!(
            "{EMAIL_CATEGORY}/{EMAIL_KEY} is missing or blank"
        )));
    }
    tracing::debug!("resolved issuer {email} from the metadata service");
    Ok(email.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::error::Error as _;
    use test_case::test_case;

    type TestResult = anyhow::Result<()>;

    mockall::mock! {
        #[derive(Debug)]
        pub Metadata {}

        #[async_trait::async_trait]
        impl MetadataProvider for Metadata {
            async fn metadata_available(&self) -> bool;
            async fn lookup(&self, category: &str, key: &str) -> Result<Option<String>>;
        }
    }

    pub(crate) fn mock_metadata(email: &'static str) -> MockMetadata {
        let mut mock = MockMetadata::new();
        mock.expect_metadata_available().times(1).return_const(true);
        mock.expect_lookup()
            .withf(|category, key| category == EMAIL_CATEGORY && key == EMAIL_KEY)
            .times(1)
            .returning(move |_, _| Ok(Some(email.to_string())));
        mock
    }

    #[tokio::test]
    async fn resolves_once() -> TestResult {
        let issuer = Issuer::new(mock_metadata("sa@project.iam.gserviceaccount.com"));
        for _ in 0..5 {
            let got = issuer.get_issuer().await?;
            assert_eq!(got, "sa@project.iam.gserviceaccount.com");
        }
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_resolve_once() -> TestResult {
        let issuer = Arc::new(Issuer::new(mock_metadata("sa@project.iam.gserviceaccount.com")));
        let tasks = (0..8)
            .map(|_| {
                let issuer = issuer.clone();
                tokio::spawn(async move { issuer.get_issuer().await })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            let got = task.await??;
            assert_eq!(got, "sa@project.iam.gserviceaccount.com");
        }
        Ok(())
    }

    #[tokio::test]
    async fn metadata_unavailable() {
        let mut mock = MockMetadata::new();
        mock.expect_metadata_available().return_const(false);
        mock.expect_lookup().never();

        let issuer = Issuer::new(mock);
        for _ in 0..2 {
            let err = issuer.get_issuer().await.unwrap_err();
            assert!(err.is_metadata_unavailable(), "{err:?}");
        }
    }

    #[test_case(None; "absent")]
    #[test_case(Some(""); "empty")]
    #[test_case(Some("  \n"); "blank")]
    #[tokio::test]
    async fn identity_not_found(value: Option<&'static str>) {
        let mut mock = MockMetadata::new();
        mock.expect_metadata_available().return_const(true);
        mock.expect_lookup()
            .times(1)
            .returning(move |_, _| Ok(value.map(str::to_string)));

        let issuer = Issuer::new(mock);
        let err = issuer.get_issuer().await.unwrap_err();
        assert!(err.is_identity_not_found(), "{err:?}");
    }

    #[tokio::test]
    async fn lookup_error_propagates() {
        let mut mock = MockMetadata::new();
        mock.expect_metadata_available().return_const(true);
        mock.expect_lookup()
            .returning(|_, _| Err(Error::metadata_unavailable("connection reset")));

        let issuer = Issuer::new(mock);
        let err = issuer.get_issuer().await.unwrap_err();
        assert!(err.is_metadata_unavailable(), "{err:?}");
        let source = err.source().map(ToString::to_string).unwrap_or_default();
        assert!(source.contains("connection reset"), "{err:?}");
    }

    #[tokio::test]
    async fn failures_are_not_cached() -> TestResult {
        let mut seq = mockall::Sequence::new();
        let mut mock = MockMetadata::new();
        mock.expect_metadata_available()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(false);
        mock.expect_metadata_available()
            .times(1)
            .in_sequence(&mut seq)
            .return_const(true);
        mock.expect_lookup()
            .times(1)
            .returning(|_, _| Ok(Some("sa@project.iam.gserviceaccount.com\n".to_string())));

        let issuer = Issuer::new(mock);
        let err = issuer.get_issuer().await.unwrap_err();
        assert!(err.is_metadata_unavailable(), "{err:?}");

        let got = issuer.get_issuer().await?;
        assert_eq!(got, "sa@project.iam.gserviceaccount.com");
        let got = issuer.get_issuer().await?;
        assert_eq!(got, "sa@project.iam.gserviceaccount.com");
        Ok(())
    }
}
