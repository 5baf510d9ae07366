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

use super::{
    GCE_METADATA_HOST_ENV_VAR, METADATA_FLAVOR, METADATA_FLAVOR_VALUE, METADATA_PATH_PREFIX,
    METADATA_ROOT, MetadataProvider,
};
use crate::Result;
use crate::errors::Error;
use reqwest::{Client as ReqwestClient, RequestBuilder, StatusCode};
use std::time::Duration;

// Off Google Cloud the probe would otherwise wait for the full connect
// timeout of the platform.
const PING_TIMEOUT: Duration = Duration::from_millis(500);

/// A client for the GCP Compute Engine Metadata Service (MDS).
#[derive(Clone, Debug)]
pub struct Client {
    endpoint: String,
    inner: ReqwestClient,
}

impl Client {
    /// Creates a new client for the Metadata Service.
    ///
    /// The `GCE_METADATA_HOST` environment variable, if set, takes precedence
    /// over `endpoint_override`.
    pub fn new(endpoint_override: Option<String>) -> Self {
        let endpoint = Self::resolve_endpoint(endpoint_override);
        let endpoint = endpoint.trim_end_matches('/').to_string();

        Self {
            endpoint,
            inner: ReqwestClient::new(),
        }
    }

    fn resolve_endpoint(endpoint_override: Option<String>) -> String {
        if let Ok(host) = std::env::var(GCE_METADATA_HOST_ENV_VAR) {
            format!("http://{host}")
        } else if let Some(e) = endpoint_override {
            e
        } else {
            METADATA_ROOT.to_string()
        }
    }

    /// Creates a GET request to the MDS service with the correct headers.
    fn get(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.endpoint, path);
        self.inner
            .get(url)
            .header(METADATA_FLAVOR, METADATA_FLAVOR_VALUE)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for Client {
    async fn metadata_available(&self) -> bool {
        let response = self.get("/").timeout(PING_TIMEOUT).send().await;
        let available = match response {
            Ok(response) => {
                response.status().is_success()
                    && response
                        .headers()
                        .get(METADATA_FLAVOR)
                        .is_some_and(|v| v.as_bytes() == METADATA_FLAVOR_VALUE.as_bytes())
            }
            Err(e) => {
                tracing::debug!(endpoint = %self.endpoint, "metadata service probe failed: {e}");
                false
            }
        };
        tracing::debug!(endpoint = %self.endpoint, available, "probed metadata service");
        available
    }

    async fn lookup(&self, category: &str, key: &str) -> Result<Option<String>> {
        let path = format!(
            "{METADATA_PATH_PREFIX}/{}/{}",
            category.trim_matches('/'),
            key.trim_start_matches('/')
        );
        let response = self
            .get(&path)
            .send()
            .await
            .map_err(Error::metadata_unavailable)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let err_text = response
                .text()
                .await
                .map_err(Error::metadata_unavailable)?;
            return Err(Error::metadata_unavailable(format!(
                "failed to look up {path}, status: {status}, body: {err_text:?}"
            )));
        }

        let value = response
            .text()
            .await
            .map_err(Error::metadata_unavailable)?;
        Ok(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use scoped_env::ScopedEnv;
    use serial_test::{parallel, serial};
    use std::error::Error as _;
    use test_case::test_case;

    type TestResult = anyhow::Result<()>;

    const EMAIL_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/email";

    fn client(server: &Server) -> Client {
        Client::new(Some(format!("http://{}", server.addr())))
    }

    #[tokio::test]
    #[parallel]
    async fn available() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/"),
                request::headers(contains(("metadata-flavor", "Google"))),
            ])
            .respond_with(status_code(200).insert_header("Metadata-Flavor", "Google")),
        );

        assert!(client(&server).metadata_available().await);
    }

    #[tokio::test]
    #[parallel]
    async fn unavailable_without_flavor_header() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/"))
                .respond_with(status_code(200).body("some captive portal")),
        );

        assert!(!client(&server).metadata_available().await);
    }

    #[test_case(404; "not found")]
    #[test_case(500; "internal error")]
    #[test_case(503; "unavailable")]
    #[tokio::test]
    #[parallel]
    async fn unavailable_on_error_status(code: u16) {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/"))
                .respond_with(status_code(code).insert_header("Metadata-Flavor", "Google")),
        );

        assert!(!client(&server).metadata_available().await);
    }

    #[tokio::test]
    #[parallel]
    async fn unavailable_when_unreachable() {
        let client = Client::new(Some("http://127.0.0.1:1".to_string()));
        assert!(!client.metadata_available().await);
    }

    #[tokio::test]
    #[parallel]
    async fn lookup_success() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", EMAIL_PATH),
                request::headers(contains(("metadata-flavor", "Google"))),
            ])
            .respond_with(status_code(200).body("sa@project.iam.gserviceaccount.com")),
        );

        let value = client(&server)
            .lookup("instance", "service-accounts/default/email")
            .await?;
        assert_eq!(value.as_deref(), Some("sa@project.iam.gserviceaccount.com"));
        Ok(())
    }

    #[tokio::test]
    #[parallel]
    async fn lookup_not_found() -> TestResult {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", EMAIL_PATH))
                .respond_with(status_code(404).body("Not Found")),
        );

        let value = client(&server)
            .lookup("instance", "service-accounts/default/email")
            .await?;
        assert!(value.is_none(), "{value:?}");
        Ok(())
    }

    #[tokio::test]
    #[parallel]
    async fn lookup_server_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", EMAIL_PATH))
                .respond_with(status_code(500).body("try-again")),
        );

        let err = client(&server)
            .lookup("/instance/", "/service-accounts/default/email")
            .await
            .unwrap_err();
        assert!(err.is_metadata_unavailable(), "{err:?}");
        let source = err.source().map(ToString::to_string).unwrap_or_default();
        assert!(source.contains("try-again"), "{err:?}");
    }

    #[test]
    #[parallel]
    fn resolve_endpoint_default() {
        let client = Client::default();
        assert_eq!(client.endpoint, "http://metadata.google.internal");
    }

    #[test]
    #[parallel]
    fn resolve_endpoint_override() {
        let client = Client::new(Some("http://custom.endpoint/".to_string()));
        assert_eq!(client.endpoint, "http://custom.endpoint");
    }

    #[test]
    #[serial]
    fn resolve_endpoint_env_var() {
        let _s = ScopedEnv::set(GCE_METADATA_HOST_ENV_VAR, "env.var.host");
        let client = Client::new(None);
        assert_eq!(client.endpoint, "http://env.var.host");
    }

    #[test]
    #[serial]
    fn resolve_endpoint_priority() {
        let _s = ScopedEnv::set(GCE_METADATA_HOST_ENV_VAR, "env.priority.host");
        let client = Client::new(Some("http://custom.endpoint".to_string()));
        assert_eq!(client.endpoint, "http://env.priority.host");
    }
}
