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

//! Access to the Google Cloud [metadata service].
//!
//! The issuer is discovered through a [MetadataProvider]. The default
//! implementation is [Client], which talks to the metadata service over HTTP.
//! Applications may provide their own implementation, for example to run
//! outside of Google Cloud or in tests.
//!
//! [metadata service]: https://cloud.google.com/compute/docs/metadata/overview

use crate::Result;

mod client;
pub use client::Client;

pub(crate) const METADATA_FLAVOR_VALUE: &str = "Google";
pub(crate) const METADATA_FLAVOR: &str = "metadata-flavor";
pub(crate) const METADATA_ROOT: &str = "http://metadata.google.internal";
pub(crate) const METADATA_PATH_PREFIX: &str = "/computeMetadata/v1";
pub(crate) const GCE_METADATA_HOST_ENV_VAR: &str = "GCE_METADATA_HOST";

/// Answers questions about the environment the application runs in.
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync + std::fmt::Debug {
    /// Returns `true` if a metadata service is reachable.
    async fn metadata_available(&self) -> bool;

    /// Looks up `key` in `category`, e.g. `("instance", "hostname")`.
    ///
    /// Returns `Ok(None)` if the metadata service has no such key.
    async fn lookup(&self, category: &str, key: &str) -> Result<Option<String>>;
}
