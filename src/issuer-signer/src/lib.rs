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

//! Google Cloud Client Libraries for Rust - Service Account Issuer and Signer
//!
//! **WARNING:** this crate is under active development. We expect multiple
//! breaking changes in the upcoming releases. We welcome feedback about the
//! APIs, documentation, missing features, bugs, etc.
//!
//! Applications running on Google Cloud often need to sign data as their own
//! [service account], for example to create [signed URLs], without ever
//! holding a private key. This crate provides the two pieces needed for that:
//!
//! * The *issuer*: the email of the service account the application runs as,
//!   discovered through the [metadata service] and cached for the lifetime of
//!   the [IssuerAndSigner].
//! * A [Signer][signer::Signer], which delegates blob signing to the
//!   [signBlob] RPC of the IAM Service Account Credentials API, authenticated
//!   with [Application Default Credentials].
//!
//! ```no_run
//! # use google_cloud_issuer_signer::IssuerAndSigner;
//! # tokio_test::block_on(async {
//! let issuer_and_signer = IssuerAndSigner::default();
//! let signer = issuer_and_signer.signer();
//! let signature = signer.sign(b"string to sign").await?;
//! # Ok::<(), anyhow::Error>(())
//! # });
//! ```
//!
//! The metadata service, the credentials, and the signing service are
//! accessed through traits ([mds::MetadataProvider],
//! [credentials::CredentialsProvider], and [iam::SignBlobService]), so
//! applications can replace any of them, for example in tests.
//!
//! [service account]: https://cloud.google.com/iam/docs/service-account-overview
//! [signed URLs]: https://cloud.google.com/storage/docs/access-control/signed-urls
//! [metadata service]: https://cloud.google.com/compute/docs/metadata/overview
//! [signBlob]: https://cloud.google.com/iam/docs/reference/credentials/rest/v1/projects.serviceAccounts/signBlob
//! [Application Default Credentials]: https://cloud.google.com/docs/authentication/application-default-credentials

pub mod credentials;
pub mod errors;
pub mod iam;
pub mod mds;
pub mod signer;

mod issuer;
pub use issuer::Issuer;

mod issuer_and_signer;
pub use issuer_and_signer::{Builder, IssuerAndSigner};

/// A `Result` alias where the `Err` case is
/// `google_cloud_issuer_signer::errors::Error`.
pub type Result<T> = std::result::Result<T, crate::errors::Error>;
