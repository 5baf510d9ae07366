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

//! Errors returned while resolving the issuer or signing blobs.

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type for issuer resolution and blob signing.
///
/// None of these errors are retried by this crate. Applications decide how
/// to present or handle them.
///
/// Applications rarely need to create instances of this error type. The
/// exception is when they provide their own [MetadataProvider],
/// [CredentialsProvider] or [SignBlobService], for example in tests.
///
/// [MetadataProvider]: crate::mds::MetadataProvider
/// [CredentialsProvider]: crate::credentials::CredentialsProvider
/// [SignBlobService]: crate::iam::SignBlobService
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    /// The environment has no reachable metadata service.
    ///
    /// Typically the application is not running on Google Cloud.
    pub fn is_metadata_unavailable(&self) -> bool {
        matches!(self.0, ErrorKind::MetadataUnavailable(_))
    }

    /// The metadata service is reachable, but it has no service account email.
    pub fn is_identity_not_found(&self) -> bool {
        matches!(self.0, ErrorKind::IdentityNotFound(_))
    }

    /// No usable default credentials were found for the signing scope.
    pub fn is_credentials(&self) -> bool {
        matches!(self.0, ErrorKind::Credentials(_))
    }

    /// The remote signing service failed or returned an unusable response.
    pub fn is_signing(&self) -> bool {
        matches!(self.0, ErrorKind::Signing(_))
    }

    /// Creates an error representing an unreachable metadata service.
    pub fn metadata_unavailable<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::MetadataUnavailable(source.into()))
    }

    /// Creates an error representing a missing service account email.
    pub fn identity_not_found<T>(message: T) -> Error
    where
        T: Into<String>,
    {
        Error(ErrorKind::IdentityNotFound(message.into()))
    }

    /// Creates an error representing a failure to obtain credentials.
    pub fn credentials<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::Credentials(source.into()))
    }

    /// Creates an error representing a failed signing request.
    pub fn signing<T>(source: T) -> Error
    where
        T: Into<BoxError>,
    {
        Error(ErrorKind::Signing(source.into()))
    }
}

#[derive(thiserror::Error, Debug)]
enum ErrorKind {
    #[error("no Google Cloud metadata service is available")]
    MetadataUnavailable(#[source] BoxError),
    #[error("no service account email found in the metadata service: {0}")]
    IdentityNotFound(String),
    #[error("cannot obtain default credentials for signing")]
    Credentials(#[source] BoxError),
    #[error("failed to sign blob via the IAM credentials API")]
    Signing(#[source] BoxError),
}
