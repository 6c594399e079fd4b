// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use snafu::Snafu;
use strum_macros::{Display, IntoStaticStr};

/// Failure of a single chunk transfer.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub), module(transfer))]
pub enum TransferError {
    #[snafu(display("Network error: {source}"))]
    Network { source: reqwest::Error },

    #[snafu(display("HTTP error {status}"))]
    Http { status: u16 },

    #[snafu(display("Server ignored the Range header and answered with the full body"))]
    RangeNotSupported,

    #[snafu(display("Body length mismatch: expected {expected} bytes, got {actual}"))]
    LengthMismatch { expected: u64, actual: u64 },

    #[snafu(display("Cancelled"))]
    Cancelled,

    #[snafu(display("Task panicked: {message}"))]
    TaskPanicked { message: String },
}

/// Coarse classification of a [`DownloadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Client,
    InvalidDestination,
    InvalidUrl,
    SizeProbe,
    Transfer,
    Write,
    Cancelled,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DownloadError {
    #[snafu(display("Failed to build HTTP client: {source}"))]
    BuildClient { source: reqwest::Error },

    #[snafu(display("Destination {} does not exist or is not a directory", path.display()))]
    InvalidDestination { path: PathBuf },

    #[snafu(display("Invalid resource URL: {url}"))]
    InvalidUrl { url: String },

    #[snafu(display("Size probe for {url} failed: {source}"))]
    ProbeNetwork { url: String, source: reqwest::Error },

    #[snafu(display("Size probe for {url} returned HTTP {status}"))]
    ProbeHttp { url: String, status: u16 },

    #[snafu(display("Size probe for {url} returned an unparseable Content-Length: {value:?}"))]
    ProbeContentLength { url: String, value: String },

    #[snafu(display("Chunk {index} of {url} failed: {source}"))]
    Transfer {
        url:    String,
        index:  usize,
        source: TransferError,
    },

    #[snafu(display("Failed to write {}: {source}", path.display()))]
    Write {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Fetch of {url} was cancelled"))]
    Cancelled { url: String },
}

impl DownloadError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BuildClient { .. } => ErrorKind::Client,
            Self::InvalidDestination { .. } => ErrorKind::InvalidDestination,
            Self::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Self::ProbeNetwork { .. } | Self::ProbeHttp { .. } | Self::ProbeContentLength { .. } => {
                ErrorKind::SizeProbe
            }
            Self::Transfer { .. } => ErrorKind::Transfer,
            Self::Write { .. } => ErrorKind::Write,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// True when the failure was caused by cancellation rather than by the
    /// remote side or the local filesystem.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Cancelled { .. }
                | Self::Transfer {
                    source: TransferError::Cancelled,
                    ..
                }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let err = DownloadError::ProbeHttp {
            url:    "http://example.com/a.tar.gz".to_string(),
            status: 404,
        };
        assert_eq!(err.kind(), ErrorKind::SizeProbe);
        assert_eq!(err.kind().to_string(), "size_probe");

        let err = DownloadError::Transfer {
            url:    "http://example.com/a.tar.gz".to_string(),
            index:  3,
            source: TransferError::Http { status: 500 },
        };
        assert_eq!(err.kind(), ErrorKind::Transfer);
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_cancelled_transfer_is_cancelled() {
        let err = DownloadError::Transfer {
            url:    "http://example.com/a.tar.gz".to_string(),
            index:  0,
            source: TransferError::Cancelled,
        };
        assert!(err.is_cancelled());
    }
}
