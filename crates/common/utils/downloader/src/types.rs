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

use bon::Builder;
use jiff::Span;

/// A batch of resources to download into one directory
#[derive(Debug, Clone, Builder)]
pub struct DownloadRequest {
    /// Directory the downloaded files are written into. Must already exist.
    #[builder(into)]
    pub dest_dir: PathBuf,
    /// URLs to download, fetched one after another in this order
    #[builder(default)]
    pub urls:     Vec<String>,
}

/// Result of one successfully written resource
#[derive(Debug, Clone)]
pub struct DownloadResult {
    /// URL the resource was fetched from
    pub url:      String,
    /// Path where the file was saved
    pub path:     PathBuf,
    /// Size of the written file in bytes
    pub size:     u64,
    /// Time spent probing, transferring and writing this resource
    pub duration: Span,
}

/// Total length of a resource as reported by the size probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceSize {
    /// The server reported a `Content-Length`
    Known(u64),
    /// The server did not report a length; the body is fetched in one request
    Unknown,
}

impl ResourceSize {
    /// Total to show in progress output; unknown sizes report zero.
    #[must_use]
    pub const fn display_total(self) -> u64 {
        match self {
            Self::Known(len) => len,
            Self::Unknown => 0,
        }
    }
}
