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

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ArchiveError {
    #[snafu(display("Not found any project"))]
    NotFoundProject,

    #[snafu(display("Not found any version"))]
    NotFoundVersion,

    #[snafu(display("Not found {url}"))]
    NotFound { url: String },

    #[snafu(display("Invalid project name {name:?}"))]
    InvalidProject { name: String },

    #[snafu(display("Invalid archive base URL: {url}"))]
    InvalidBase { url: String },

    #[snafu(display("Request to {url} failed: {source}"))]
    Request { url: String, source: reqwest::Error },

    #[snafu(display("Request to {url} returned HTTP {status}"))]
    Http { url: String, status: u16 },

    #[snafu(display("Invalid CSS selector {css:?}"))]
    Selector { css: String },

    #[snafu(display("No cache at {}", path.display()))]
    CacheMissing { path: PathBuf },

    #[snafu(display("Cannot determine the cache directory; set APPLEOPENSOURCE_CACHE_DIR"))]
    NoCacheDir,

    #[snafu(display("Cache I/O error at {}: {source}", path.display()))]
    CacheIo {
        path:   PathBuf,
        source: std::io::Error,
    },
}

impl ArchiveError {
    /// True for "the site has nothing here" outcomes as opposed to transport
    /// or local failures.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::NotFoundProject | Self::NotFoundVersion
        )
    }
}
