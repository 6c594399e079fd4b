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

use std::cmp::Ordering;

use snafu::{OptionExt, ensure};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    error::{ArchiveError, InvalidBaseSnafu},
    version,
};

/// Root of the public archive.
pub const DEFAULT_BASE_URL: &str = "https://opensource.apple.com/";

/// Kind of resource listing published by the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceType {
    /// Downloadable `.tar.gz` archives
    #[default]
    Tarballs,
    /// Browsable source trees
    Source,
}

/// Product line whose releases are indexed by the archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum Platform {
    #[strum(to_string = "macos")]
    MacOs,
    #[strum(to_string = "developer-tools", serialize = "xcode")]
    Xcode,
    #[strum(to_string = "ios")]
    Ios,
    #[strum(to_string = "server")]
    Server,
}

impl Platform {
    /// Page name prefix the site uses for a release of this platform.
    ///
    /// macOS changed its naming twice: releases after 10.11.6 use `macos`,
    /// 10.9 through 10.11.6 use `os-x` and anything older `mac-os-x`.
    #[must_use]
    pub fn release_prefix(self, version: &str) -> &'static str {
        match self {
            Self::MacOs => match version::compare(version, "10.11.6") {
                Ordering::Greater => "macos",
                Ordering::Equal => "os-x",
                Ordering::Less if version::compare(version, "10.9") != Ordering::Less => "os-x",
                Ordering::Less => "mac-os-x",
            },
            Self::Xcode => "developer-tools",
            Self::Ios => "ios",
            Self::Server => "os-x-server",
        }
    }

    /// Site-relative path of the release page, e.g.
    /// `release/macos-10122.html`.
    #[must_use]
    pub fn release_path(self, version: &str) -> String {
        format!(
            "release/{}-{}.html",
            self.release_prefix(version),
            version.replace('.', "")
        )
    }

    /// Release versions known to exist on the site, newest first.
    #[must_use]
    pub const fn known_releases(self) -> &'static [&'static str] {
        match self {
            Self::MacOs => MACOS_RELEASES,
            Self::Xcode => XCODE_RELEASES,
            Self::Ios => IOS_RELEASES,
            Self::Server => SERVER_RELEASES,
        }
    }
}

/// Location of the archive site. Every index URL is derived from `base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSite {
    base: String,
}

impl Default for ArchiveSite {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ArchiveSite {
    /// Use `base` as the site root. A trailing `/` is added when missing.
    pub fn new(base: &str) -> Result<Self, ArchiveError> {
        let url = reqwest::Url::parse(base)
            .ok()
            .context(InvalidBaseSnafu { url: base })?;
        ensure!(!url.cannot_be_a_base(), InvalidBaseSnafu { url: base });

        let mut base = url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self { base })
    }

    #[must_use]
    pub fn base(&self) -> &str { &self.base }

    /// Absolute URL for a site-relative `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path.trim_start_matches('/'))
    }

    /// Index of every project of `ty`, e.g. `<base>/tarballs/`.
    #[must_use]
    pub fn projects_url(&self, ty: ResourceType) -> String { self.url(&format!("{ty}/")) }

    /// Index of every published version of `project`.
    #[must_use]
    pub fn versions_url(&self, ty: ResourceType, project: &str) -> String {
        self.url(&format!("{ty}/{project}/"))
    }

    #[must_use]
    pub fn release_url(&self, platform: Platform, version: &str) -> String {
        self.url(&platform.release_path(version))
    }
}

const MACOS_RELEASES: &[&str] = &[
    "10.12.3", "10.12.2", "10.12.1", "10.12", "10.11.6", "10.11.5", "10.11.4", "10.11.3",
    "10.11.1", "10.11", "10.10.5", "10.10.4", "10.10.3", "10.10.1", "10.10", "10.9.5", "10.9.4",
    "10.9.3", "10.9.1", "10.9", "10.8.5", "10.8.4", "10.8.3", "10.8.1", "10.8", "10.7.5",
    "10.7.4", "10.7.3", "10.7.1", "10.7", "10.6.8", "10.6.7", "10.6.6", "10.6.5", "10.6.4",
    "10.6.3", "10.6.1", "10.6", "10.5.8", "10.5.7", "10.5.6", "10.5.5", "10.5.4", "10.5.3",
    "10.5.1", "10.5", "10.4.11.x86", "10.4.11.ppc", "10.4.10.x86", "10.4.10.ppc", "10.4.9.x86",
    "10.4.9.ppc", "10.4.8.x86", "10.4.8.ppc", "10.4.7.x86", "10.4.7.ppc", "10.4.6.x86",
    "10.4.6.ppc", "10.4.5.x86", "10.4.5.ppc", "10.4.4.x86", "10.4.4.ppc", "10.4.3", "10.4.1",
    "10.4", "10.3.9", "10.3.8", "10.3.7", "10.3.6", "10.3.5", "10.3.4", "10.3.3", "10.3.1",
    "10.3", "10.2.8", "10.2.8.G5", "10.2.7", "10.2.6", "10.2.5", "10.2.4", "10.2.3", "10.2.1",
    "10.2", "10.1.5", "10.1.4", "10.1.3", "10.1.1", "10.1", "10.0.4", "10.0.3", "10.0.1", "10.0",
];

const XCODE_RELEASES: &[&str] = &[
    "8.2.1", "8.1", "8.0", "7.3.1", "7.3", "7.2", "7.1", "7.0", "6.4", "6.3", "6.2", "6.1",
    "6.0", "5.1", "5.0", "4.6", "4.5", "4.4", "4.3", "4.2", "4.1", "4.0", "3.2.6", "3.2.5",
    "3.2.4", "3.2.3", "3.2.2", "3.2.1", "3.2", "3.1.4", "3.1.3", "3.1.2", "3.1.1", "3.1", "3.1b",
    "3.0", "2.5", "2.4.1", "2.4", "2.3", "2.2", "2.1", "WWDC2004DP", "WWDC2003DP", "Nov2004",
    "1.5", "1.2", "Jun2003", "Dec2002", "May2002", "Dec2001",
];

const IOS_RELEASES: &[&str] = &[
    "10.2.1", "10.2", "10.1", "10.0", "9.2", "9.1", "9.0", "8.4.1", "8.4", "8.3", "8.2",
    "8.1.3", "8.1.2", "8.1.1", "8.1", "8.0.1", "8.0", "7.1.2", "7.1.1", "7.1", "7.0.3", "7.0",
    "6.1.3", "6.1", "6.0.1", "6.0", "5.1.1", "5.1", "5.0", "4.3.3", "4.3.2", "4.3.1", "4.3",
    "4.2", "4.1", "4.0", "3.2", "3.1.3", "3.1.2", "3.1.1", "3.1", "3.0", "2.2.1", "2.2", "2.1",
    "2.0", "SDKb8", "SDKb7", "SDKb6", "SDKb5", "SDKb4", "SDKb3", "SDKb2", "1.1.4", "1.1.3",
    "1.1.2", "1.1.1", "1.0.1", "1.0",
];

const SERVER_RELEASES: &[&str] = &["3.0.2", "2.2.2"];
