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

use crate::resource::{ArchiveSite, ResourceType};

/// Marker the site appends to release entries that are not published yet.
pub const COMING_SOON: &str = "(coming soon!)";

/// One published project version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub name:        String,
    pub version:     String,
    /// Changed since the previous release. Release pages only.
    pub updated:     bool,
    /// Announced but not downloadable yet. Release pages only.
    pub coming_soon: bool,
}

impl Project {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// `<name>-<version>`, the stem shared by tarballs and source trees
    #[must_use]
    pub fn stem(&self) -> String { format!("{}-{}", self.name, self.version) }

    /// Download URL of the project's `.tar.gz`
    #[must_use]
    pub fn tarball_url(&self, site: &ArchiveSite) -> String {
        site.url(&format!(
            "{}/{}/{}.tar.gz",
            ResourceType::Tarballs,
            self.name,
            self.stem()
        ))
    }

    /// Browsable source tree of the project
    #[must_use]
    pub fn source_url(&self, site: &ArchiveSite) -> String {
        site.url(&format!(
            "{}/{}/{}",
            ResourceType::Source,
            self.name,
            self.stem()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let site = ArchiveSite::default();
        let project = Project::new("xnu", "7195.81.3");
        assert_eq!(
            project.tarball_url(&site),
            "https://opensource.apple.com/tarballs/xnu/xnu-7195.81.3.tar.gz"
        );
        assert_eq!(
            project.source_url(&site),
            "https://opensource.apple.com/source/xnu/xnu-7195.81.3"
        );
    }
}
