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

use crate::{
    cache::{PageCache, PageKey},
    client::IndexClient,
    error::ArchiveError,
    parse,
    project::Project,
    resource::{ArchiveSite, Platform, ResourceType},
};

/// Cached view of the archive: fetches index pages through the page cache
/// and parses them into records.
#[derive(Debug, Clone)]
pub struct Catalog {
    client:   IndexClient,
    cache:    PageCache,
    no_cache: bool,
}

impl Catalog {
    /// `no_cache` forces every page to be fetched again.
    pub const fn new(client: IndexClient, cache: PageCache, no_cache: bool) -> Self {
        Self {
            client,
            cache,
            no_cache,
        }
    }

    #[must_use]
    pub const fn site(&self) -> &ArchiveSite { self.client.site() }

    #[must_use]
    pub const fn cache(&self) -> &PageCache { &self.cache }

    /// Names of every project of `ty`.
    pub async fn projects(&self, ty: ResourceType) -> Result<Vec<String>, ArchiveError> {
        let page = self
            .cache
            .get_or_fetch(&PageKey::Projects(ty), self.no_cache, || {
                self.client.index_projects(ty)
            })
            .await?;
        parse::list_projects(&page)
    }

    /// Published versions of `project`, ascending.
    pub async fn versions(
        &self,
        ty: ResourceType,
        project: &str,
    ) -> Result<Vec<String>, ArchiveError> {
        let key = PageKey::versions(ty, project)?;
        let page = self
            .cache
            .get_or_fetch(&key, self.no_cache, || {
                self.client.index_versions(ty, project)
            })
            .await?;
        parse::list_versions(&page)
    }

    /// Projects shipped with one platform release.
    pub async fn release(
        &self,
        platform: Platform,
        version: &str,
    ) -> Result<Vec<Project>, ArchiveError> {
        let key = PageKey::Release {
            platform,
            version: version.to_string(),
        };
        let page = self
            .cache
            .get_or_fetch(&key, self.no_cache, || {
                self.client.index_release(platform, version)
            })
            .await?;
        parse::list_release(&page)
    }
}
