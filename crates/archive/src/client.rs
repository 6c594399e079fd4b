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

use reqwest::StatusCode;
use scraper::Html;
use snafu::{ResultExt, ensure};
use tracing::debug;

use crate::{
    error::{ArchiveError, HttpSnafu, NotFoundSnafu, RequestSnafu},
    parse::selector,
    resource::{ArchiveSite, Platform, ResourceType},
};

/// Fetches index pages from the archive site
#[derive(Debug, Clone)]
pub struct IndexClient {
    client: reqwest::Client,
    site:   ArchiveSite,
}

impl IndexClient {
    pub const fn new(client: reqwest::Client, site: ArchiveSite) -> Self { Self { client, site } }

    #[must_use]
    pub const fn site(&self) -> &ArchiveSite { &self.site }

    /// Index of every project of `ty`.
    pub async fn index_projects(&self, ty: ResourceType) -> Result<String, ArchiveError> {
        self.fetch_body(&self.site.projects_url(ty)).await
    }

    /// Index of every version of `project`.
    pub async fn index_versions(
        &self,
        ty: ResourceType,
        project: &str,
    ) -> Result<String, ArchiveError> {
        self.fetch_body(&self.site.versions_url(ty, project)).await
    }

    /// Project table of one platform release.
    pub async fn index_release(
        &self,
        platform: Platform,
        version: &str,
    ) -> Result<String, ArchiveError> {
        self.fetch_body(&self.site.release_url(platform, version)).await
    }

    /// GET `url` and return the trimmed inner HTML of its `<body>`.
    async fn fetch_body(&self, url: &str) -> Result<String, ArchiveError> {
        debug!(url, "fetching index page");
        let response = self.client.get(url).send().await.context(RequestSnafu { url })?;

        let status = response.status();
        ensure!(status != StatusCode::NOT_FOUND, NotFoundSnafu { url });
        ensure!(
            status.is_success(),
            HttpSnafu {
                url,
                status: status.as_u16(),
            }
        );

        let text = response.text().await.context(RequestSnafu { url })?;
        let body = extract_body(&text)?;
        ensure!(!body.is_empty(), NotFoundSnafu { url });
        Ok(body)
    }
}

/// Trimmed inner HTML of the document's `<body>`.
pub fn extract_body(html: &str) -> Result<String, ArchiveError> {
    let document = Html::parse_document(html);
    let body = selector("body")?;
    Ok(document
        .select(&body)
        .next()
        .map(|body| body.inner_html().trim().to_string())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_body_trims() {
        let html = "<html><head><title>t</title></head><body>\n  <table></table>\n</body></html>";
        assert_eq!(extract_body(html).unwrap(), "<table></table>");
    }

    #[test]
    fn test_extract_body_empty() {
        assert_eq!(extract_body("<html><body>   </body></html>").unwrap(), "");
    }
}
