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

//! Parsers for the archive's HTML index tables.
//!
//! Project and version listings are Apache-style directory indexes: a header
//! row of `<th>`, separator rows, a "Parent Directory" link, then one row per
//! entry. Release pages carry `td.project-name` and `td.project-updated`
//! cells instead.

use scraper::{ElementRef, Html, Selector};
use snafu::{OptionExt, ensure};

use crate::{
    error::{ArchiveError, NotFoundProjectSnafu, NotFoundVersionSnafu, SelectorSnafu},
    project::{COMING_SOON, Project},
    version,
};

const PARENT_DIRECTORY: &str = "Parent Directory";
const TARBALL_SUFFIX: &str = ".tar.gz";

pub(crate) fn selector(css: &str) -> Result<Selector, ArchiveError> {
    Selector::parse(css).ok().context(SelectorSnafu { css })
}

fn text_of(cell: ElementRef<'_>) -> String { cell.text().collect::<String>() }

/// Link text of every `td > a` inside the index table rows.
fn row_links(html: &str) -> Result<Vec<String>, ArchiveError> {
    let document = Html::parse_document(html);
    let rows = selector("table > tbody > tr")?;
    let links = selector("td > a")?;

    Ok(document
        .select(&rows)
        .map(|row| row.select(&links).map(text_of).collect::<String>())
        .filter(|name| !name.is_empty())
        .collect())
}

/// Project names of a `tarballs/` or `source/` index page.
pub fn list_projects(html: &str) -> Result<Vec<String>, ArchiveError> {
    let projects: Vec<String> = row_links(html)?
        .into_iter()
        .filter_map(|name| name.strip_suffix('/').map(str::to_string))
        .collect();

    ensure!(!projects.is_empty(), NotFoundProjectSnafu);
    Ok(projects)
}

/// Versions listed on a project's index page, ascending and de-duplicated.
///
/// Entries look like `xnu-7195.81.3/` or `xnu-7195.81.3.tar.gz`; the version
/// is everything after the first `-`.
pub fn list_versions(html: &str) -> Result<Vec<String>, ArchiveError> {
    let mut versions: Vec<String> = row_links(html)?
        .iter()
        .filter(|name| name.as_str() != PARENT_DIRECTORY)
        .filter_map(|name| version_of(name))
        .map(|v| version::trim_zeros(v).to_string())
        .collect();

    ensure!(!versions.is_empty(), NotFoundVersionSnafu);
    version::sort_dedup(&mut versions);
    Ok(versions)
}

fn version_of(entry: &str) -> Option<&str> {
    let stem = entry
        .strip_suffix('/')
        .or_else(|| entry.strip_suffix(TARBALL_SUFFIX))?;
    let (_, version) = stem.split_once('-')?;
    (!version.is_empty()).then_some(version)
}

/// Projects of a release page.
pub fn list_release(html: &str) -> Result<Vec<Project>, ArchiveError> {
    let document = Html::parse_document(html);
    let rows = selector("table > tbody > tr")?;
    let name_cell = selector("td.project-name")?;
    let updated_cell = selector("td.project-updated")?;

    let mut projects = Vec::new();
    for row in document.select(&rows) {
        let Some(cell) = row.select(&name_cell).next() else {
            continue;
        };
        let data = text_of(cell);
        let data = data.trim();
        if data.is_empty() {
            continue;
        }

        let coming_soon = data.contains(COMING_SOON);
        let data = data.replace(COMING_SOON, "");
        let data = data.trim();
        let (name, version) = data.rsplit_once('-').unwrap_or((data, ""));

        let updated = row
            .select(&updated_cell)
            .next()
            .is_some_and(|cell| !text_of(cell).trim().is_empty());

        projects.push(Project {
            name: name.to_string(),
            version: version.to_string(),
            updated,
            coming_soon,
        });
    }

    Ok(projects)
}
