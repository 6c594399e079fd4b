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

use std::{
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use snafu::{OptionExt, ResultExt, ensure};
use tokio::fs;
use tracing::{debug, info};

use crate::{
    error::{ArchiveError, CacheIoSnafu, CacheMissingSnafu, InvalidProjectSnafu, NoCacheDirSnafu},
    resource::{Platform, ResourceType},
};

const PAGE_EXT: &str = "html";

/// Identifies one cached index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKey {
    /// `list/<type>.html`
    Projects(ResourceType),
    /// `<type>/<project>.html`
    Versions { ty: ResourceType, project: String },
    /// `release/<platform>-<version without dots>.html`
    Release { platform: Platform, version: String },
}

impl PageKey {
    /// Key of a project's version index. `project` becomes a file name, so
    /// names that could leave the cache root are rejected.
    pub fn versions(ty: ResourceType, project: &str) -> Result<Self, ArchiveError> {
        ensure!(
            is_plain_name(project),
            InvalidProjectSnafu { name: project }
        );
        Ok(Self::Versions {
            ty,
            project: project.to_string(),
        })
    }

    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        match self {
            Self::Projects(ty) => Path::new("list").join(format!("{ty}.{PAGE_EXT}")),
            Self::Versions { ty, project } => {
                PathBuf::from(ty.to_string()).join(format!("{project}.{PAGE_EXT}"))
            }
            Self::Release { platform, version } => Path::new("release").join(format!(
                "{platform}-{}.{PAGE_EXT}",
                version.replace('.', "")
            )),
        }
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && Path::new(name).is_relative()
}

/// File-backed cache of fetched index pages.
#[derive(Debug, Clone)]
pub struct PageCache {
    root: PathBuf,
}

impl PageCache {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    /// Cache rooted at [`aos_paths::cache_dir`].
    pub fn from_env() -> Result<Self, ArchiveError> {
        let root = aos_paths::cache_dir().context(NoCacheDirSnafu)?;
        Ok(Self::new(root))
    }

    #[must_use]
    pub fn root(&self) -> &Path { &self.root }

    #[must_use]
    pub fn path_of(&self, key: &PageKey) -> PathBuf { self.root.join(key.relative_path()) }

    /// Cached page for `key`, or `None` when it has not been stored.
    pub async fn read(&self, key: &PageKey) -> Result<Option<String>, ArchiveError> {
        let path = self.path_of(key);
        match fs::read_to_string(&path).await {
            Ok(page) => Ok(Some(page)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ArchiveError::CacheIo { path, source }),
        }
    }

    /// Store `page` under `key`, replacing any previous copy atomically.
    pub async fn write(&self, key: &PageKey, page: &str) -> Result<PathBuf, ArchiveError> {
        let path = self.path_of(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .context(CacheIoSnafu { path: parent })?;
        }

        let temp = path.with_extension(format!("{PAGE_EXT}.tmp"));
        fs::write(&temp, page)
            .await
            .context(CacheIoSnafu { path: &temp })?;
        if let Err(source) = fs::rename(&temp, &path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(ArchiveError::CacheIo { path, source });
        }
        Ok(path)
    }

    /// Return the cached page unless `no_cache` is set; otherwise run `fetch`
    /// and store its result before returning it.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &PageKey,
        no_cache: bool,
        fetch: F,
    ) -> Result<String, ArchiveError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, ArchiveError>>,
    {
        if !no_cache {
            if let Some(page) = self.read(key).await? {
                debug!(?key, "cache hit");
                return Ok(page);
            }
        }

        let page = fetch().await?;
        let path = self.write(key, &page).await?;
        debug!(?key, path = %path.display(), "cached page");
        Ok(page)
    }

    /// Names of projects whose version index of `ty` is cached, sorted.
    pub async fn list(&self, ty: ResourceType) -> Result<Vec<String>, ArchiveError> {
        self.ensure_root().await?;
        let dir = self.root.join(ty.to_string());

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return CacheMissingSnafu { path: dir }.fail();
            }
            Err(source) => return Err(ArchiveError::CacheIo { path: dir, source }),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .context(CacheIoSnafu { path: &dir })?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == PAGE_EXT) {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete the whole cache directory.
    pub async fn clear(&self) -> Result<(), ArchiveError> {
        self.ensure_root().await?;
        fs::remove_dir_all(&self.root)
            .await
            .context(CacheIoSnafu { path: &self.root })?;
        info!(path = %self.root.display(), "deleted cache");
        Ok(())
    }

    async fn ensure_root(&self) -> Result<(), ArchiveError> {
        let exists = fs::metadata(&self.root)
            .await
            .is_ok_and(|meta| meta.is_dir());
        ensure!(exists, CacheMissingSnafu { path: &self.root });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn versions_key(project: &str) -> PageKey {
        PageKey::Versions {
            ty:      ResourceType::Tarballs,
            project: project.to_string(),
        }
    }

    #[test]
    fn test_relative_paths() {
        assert_eq!(
            PageKey::Projects(ResourceType::Source).relative_path(),
            Path::new("list/source.html")
        );
        assert_eq!(versions_key("xnu").relative_path(), Path::new("tarballs/xnu.html"));
        assert_eq!(
            PageKey::Release {
                platform: Platform::MacOs,
                version:  "10.12.2".to_string(),
            }
            .relative_path(),
            Path::new("release/macos-10122.html")
        );
    }

    #[test]
    fn test_versions_key_rejects_escaping_names() {
        for name in ["../../x", "..", "a/b", "a\\b", "/etc/passwd", ""] {
            assert!(
                matches!(
                    PageKey::versions(ResourceType::Tarballs, name),
                    Err(ArchiveError::InvalidProject { .. })
                ),
                "{name:?}"
            );
        }
        assert_eq!(
            PageKey::versions(ResourceType::Source, "CF-lite").unwrap(),
            PageKey::Versions {
                ty:      ResourceType::Source,
                project: "CF-lite".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_get_or_fetch_uses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        let calls = AtomicUsize::new(0);
        let key = versions_key("xnu");

        for _ in 0..2 {
            let page = cache
                .get_or_fetch(&key, false, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("<table></table>".to_string())
                })
                .await
                .unwrap();
            assert_eq!(page, "<table></table>");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(dir.path().join("tarballs/xnu.html").exists());
        assert!(!dir.path().join("tarballs/xnu.html.tmp").exists());
    }

    #[tokio::test]
    async fn test_no_cache_refetches_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        let key = versions_key("dyld");
        cache.write(&key, "old").await.unwrap();

        let page = cache
            .get_or_fetch(&key, true, || async { Ok("new".to_string()) })
            .await
            .unwrap();
        assert_eq!(page, "new");
        assert_eq!(cache.read(&key).await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_failed_fetch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PageCache::new(dir.path());
        let key = versions_key("missing");

        let err = cache
            .get_or_fetch(&key, false, || async {
                Err(ArchiveError::NotFound {
                    url: "http://example.com/tarballs/missing/".to_string(),
                })
            })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(cache.read(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("aos");
        let cache = PageCache::new(&root);

        assert!(matches!(
            cache.list(ResourceType::Tarballs).await.unwrap_err(),
            ArchiveError::CacheMissing { .. }
        ));

        cache.write(&versions_key("xnu"), "x").await.unwrap();
        cache.write(&versions_key("CF"), "c").await.unwrap();
        cache
            .write(&PageKey::Projects(ResourceType::Tarballs), "l")
            .await
            .unwrap();

        assert_eq!(cache.list(ResourceType::Tarballs).await.unwrap(), vec!["CF", "xnu"]);
        assert!(matches!(
            cache.list(ResourceType::Source).await.unwrap_err(),
            ArchiveError::CacheMissing { .. }
        ));

        cache.clear().await.unwrap();
        assert!(!root.exists());
        assert!(matches!(
            cache.clear().await.unwrap_err(),
            ArchiveError::CacheMissing { .. }
        ));
    }
}
