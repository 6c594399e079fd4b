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
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Environment variable that overrides the page cache location.
pub const CACHE_DIR_ENV: &str = "APPLEOPENSOURCE_CACHE_DIR";

/// Directory name used under the platform cache directory.
const CACHE_DIR_NAME: &str = "appleopensource";

/// Returns the directory holding cached index pages.
///
/// `$APPLEOPENSOURCE_CACHE_DIR` wins when set and non-empty. Otherwise this
/// is `appleopensource` under the platform cache directory:
/// `~/Library/Caches` on macOS, `$XDG_CACHE_HOME` or `~/.cache` on Linux.
/// Returns `None` only when no home directory can be determined.
pub fn cache_dir() -> Option<PathBuf> {
    resolve_cache_dir(std::env::var_os(CACHE_DIR_ENV), dirs::cache_dir().as_deref())
}

/// Pure form of [`cache_dir`] taking the override and platform directory.
pub fn resolve_cache_dir(env_override: Option<OsString>, platform: Option<&Path>) -> Option<PathBuf> {
    match env_override {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => platform.map(|base| base.join(CACHE_DIR_NAME)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dir = resolve_cache_dir(Some("/tmp/aos-cache".into()), Some(Path::new("/home/u/.cache")));
        assert_eq!(dir, Some(PathBuf::from("/tmp/aos-cache")));
    }

    #[test]
    fn test_empty_override_falls_back() {
        let dir = resolve_cache_dir(Some(OsString::new()), Some(Path::new("/home/u/.cache")));
        assert_eq!(dir, Some(PathBuf::from("/home/u/.cache/appleopensource")));
    }

    #[test]
    fn test_no_platform_dir() {
        assert_eq!(resolve_cache_dir(None, None), None);
    }
}
