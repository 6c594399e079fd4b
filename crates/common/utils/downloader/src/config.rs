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

use std::num::NonZeroUsize;

use bon::Builder;
use jiff::SignedDuration;
use smart_default::SmartDefault;

/// Number of range requests issued per resource unless configured otherwise.
pub const DEFAULT_WORKERS: NonZeroUsize = NonZeroUsize::new(10).unwrap();

/// Configuration for the downloader
#[derive(Debug, Clone, SmartDefault, Builder)]
pub struct DownloaderConfig {
    /// Number of chunks (and concurrent range requests) per resource
    #[default(DEFAULT_WORKERS)]
    #[builder(default = DEFAULT_WORKERS)]
    pub workers: NonZeroUsize,

    /// Timeout for establishing a connection. Transfers themselves are only
    /// bounded by the caller's cancellation token.
    #[default(SignedDuration::from_secs(30))]
    #[builder(default = SignedDuration::from_secs(30))]
    pub connect_timeout: SignedDuration,

    /// Custom User-Agent header, [`DEFAULT_USER_AGENT`] when unset
    pub user_agent: Option<String>,
}

/// User-Agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("aos/", env!("CARGO_PKG_VERSION"));

impl DownloaderConfig {
    /// User-Agent actually sent with every request.
    #[must_use]
    pub fn effective_user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DownloaderConfig::default();
        assert_eq!(config.workers.get(), 10);
        assert_eq!(config.connect_timeout, SignedDuration::from_secs(30));
        assert_eq!(config.effective_user_agent(), DEFAULT_USER_AGENT);
        assert!(DEFAULT_USER_AGENT.starts_with("aos/"));
    }

    #[test]
    fn test_builder_and_default_send_same_user_agent() {
        let built = DownloaderConfig::builder().build();
        let defaulted = DownloaderConfig::default();
        assert_eq!(built.effective_user_agent(), defaulted.effective_user_agent());

        let custom = DownloaderConfig::builder()
            .user_agent("custom/1.0".to_string())
            .build();
        assert_eq!(custom.effective_user_agent(), "custom/1.0");
    }

    #[test]
    fn test_builder_overrides_workers() {
        let config = DownloaderConfig::builder()
            .workers(NonZeroUsize::new(2).unwrap())
            .build();
        assert_eq!(config.workers.get(), 2);
        assert_eq!(config.connect_timeout, SignedDuration::from_secs(30));
        assert_eq!(config.effective_user_agent(), DEFAULT_USER_AGENT);
    }
}
