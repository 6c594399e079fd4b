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

use std::{path::Path, sync::Arc};

use jiff::Timestamp;
use snafu::{OptionExt, ResultExt, ensure};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::{
    chunk_merger::ChunkMerger,
    chunk_plan::ChunkPlan,
    config::DownloaderConfig,
    error::{BuildClientSnafu, CancelledSnafu, DownloadError, InvalidDestinationSnafu, InvalidUrlSnafu},
    file_info::FileInfoFetcher,
    parallel_manager::ParallelDownloadManager,
    progress::{ProgressSink, ProgressState},
    types::{DownloadRequest, DownloadResult, ResourceSize},
};

/// Fetches a batch of resources, one after another, each split into
/// concurrently downloaded byte ranges.
///
/// Components:
/// - `FileInfoFetcher`: sizes each resource with a HEAD request
/// - `ParallelDownloadManager`: runs one range request per planned chunk
/// - `ChunkMerger`: writes the ordered buffers through a temporary file
pub struct Downloader {
    config:    DownloaderConfig,
    file_info: FileInfoFetcher,
    parallel:  ParallelDownloadManager,
    progress:  Arc<dyn ProgressSink>,
}

impl Downloader {
    /// Create a downloader reporting to `progress`.
    pub fn new(
        config: DownloaderConfig,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<Self, DownloadError> {
        let client = Self::build_client(&config)?;

        Ok(Self {
            config,
            file_info: FileInfoFetcher::new(client.clone()),
            parallel: ParallelDownloadManager::new(client),
            progress,
        })
    }

    /// Download every URL of `request` into its destination directory.
    ///
    /// The destination is checked once before any network activity. URLs are
    /// processed in order and the first failure stops the batch; files
    /// written for earlier URLs are kept.
    pub async fn fetch(
        &self,
        request: &DownloadRequest,
        cancel: &CancellationToken,
    ) -> Result<Vec<DownloadResult>, DownloadError> {
        Self::check_destination(&request.dest_dir).await?;

        let mut results = Vec::with_capacity(request.urls.len());
        for url in &request.urls {
            ensure!(!cancel.is_cancelled(), CancelledSnafu { url });
            results.push(self.fetch_one(&request.dest_dir, url, cancel).await?);
        }
        Ok(results)
    }

    #[instrument(skip(self, dest_dir, cancel))]
    async fn fetch_one(
        &self,
        dest_dir: &Path,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<DownloadResult, DownloadError> {
        let start_time = Timestamp::now();
        let filename = file_name(url)?;

        let size = self.file_info.probe(url, cancel).await?;
        let plan = match size {
            ResourceSize::Known(length) => ChunkPlan::new(length, self.config.workers),
            ResourceSize::Unknown => ChunkPlan::whole_body(),
        };

        self.progress.start(&filename, size.display_total());
        let progress = Arc::new(ProgressState::new(filename.as_str(), Arc::clone(&self.progress)));

        let outcome = match self
            .parallel
            .download_all(url, Arc::new(plan), progress, cancel)
            .await
        {
            Ok(buffers) => ChunkMerger::assemble(dest_dir, &filename, buffers).await,
            Err(err) => Err(err),
        };
        self.progress.finish(&filename, outcome.is_ok());
        let (path, size) = outcome?;

        let duration = start_time.until(Timestamp::now()).unwrap_or_default();
        info!(path = %path.display(), size, "downloaded");

        Ok(DownloadResult {
            url: url.to_string(),
            path,
            size,
            duration,
        })
    }

    async fn check_destination(dest_dir: &Path) -> Result<(), DownloadError> {
        let is_dir = tokio::fs::metadata(dest_dir)
            .await
            .is_ok_and(|meta| meta.is_dir());
        ensure!(is_dir, InvalidDestinationSnafu { path: dest_dir });
        Ok(())
    }

    fn build_client(config: &DownloaderConfig) -> Result<reqwest::Client, DownloadError> {
        reqwest::Client::builder()
            .connect_timeout(config.connect_timeout.unsigned_abs())
            .user_agent(config.effective_user_agent())
            .build()
            .context(BuildClientSnafu)
    }
}

/// Final non-empty path segment of `url`, used as the output file name.
pub fn file_name(url: &str) -> Result<String, DownloadError> {
    let parsed = reqwest::Url::parse(url).ok().context(InvalidUrlSnafu { url })?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(str::to_string)
        .context(InvalidUrlSnafu { url })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_takes_last_segment() {
        assert_eq!(
            file_name("https://opensource.apple.com/tarballs/xnu/xnu-7195.81.3.tar.gz").unwrap(),
            "xnu-7195.81.3.tar.gz"
        );
    }

    #[test]
    fn test_file_name_skips_trailing_slash() {
        assert_eq!(file_name("http://example.com/dir/name/").unwrap(), "name");
    }

    #[test]
    fn test_file_name_rejects_bare_host_and_garbage() {
        assert!(matches!(
            file_name("http://example.com/"),
            Err(DownloadError::InvalidUrl { .. })
        ));
        assert!(matches!(
            file_name("not a url"),
            Err(DownloadError::InvalidUrl { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_destination_is_rejected_before_network() {
        let dir = tempfile::tempdir().unwrap();
        let downloader =
            Downloader::new(DownloaderConfig::default(), Arc::new(crate::NoopProgress)).unwrap();
        let request = DownloadRequest::builder()
            .dest_dir(dir.path().join("missing"))
            .urls(vec!["http://127.0.0.1:9/never".to_string()])
            .build();

        let err = downloader
            .fetch(&request, &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidDestination);
    }
}
