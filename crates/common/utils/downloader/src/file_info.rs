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

use snafu::{OptionExt, ResultExt, ensure};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
    error::{CancelledSnafu, DownloadError, ProbeContentLengthSnafu, ProbeHttpSnafu, ProbeNetworkSnafu},
    types::ResourceSize,
};

/// Issues the metadata-only request that sizes a resource before transfer
pub struct FileInfoFetcher {
    client: reqwest::Client,
}

impl FileInfoFetcher {
    pub const fn new(client: reqwest::Client) -> Self { Self { client } }

    /// Send a HEAD request for `url` and read its `Content-Length`.
    ///
    /// A missing header yields [`ResourceSize::Unknown`]; a header that is
    /// present but not a number is an error.
    pub async fn probe(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<ResourceSize, DownloadError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => CancelledSnafu { url }.fail(),
            result = self.head(url) => result,
        }
    }

    async fn head(&self, url: &str) -> Result<ResourceSize, DownloadError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .context(ProbeNetworkSnafu { url })?;

        let status = response.status();
        ensure!(
            status.is_success(),
            ProbeHttpSnafu {
                url,
                status: status.as_u16(),
            }
        );

        let Some(value) = response.headers().get(reqwest::header::CONTENT_LENGTH) else {
            debug!(url, "server did not report a length");
            return Ok(ResourceSize::Unknown);
        };

        let text = String::from_utf8_lossy(value.as_bytes());
        let length = text
            .trim()
            .parse::<u64>()
            .ok()
            .context(ProbeContentLengthSnafu {
                url,
                value: text.as_ref(),
            })?;

        debug!(url, length, "probed resource size");
        Ok(ResourceSize::Known(length))
    }
}
