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

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::StatusCode;
use snafu::{ResultExt, ensure};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::{
    chunk_plan::{Chunk, ChunkPlan},
    error::{
        TransferError,
        transfer::{CancelledSnafu, HttpSnafu, LengthMismatchSnafu, NetworkSnafu, RangeNotSupportedSnafu},
    },
    progress::ProgressState,
};

/// Downloads a single chunk of a resource into memory
pub struct ChunkDownloader {
    client: reqwest::Client,
    url:    String,
}

impl ChunkDownloader {
    pub const fn new(client: reqwest::Client, url: String) -> Self { Self { client, url } }

    /// Fetch `chunk`, racing the transfer against `cancel`.
    ///
    /// Empty chunks complete immediately without touching the network.
    pub async fn download(
        &self,
        plan: &ChunkPlan,
        chunk: &Chunk,
        progress: &ProgressState,
        cancel: &CancellationToken,
    ) -> Result<Bytes, TransferError> {
        if chunk.is_empty() {
            return Ok(Bytes::new());
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => CancelledSnafu.fail(),
            result = self.try_download(plan, chunk, progress) => result,
        }
    }

    async fn try_download(
        &self,
        plan: &ChunkPlan,
        chunk: &Chunk,
        progress: &ProgressState,
    ) -> Result<Bytes, TransferError> {
        let mut request = self.client.get(&self.url);
        if let Some(range_header) = chunk.range_header() {
            trace!(url = %self.url, index = chunk.index, range = %range_header, "requesting chunk");
            request = request.header(reqwest::header::RANGE, range_header);
        }

        let response = request.send().await.context(NetworkSnafu)?;

        let status = response.status();
        if status == StatusCode::OK {
            // A full body is only acceptable when it is exactly what we asked for.
            ensure!(plan.covers_whole(chunk), RangeNotSupportedSnafu);
        } else {
            ensure!(
                status == StatusCode::PARTIAL_CONTENT,
                HttpSnafu {
                    status: status.as_u16(),
                }
            );
        }

        let expected = chunk.len();
        let capacity = expected
            .and_then(|len| usize::try_from(len).ok())
            .unwrap_or_default();
        let mut buffer = BytesMut::with_capacity(capacity);
        let mut stream = response.bytes_stream();

        while let Some(data) = stream.next().await {
            let data = data.context(NetworkSnafu)?;
            progress.add(data.len() as u64);
            buffer.extend_from_slice(&data);
        }

        if let Some(expected) = expected {
            let actual = buffer.len() as u64;
            ensure!(actual == expected, LengthMismatchSnafu { expected, actual });
        }

        Ok(buffer.freeze())
    }
}
