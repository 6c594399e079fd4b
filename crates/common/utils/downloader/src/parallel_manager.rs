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

use std::{collections::HashMap, sync::Arc};

use bytes::Bytes;
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{
    chunk_downloader::ChunkDownloader,
    chunk_plan::ChunkPlan,
    error::{DownloadError, TransferError},
    progress::ProgressState,
};

/// Result type for chunk download operations
type ChunkResult = (usize, Result<Bytes, TransferError>);

/// Runs one task per planned chunk and cancels the siblings on first failure
pub struct ParallelDownloadManager {
    client: reqwest::Client,
}

impl ParallelDownloadManager {
    pub const fn new(client: reqwest::Client) -> Self { Self { client } }

    /// Download every chunk of `plan` concurrently.
    ///
    /// Returns the buffers in plan order. On failure the first error by
    /// completion order is returned after every task has finished; partial
    /// buffers are dropped.
    pub async fn download_all(
        &self,
        url: &str,
        plan: Arc<ChunkPlan>,
        progress: Arc<ProgressState>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Bytes>, DownloadError> {
        let group = cancel.child_token();
        let (mut tasks, indices) = self.spawn_workers(url, &plan, &progress, &group);

        let mut slots: Vec<Option<Bytes>> = vec![None; plan.len()];
        let mut first_error: Option<(usize, TransferError)> = None;

        while let Some(joined) = tasks.join_next_with_id().await {
            let (index, result) = match joined {
                Ok((_, outcome)) => outcome,
                Err(err) => {
                    let index = indices.get(&err.id()).copied().unwrap_or_default();
                    (index, Err(Self::join_failure(&err)))
                }
            };

            match result {
                Ok(buffer) => slots[index] = Some(buffer),
                Err(err) => {
                    if first_error.is_none() {
                        if !matches!(err, TransferError::Cancelled) {
                            warn!(url, index, error = %err, "chunk failed, cancelling siblings");
                        }
                        group.cancel();
                        first_error = Some((index, err));
                    } else {
                        debug!(url, index, error = %err, "sibling chunk stopped");
                    }
                }
            }
        }

        if let Some((index, source)) = first_error {
            return Err(DownloadError::Transfer {
                url: url.to_string(),
                index,
                source,
            });
        }

        Ok(slots.into_iter().map(Option::unwrap_or_default).collect())
    }

    fn spawn_workers(
        &self,
        url: &str,
        plan: &Arc<ChunkPlan>,
        progress: &Arc<ProgressState>,
        group: &CancellationToken,
    ) -> (JoinSet<ChunkResult>, HashMap<Id, usize>) {
        let mut tasks = JoinSet::new();
        let mut indices = HashMap::with_capacity(plan.len());

        for chunk in plan.chunks().iter().copied() {
            let downloader = ChunkDownloader::new(self.client.clone(), url.to_string());
            let plan = Arc::clone(plan);
            let progress = Arc::clone(progress);
            let group = group.clone();

            let handle = tasks.spawn(async move {
                let result = downloader.download(&plan, &chunk, &progress, &group).await;
                (chunk.index, result)
            });
            indices.insert(handle.id(), chunk.index);
        }

        (tasks, indices)
    }

    fn join_failure(err: &JoinError) -> TransferError {
        if err.is_cancelled() {
            TransferError::Cancelled
        } else {
            TransferError::TaskPanicked {
                message: err.to_string(),
            }
        }
    }
}
