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

mod chunk_downloader;
mod chunk_merger;
mod chunk_plan;
mod config;
mod downloader;
mod error;
mod file_info;
mod parallel_manager;
mod progress;
mod types;

pub use chunk_merger::TEMP_SUFFIX;
pub use chunk_plan::{Chunk, ChunkPlan, ChunkSpan};
pub use config::{DEFAULT_USER_AGENT, DEFAULT_WORKERS, DownloaderConfig};
pub use downloader::{Downloader, file_name};
pub use error::{DownloadError, ErrorKind, TransferError};
pub use progress::{NoopProgress, ProgressSink, ProgressState};
pub use types::{DownloadRequest, DownloadResult, ResourceSize};
