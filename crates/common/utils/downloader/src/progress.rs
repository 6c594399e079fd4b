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

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// Receives progress for the resource currently being downloaded.
///
/// Implementations are owned by the caller and shared with every chunk task,
/// so all methods take `&self` and must be thread-safe.
pub trait ProgressSink: Send + Sync {
    /// A resource is about to be transferred. `total` is zero when the server
    /// did not report a length.
    fn start(&self, resource: &str, total: u64);

    /// `downloaded` bytes of `resource` have been received so far.
    fn advance(&self, resource: &str, downloaded: u64);

    /// The transfer ended. `success` is false when the resource failed.
    fn finish(&self, resource: &str, success: bool);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn start(&self, _resource: &str, _total: u64) {}

    fn advance(&self, _resource: &str, _downloaded: u64) {}

    fn finish(&self, _resource: &str, _success: bool) {}
}

/// Byte counter shared by all chunk tasks of one resource.
pub struct ProgressState {
    resource:   String,
    downloaded: AtomicU64,
    sink:       Arc<dyn ProgressSink>,
}

impl ProgressState {
    pub fn new(resource: impl Into<String>, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            resource: resource.into(),
            downloaded: AtomicU64::new(0),
            sink,
        }
    }

    /// Add `bytes` to the counter and forward the new total to the sink.
    pub fn add(&self, bytes: u64) {
        let downloaded = self.downloaded.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.sink.advance(&self.resource, downloaded);
    }

    #[must_use]
    pub fn downloaded(&self) -> u64 { self.downloaded.load(Ordering::Relaxed) }

    #[must_use]
    pub fn resource(&self) -> &str { &self.resource }
}
