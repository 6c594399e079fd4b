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

use std::path::{Path, PathBuf};

use bytes::Bytes;
use snafu::ResultExt;
use tokio::{
    fs::{self, File},
    io::{AsyncWriteExt, BufWriter},
};
use tracing::{debug, warn};

use crate::error::{DownloadError, WriteSnafu};

/// Suffix of the sibling file written before the final rename
pub const TEMP_SUFFIX: &str = ".download";

const WRITE_BUFFER_SIZE: usize = 512 * 1024;

/// Writes downloaded chunk buffers to their final location
pub struct ChunkMerger;

impl ChunkMerger {
    /// Concatenate `buffers` in order into `dest_dir/filename`.
    ///
    /// Bytes land in `<dest_dir>/<filename>.download` first and are renamed
    /// into place after a sync. The temporary file is removed on failure.
    pub async fn assemble(
        dest_dir: &Path,
        filename: &str,
        buffers: Vec<Bytes>,
    ) -> Result<(PathBuf, u64), DownloadError> {
        let target = dest_dir.join(filename);
        let temp = dest_dir.join(format!("{filename}{TEMP_SUFFIX}"));

        let size = match Self::write_all(&temp, buffers).await {
            Ok(size) => size,
            Err(err) => {
                Self::discard(&temp).await;
                return Err(err);
            }
        };

        if let Err(source) = fs::rename(&temp, &target).await {
            Self::discard(&temp).await;
            return Err(DownloadError::Write {
                path: target,
                source,
            });
        }

        debug!(path = %target.display(), size, "assembled file");
        Ok((target, size))
    }

    async fn write_all(temp: &Path, buffers: Vec<Bytes>) -> Result<u64, DownloadError> {
        let file = File::create(temp).await.context(WriteSnafu { path: temp })?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        let mut size = 0u64;

        for buffer in buffers {
            writer
                .write_all(&buffer)
                .await
                .context(WriteSnafu { path: temp })?;
            size += buffer.len() as u64;
        }

        writer.flush().await.context(WriteSnafu { path: temp })?;
        writer
            .get_mut()
            .sync_all()
            .await
            .context(WriteSnafu { path: temp })?;

        Ok(size)
    }

    async fn discard(temp: &Path) {
        if let Err(err) = fs::remove_file(temp).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %temp.display(), error = %err, "failed to remove temporary file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_assemble_concatenates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let buffers = vec![
            Bytes::from_static(b"abc"),
            Bytes::new(),
            Bytes::from_static(b"def"),
        ];

        let (path, size) = ChunkMerger::assemble(dir.path(), "out.bin", buffers)
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("out.bin"));
        assert_eq!(size, 6);
        assert_eq!(std::fs::read(&path).unwrap(), b"abcdef");
        assert!(!dir.path().join("out.bin.download").exists());
    }

    #[tokio::test]
    async fn test_assemble_empty_writes_zero_byte_file() {
        let dir = tempfile::tempdir().unwrap();
        let (path, size) = ChunkMerger::assemble(dir.path(), "empty", vec![Bytes::new()])
            .await
            .unwrap();
        assert_eq!(size, 0);
        assert_eq!(std::fs::metadata(path).unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_assemble_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = ChunkMerger::assemble(&missing, "out.bin", vec![Bytes::from_static(b"x")])
            .await
            .unwrap_err();

        assert!(matches!(err, DownloadError::Write { .. }));
        assert!(!missing.join("out.bin").exists());
        assert!(!missing.join("out.bin.download").exists());
    }
}
