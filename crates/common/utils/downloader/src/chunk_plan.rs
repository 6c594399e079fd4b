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

/// Byte span covered by one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkSpan {
    /// Nothing to fetch; the chunk contributes no bytes
    Empty,
    /// Inclusive byte range `start..=end`
    Range { start: u64, end: u64 },
    /// The whole body of a resource whose length is unknown
    WholeBody,
}

/// One planned chunk of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Position of this chunk in the plan (0-based)
    pub index: usize,
    pub span:  ChunkSpan,
}

impl Chunk {
    /// Number of bytes this chunk is expected to carry, if known
    #[must_use]
    pub const fn len(&self) -> Option<u64> {
        match self.span {
            ChunkSpan::Empty => Some(0),
            ChunkSpan::Range { start, end } => Some(end - start + 1),
            ChunkSpan::WholeBody => None,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool { matches!(self.span, ChunkSpan::Empty) }

    /// Value for the `Range` request header, `None` when no header is sent
    #[must_use]
    pub fn range_header(&self) -> Option<String> {
        match self.span {
            ChunkSpan::Range { start, end } => Some(format!("bytes={start}-{end}")),
            ChunkSpan::Empty | ChunkSpan::WholeBody => None,
        }
    }
}

/// Ordered, contiguous chunks covering a whole resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    length: Option<u64>,
    chunks: Vec<Chunk>,
}

impl ChunkPlan {
    /// Split `length` bytes into `workers` ranges.
    ///
    /// Every range gets `length / workers` bytes and the remainder goes to
    /// the last one. An empty resource yields a single empty chunk. When
    /// `length < workers` the leading chunks are empty and the last chunk
    /// carries every byte.
    #[must_use]
    pub fn new(length: u64, workers: NonZeroUsize) -> Self {
        if length == 0 {
            return Self {
                length: Some(0),
                chunks: vec![Chunk {
                    index: 0,
                    span:  ChunkSpan::Empty,
                }],
            };
        }

        let workers = workers.get();
        let sub_length = length / workers as u64;
        let mut chunks = Vec::with_capacity(workers);

        for index in 0..workers {
            let start = index as u64 * sub_length;
            let size = if index == workers - 1 {
                length - start
            } else {
                sub_length
            };
            let span = if size == 0 {
                ChunkSpan::Empty
            } else {
                ChunkSpan::Range {
                    start,
                    end: start + size - 1,
                }
            };
            chunks.push(Chunk { index, span });
        }

        Self {
            length: Some(length),
            chunks,
        }
    }

    /// Single-chunk plan for a resource whose length the server did not report
    #[must_use]
    pub fn whole_body() -> Self {
        Self {
            length: None,
            chunks: vec![Chunk {
                index: 0,
                span:  ChunkSpan::WholeBody,
            }],
        }
    }

    /// Total length the plan covers, if known
    #[must_use]
    pub const fn length(&self) -> Option<u64> { self.length }

    #[must_use]
    pub fn chunks(&self) -> &[Chunk] { &self.chunks }

    #[must_use]
    pub fn len(&self) -> usize { self.chunks.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    /// True when `chunk` alone spans the whole resource, so a plain 200
    /// response is an acceptable answer to its range request.
    #[must_use]
    pub fn covers_whole(&self, chunk: &Chunk) -> bool {
        match (chunk.span, self.length) {
            (ChunkSpan::WholeBody, _) => true,
            (ChunkSpan::Range { start, end }, Some(length)) => start == 0 && end + 1 == length,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workers(n: usize) -> NonZeroUsize { NonZeroUsize::new(n).unwrap() }

    fn ranges(plan: &ChunkPlan) -> Vec<(u64, u64)> {
        plan.chunks()
            .iter()
            .filter_map(|c| match c.span {
                ChunkSpan::Range { start, end } => Some((start, end)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_even_split() {
        let plan = ChunkPlan::new(1000, workers(10));
        assert_eq!(plan.len(), 10);
        let expected: Vec<(u64, u64)> = (0..10).map(|i| (i * 100, i * 100 + 99)).collect();
        assert_eq!(ranges(&plan), expected);
    }

    #[test]
    fn test_remainder_goes_to_last_chunk() {
        let plan = ChunkPlan::new(1005, workers(10));
        let ranges = ranges(&plan);
        assert_eq!(ranges.len(), 10);
        for (i, (start, end)) in ranges.iter().take(9).enumerate() {
            assert_eq!(*start, i as u64 * 100);
            assert_eq!(end - start + 1, 100);
        }
        assert_eq!(ranges[9], (900, 1004));
        assert_eq!(plan.chunks()[9].len(), Some(105));
    }

    #[test]
    fn test_empty_resource_is_single_empty_chunk() {
        let plan = ChunkPlan::new(0, workers(10));
        assert_eq!(plan.len(), 1);
        assert!(plan.chunks()[0].is_empty());
        assert_eq!(plan.chunks()[0].range_header(), None);
        assert_eq!(plan.length(), Some(0));
    }

    #[test]
    fn test_fewer_bytes_than_workers() {
        let plan = ChunkPlan::new(3, workers(5));
        assert_eq!(plan.len(), 5);
        assert!(plan.chunks()[..4].iter().all(Chunk::is_empty));
        assert_eq!(plan.chunks()[4].span, ChunkSpan::Range { start: 0, end: 2 });
        assert!(plan.covers_whole(&plan.chunks()[4]));
    }

    #[test]
    fn test_single_worker_covers_whole() {
        let plan = ChunkPlan::new(1000, workers(1));
        assert_eq!(ranges(&plan), vec![(0, 999)]);
        assert!(plan.covers_whole(&plan.chunks()[0]));
        assert_eq!(
            plan.chunks()[0].range_header().as_deref(),
            Some("bytes=0-999")
        );
    }

    #[test]
    fn test_partial_range_does_not_cover_whole() {
        let plan = ChunkPlan::new(1000, workers(4));
        assert!(!plan.covers_whole(&plan.chunks()[0]));
        assert!(!plan.covers_whole(&plan.chunks()[3]));
    }

    #[test]
    fn test_whole_body_plan() {
        let plan = ChunkPlan::whole_body();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.length(), None);
        assert_eq!(plan.chunks()[0].len(), None);
        assert_eq!(plan.chunks()[0].range_header(), None);
        assert!(plan.covers_whole(&plan.chunks()[0]));
    }

    #[test]
    fn test_plans_are_contiguous_and_cover_length() {
        for length in (0..300).chain([1000, 1005, 4096, 65_537]) {
            for n in 1..=12 {
                let plan = ChunkPlan::new(length, workers(n));
                let mut next = 0u64;
                let mut total = 0u64;
                for (i, chunk) in plan.chunks().iter().enumerate() {
                    assert_eq!(chunk.index, i);
                    if let ChunkSpan::Range { start, end } = chunk.span {
                        assert_eq!(start, next, "gap or overlap at {length}/{n}");
                        assert!(end >= start);
                        next = end + 1;
                    }
                    total += chunk.len().unwrap();
                }
                assert_eq!(total, length);
                assert_eq!(next, length);
                if length > 0 {
                    assert_eq!(plan.len(), n);
                }
            }
        }
    }
}
