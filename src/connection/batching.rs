//! Splitting large document batches into bounded bulk writes.

use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("Invalid partition count {0}: must be at least 1")]
    InvalidPartitionCount(i64),
}

/// Split `items` into `parts` contiguous chunks of near-equal size.
///
/// The first `len % parts` chunks hold one extra element. Chunks concatenate
/// back to `items`; when `parts` exceeds the item count the tail chunks are
/// empty. An empty input yields no chunks at all.
pub fn partition<T>(items: &[T], parts: i64) -> Result<Vec<&[T]>, BatchError> {
    if parts <= 0 {
        return Err(BatchError::InvalidPartitionCount(parts));
    }
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let parts = usize::try_from(parts).map_err(|_| BatchError::InvalidPartitionCount(parts))?;
    let base = items.len() / parts;
    let extra = items.len() % parts;

    let mut chunks = Vec::with_capacity(parts);
    let mut start = 0;
    for index in 0..parts {
        let size = base + usize::from(index < extra);
        chunks.push(&items[start..start + size]);
        start += size;
    }

    Ok(chunks)
}

/// Outcome of writing one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkOutcome {
    pub index: usize,
    pub size: usize,
    pub success: bool,
}

/// Per-chunk results of a batched write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<ChunkOutcome>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.success)
    }

    /// Number of items in chunks that were written successfully.
    pub fn written(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).map(|o| o.size).sum()
    }

    /// Indexes of the chunks whose write failed.
    pub fn failed(&self) -> Vec<usize> {
        self.outcomes.iter().filter(|o| !o.success).map(|o| o.index).collect()
    }
}

/// Partition `items` and hand each non-empty chunk to `write_chunk` in order.
///
/// Empty chunks (when `parts` exceeds the item count) are never passed to
/// `write_chunk` and get no entry in the report.
///
/// A failed chunk is logged and recorded; the remaining chunks are still
/// written. Nothing is retried or rolled back.
pub fn write_in_batches<T, F, E>(
    items: &[T],
    parts: i64,
    mut write_chunk: F,
) -> Result<BatchReport, BatchError>
where
    F: FnMut(&[T]) -> Result<(), E>,
    E: Display,
{
    let chunks = partition(items, parts)?;
    let total = chunks.len();
    let mut report = BatchReport { outcomes: Vec::with_capacity(total) };

    for (index, chunk) in chunks.into_iter().enumerate() {
        if chunk.is_empty() {
            log::debug!("Skipping empty chunk {}/{}", index + 1, total);
            continue;
        }

        log::info!("Docs to bulk: {} (chunk {}/{})", chunk.len(), index + 1, total);
        let success = match write_chunk(chunk) {
            Ok(()) => {
                log::info!("Chunk {}/{} written", index + 1, total);
                true
            }
            Err(err) => {
                log::warn!("Chunk {}/{} failed: {err}", index + 1, total);
                false
            }
        };

        report.outcomes.push(ChunkOutcome { index, size: chunk.len(), success });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remainder_goes_to_leading_chunks() {
        let items: Vec<u32> = (0..7).collect();
        let sizes: Vec<usize> = partition(&items, 3).unwrap().iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![3, 2, 2]);
    }

    #[test]
    fn test_more_parts_than_items() {
        let items = [1, 2];
        let chunks = partition(&items, 4).unwrap();
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.concat(), vec![1, 2]);
        assert!(chunks[2].is_empty() && chunks[3].is_empty());
    }

    #[test]
    fn test_report_summaries() {
        let report = BatchReport {
            outcomes: vec![
                ChunkOutcome { index: 0, size: 3, success: false },
                ChunkOutcome { index: 1, size: 2, success: true },
            ],
        };
        assert!(!report.all_succeeded());
        assert_eq!(report.written(), 2);
        assert_eq!(report.failed(), vec![0]);
    }
}
