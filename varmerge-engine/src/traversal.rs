//! Seam between the merge engine and the external traversal engine.
//!
//! The traversal engine shards the genome across workers and supplies one
//! [`PositionInput`] per position; the engine side exposes the
//! [`PositionProcessor`] capability by composition instead of inheriting a
//! walker base class. The core imposes no cross-position ordering of its
//! own; [`process_shard`] folds partial results in position order so the
//! collation stage downstream sees a deterministic output regardless of
//! which worker handled which position.

use rayon::prelude::*;

use varmerge_core::{MergedRecord, SourceTaggedRecord};

use crate::CombineContext;
use crate::errors::Result;

/// One position's worth of input from the traversal engine.
#[derive(Debug, Clone)]
pub struct PositionInput {
    pub records: Vec<SourceTaggedRecord>,
    /// Reference base at this position from the reference context.
    pub reference_base: u8,
}

/// Map/reduce counters carried alongside a shard's merged records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Positions where at least one source supplied a record.
    pub positions_with_input: u64,
    /// Merged records actually emitted.
    pub records_emitted: u64,
}

impl MergeSummary {
    pub fn absorb(mut self, other: MergeSummary) -> MergeSummary {
        self.positions_with_input += other.positions_with_input;
        self.records_emitted += other.records_emitted;
        self
    }
}

/// Partial result of processing a run of positions.
#[derive(Debug, Clone, Default)]
pub struct ShardOutput {
    /// Merged records in position order.
    pub merged: Vec<MergedRecord>,
    pub summary: MergeSummary,
}

/// Per-position processing capability handed to the traversal engine.
pub trait PositionProcessor: Sync {
    type Output: Send;

    fn process_position(&self, input: &PositionInput) -> Result<Self::Output>;

    /// Fold two partial results; `a` precedes `b` in position order.
    fn combine_partial(&self, a: Self::Output, b: Self::Output) -> Self::Output;
}

impl PositionProcessor for CombineContext {
    type Output = ShardOutput;

    fn process_position(&self, input: &PositionInput) -> Result<ShardOutput> {
        let merged: Vec<MergedRecord> = self
            .combine(&input.records, input.reference_base)?
            .into_iter()
            .collect();

        let summary = MergeSummary {
            positions_with_input: u64::from(!input.records.is_empty()),
            records_emitted: merged.len() as u64,
        };

        Ok(ShardOutput { merged, summary })
    }

    fn combine_partial(&self, mut a: ShardOutput, b: ShardOutput) -> ShardOutput {
        a.merged.extend(b.merged);
        ShardOutput {
            merged: a.merged,
            summary: a.summary.absorb(b.summary),
        }
    }
}

/// Process a shard of positions in parallel, folding outputs in position
/// order. The first error aborts the shard; there is no best-effort
/// continuation.
pub fn process_shard<P: PositionProcessor>(
    processor: &P,
    inputs: &[PositionInput],
) -> Result<Option<P::Output>> {
    let outputs = inputs
        .par_iter()
        .map(|input| processor.process_position(input))
        .collect::<Result<Vec<_>>>()?;

    Ok(outputs
        .into_iter()
        .reduce(|a, b| processor.combine_partial(a, b)))
}
