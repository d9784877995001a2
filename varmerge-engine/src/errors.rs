use thiserror::Error;

use varmerge_core::RecordError;

/// Error type for the merge engine.
///
/// Configuration errors (`MissingPriority`, `PriorityMismatch`) surface from
/// [`CombineContext::new`](crate::CombineContext::new) before any position is
/// processed; the rest abort the run at the offending position. There is no
/// retry path anywhere, inputs and outputs are deterministic and local.
#[derive(Error, Debug)]
pub enum CombineError {
    /// PRIORITIZE genotype merging needs an explicit priority string.
    #[error("Priority string must be provided to prioritize genotypes")]
    MissingPriority,

    /// The priority list must be an exact permutation of the configured
    /// source names.
    #[error("Priority list must contain exactly the configured sources: configured={configured:?} priority={priority:?}")]
    PriorityMismatch {
        configured: Vec<String>,
        priority: Vec<String>,
    },

    /// REQUIRE_UNIQUE merging saw the same sample name from two sources.
    #[error("Duplicate sample {sample} found in sources {first} and {second}")]
    DuplicateSample {
        sample: String,
        first: String,
        second: String,
    },

    /// A per-position collection carried the same source name twice.
    #[error("Source {0} appears more than once at a single position")]
    DuplicateSource(String),

    /// A record was tagged with a source the run was not configured with.
    #[error("Record tagged with unconfigured source {0}")]
    UnknownSource(String),

    /// Records handed to one merge call must share a single locus.
    #[error("Records span multiple loci: {first} vs {second}")]
    LocusMismatch { first: String, second: String },

    /// A source's reference allele cannot be reconciled with the unified
    /// reference under the suffix-padding rule.
    #[error("Reference {found} from source {source_name} is incompatible with unified reference {unified} at {contig}:{position}")]
    ReferenceMismatch {
        source_name: String,
        contig: String,
        position: u32,
        found: String,
        unified: String,
    },

    /// A genotype referenced an allele index outside its own record's list.
    #[error("Genotype for sample {sample} in source {source_name} references allele index {index} outside the source record")]
    GenotypeIndexOutOfRange {
        source_name: String,
        sample: String,
        index: u32,
    },

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Result type alias for merge engine operations.
pub type Result<T> = std::result::Result<T, CombineError>;
