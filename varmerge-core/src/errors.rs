use thiserror::Error;

/// Error type for record construction and mutation.
#[derive(Error, Debug)]
pub enum RecordError {
    /// Positions are 1-based; 0 is not a valid coordinate.
    #[error("Invalid position {0}: positions are 1-based")]
    InvalidPosition(u32),

    /// Reference and alternate alleles must be non-empty sequences.
    #[error("Empty allele at {contig}:{position}")]
    EmptyAllele { contig: String, position: u32 },

    /// The same sequence appeared twice in one record's allele list.
    #[error("Duplicate allele {allele} at {contig}:{position}")]
    DuplicateAllele {
        contig: String,
        position: u32,
        allele: String,
    },

    /// A genotype referenced an allele index the record does not have.
    #[error("Genotype for sample {sample} references allele index {index}, record has {allele_count} alleles")]
    AlleleIndexOutOfRange {
        sample: String,
        index: u32,
        allele_count: usize,
    },
}

/// Result type alias for record operations.
pub type Result<T> = std::result::Result<T, RecordError>;
