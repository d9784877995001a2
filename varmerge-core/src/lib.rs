//! Core data model for varmerge.
//!
//! This crate holds the record types shared by the merge engine and its
//! collaborators: [`VariantRecord`], [`Genotype`], [`FilterStatus`],
//! [`SourceTaggedRecord`], and [`MergedRecord`]. All entities are built
//! fresh for one genomic position and discarded once the merged record has
//! been emitted; nothing in here carries state across positions.

pub mod errors;
pub mod models;

// re-export for cleaner imports
pub use self::errors::RecordError;
pub use self::models::filter::FilterStatus;
pub use self::models::genotype::Genotype;
pub use self::models::record::{MergedRecord, SourceTaggedRecord, VariantRecord};
