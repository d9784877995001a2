pub mod filter;
pub mod genotype;
pub mod record;

// re-export for cleaner imports
pub use self::filter::FilterStatus;
pub use self::genotype::Genotype;
pub use self::record::{MergedRecord, SourceTaggedRecord, VariantRecord};
