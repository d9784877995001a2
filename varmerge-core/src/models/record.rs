use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{RecordError, Result};
use crate::models::filter::FilterStatus;
use crate::models::genotype::Genotype;

/// One variant call at a single locus.
///
/// The alternate allele list is order-significant: genotype allele indices
/// point into `[reference, alternates...]`. Construction validates that the
/// reference and alternates are distinct, non-empty sequences and that the
/// position is 1-based.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VariantRecord {
    pub contig: String,
    pub position: u32,
    pub reference: String,
    pub alternates: Vec<String>,
    pub filter: FilterStatus,
    pub info: BTreeMap<String, String>,
    pub genotypes: BTreeMap<String, Genotype>,
}

impl VariantRecord {
    pub fn new(
        contig: impl Into<String>,
        position: u32,
        reference: impl Into<String>,
        alternates: Vec<String>,
        filter: FilterStatus,
    ) -> Result<Self> {
        let contig = contig.into();
        let reference = reference.into();

        if position == 0 {
            return Err(RecordError::InvalidPosition(position));
        }
        if reference.is_empty() || alternates.iter().any(String::is_empty) {
            return Err(RecordError::EmptyAllele { contig, position });
        }
        for (i, alt) in alternates.iter().enumerate() {
            if *alt == reference || alternates[..i].contains(alt) {
                return Err(RecordError::DuplicateAllele {
                    contig,
                    position,
                    allele: alt.clone(),
                });
            }
        }

        Ok(VariantRecord {
            contig,
            position,
            reference,
            alternates,
            filter,
            info: BTreeMap::new(),
            genotypes: BTreeMap::new(),
        })
    }

    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info.insert(key.into(), value.into());
        self
    }

    /// Number of alleles including the reference.
    pub fn allele_count(&self) -> usize {
        1 + self.alternates.len()
    }

    /// Attach a genotype call, checking its allele indices are valid for
    /// this record's allele list.
    pub fn set_genotype(&mut self, sample: impl Into<String>, genotype: Genotype) -> Result<()> {
        let sample = sample.into();
        if let Some(index) = genotype.max_allele_index() {
            if index as usize >= self.allele_count() {
                return Err(RecordError::AlleleIndexOutOfRange {
                    sample,
                    index,
                    allele_count: self.allele_count(),
                });
            }
        }
        self.genotypes.insert(sample, genotype);
        Ok(())
    }

    /// Builder form of [`set_genotype`](Self::set_genotype).
    pub fn with_genotype(mut self, sample: impl Into<String>, genotype: Genotype) -> Result<Self> {
        self.set_genotype(sample, genotype)?;
        Ok(self)
    }
}

/// A variant record tagged with the name of the source that produced it.
///
/// Source names are unique within one position's input collection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SourceTaggedRecord {
    pub source: String,
    pub record: VariantRecord,
}

impl SourceTaggedRecord {
    pub fn new(source: impl Into<String>, record: VariantRecord) -> Self {
        SourceTaggedRecord {
            source: source.into(),
            record,
        }
    }
}

/// The engine's output: a combined record plus the list of sources that
/// contributed to it, in priority order.
///
/// When a set key is configured the provenance tag is also attached into
/// `record.info`; `sources` keeps the structured form for diagnostics and
/// downstream collation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MergedRecord {
    pub record: VariantRecord,
    pub sources: Vec<String>,
}
