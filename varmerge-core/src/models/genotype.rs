use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One sample's called allele combination at a locus.
///
/// Allele indices point into the owning record's allele list: 0 is the
/// reference, `i >= 1` is `alternates[i - 1]`. A `None` entry is a no-call
/// for that chromosome copy. Quality and per-sample attributes travel with
/// the genotype unchanged through a merge; the engine never blends them
/// across sources.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Genotype {
    pub alleles: Vec<Option<u32>>,
    pub quality: Option<f32>,
    pub attributes: BTreeMap<String, String>,
}

impl Genotype {
    /// A called genotype with the given allele indices.
    pub fn called<I: IntoIterator<Item = u32>>(alleles: I) -> Self {
        Genotype {
            alleles: alleles.into_iter().map(Some).collect(),
            quality: None,
            attributes: BTreeMap::new(),
        }
    }

    /// An explicitly uncalled genotype of the given ploidy.
    pub fn uncalled(ploidy: usize) -> Self {
        Genotype {
            alleles: vec![None; ploidy],
            quality: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// True if every chromosome copy is a no-call.
    pub fn is_uncalled(&self) -> bool {
        self.alleles.iter().all(Option::is_none)
    }

    /// The largest allele index this genotype references, if any is called.
    pub fn max_allele_index(&self) -> Option<u32> {
        self.alleles.iter().flatten().copied().max()
    }
}
