//! Position-local variant record merge engine.
//!
//! Reconciles variant-call records from multiple independent sources into a
//! single authoritative record per genomic position: which alleles survive,
//! which source's genotype call wins for each sample, whether the merged
//! site is filtered, and how provenance is annotated.
//!
//! The engine is a pure function of its inputs. A [`CombineContext`] is
//! built once at startup from a validated [`CombineOptions`] and the
//! configured source names; per-position calls share it by reference, hold
//! no mutable state, and are safe to run concurrently over disjoint
//! positions (see [`traversal`]). Traversal order, wire encoding, and INFO
//! annotation computation are external collaborators reached through the
//! [`VariantSink`] and [`InfoAnnotator`] seams.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use varmerge_core::{FilterStatus, SourceTaggedRecord, VariantRecord};
//! use varmerge_engine::{CombineContext, CombineOptions};
//!
//! let sources: BTreeSet<String> = ["calls", "backfill"].iter().map(|s| s.to_string()).collect();
//! let options = CombineOptions {
//!     priority: Some("calls,backfill".to_string()),
//!     ..CombineOptions::default()
//! };
//! let ctx = CombineContext::new(options, &sources).unwrap();
//!
//! let record = VariantRecord::new("chr1", 100, "G", vec!["T".into()], FilterStatus::Pass).unwrap();
//! let merged = ctx
//!     .combine(&[SourceTaggedRecord::new("calls", record)], b'G')
//!     .unwrap()
//!     .expect("one contributing source always yields a record");
//! assert_eq!(merged.sources, vec!["calls"]);
//! ```

pub mod alleles;
pub mod errors;
pub mod filters;
pub mod genotypes;
pub mod priority;
pub mod traversal;

use std::collections::BTreeSet;

use varmerge_core::{MergedRecord, SourceTaggedRecord, VariantRecord};

// re-exports
pub use self::errors::{CombineError, Result};
pub use self::priority::PriorityList;

/// Constants used throughout the engine.
pub mod consts {
    /// Default INFO key for the provenance tag.
    pub const DEFAULT_SET_KEY: &str = "set";
    /// Configuring this key (case-insensitively) suppresses the tag.
    pub const NULL_SET_KEY: &str = "null";
    /// Sentinel tag for a full-agreement intersection.
    pub const INTERSECTION_SET: &str = "Intersection";
    /// Separator for multi-source provenance tags.
    pub const SET_SEPARATOR: &str = "-";
}

/// Variant-level merge semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeType {
    /// The site stays unfiltered if any contributing record is unfiltered.
    #[default]
    Union,
    /// The site stays unfiltered only if every contributing record is.
    Intersection,
}

/// Per-sample genotype merge semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenotypeMergeType {
    /// First source in priority order with a call wins.
    #[default]
    Prioritize,
    /// Duplicated sample names are renamed `sample.source` and all kept.
    Uniquify,
    /// Duplicated sample names abort the merge.
    RequireUnique,
}

/// Configuration surface for the merge engine.
///
/// Checked eagerly by [`CombineContext::new`]; a bad priority list never
/// reaches per-position processing.
#[derive(Debug, Clone)]
pub struct CombineOptions {
    pub variant_merge: MergeType,
    pub genotype_merge: GenotypeMergeType,
    /// Comma-separated source names, required for PRIORITIZE.
    pub priority: Option<String>,
    /// Treat filtered records as if their source supplied no call at all.
    pub filtered_are_uncalled: bool,
    /// Strip auxiliary INFO and per-sample attributes from the output.
    pub minimal_output: bool,
    /// Report sites that needed complex compatibility merging.
    pub print_complex_merges: bool,
    /// INFO key for the provenance tag; `"null"` disables it.
    pub set_key: Option<String>,
}

impl Default for CombineOptions {
    fn default() -> Self {
        CombineOptions {
            variant_merge: MergeType::default(),
            genotype_merge: GenotypeMergeType::default(),
            priority: None,
            filtered_are_uncalled: false,
            minimal_output: false,
            print_complex_merges: false,
            set_key: Some(consts::DEFAULT_SET_KEY.to_string()),
        }
    }
}

/// Seam for the external annotation engine that derives statistical INFO
/// fields; the merge engine only invokes it, never computes annotations.
pub trait InfoAnnotator {
    fn annotate(&self, record: &mut VariantRecord);
}

/// Seam for the output record sink responsible for encoding. The reference
/// base at the record's position travels alongside the record.
pub trait VariantSink {
    fn write(&mut self, record: &MergedRecord, reference_base: u8) -> anyhow::Result<()>;
}

/// Immutable merge context, built once at startup and passed by reference
/// into every per-position call.
#[derive(Debug, Clone)]
pub struct CombineContext {
    variant_merge: MergeType,
    genotype_merge: GenotypeMergeType,
    filtered_are_uncalled: bool,
    minimal_output: bool,
    print_complex_merges: bool,
    priority: PriorityList,
    set_key: Option<String>,
}

impl CombineContext {
    /// Validate the options against the configured source names.
    pub fn new(options: CombineOptions, configured_sources: &BTreeSet<String>) -> Result<Self> {
        let priority = PriorityList::resolve(
            configured_sources,
            options.priority.as_deref(),
            options.genotype_merge,
        )?;

        let set_key = options
            .set_key
            .filter(|k| !k.eq_ignore_ascii_case(consts::NULL_SET_KEY));

        Ok(CombineContext {
            variant_merge: options.variant_merge,
            genotype_merge: options.genotype_merge,
            filtered_are_uncalled: options.filtered_are_uncalled,
            minimal_output: options.minimal_output,
            print_complex_merges: options.print_complex_merges,
            priority,
            set_key,
        })
    }

    pub fn priority(&self) -> &PriorityList {
        &self.priority
    }

    /// The resolved provenance key, `None` when tagging is disabled.
    pub fn set_key(&self) -> Option<&str> {
        self.set_key.as_deref()
    }

    /// Combine one position's records into at most one merged record.
    ///
    /// Returns `Ok(None)` when no source contributes, which happens for an
    /// empty input or when `filtered_are_uncalled` excludes every record.
    pub fn combine(
        &self,
        records: &[SourceTaggedRecord],
        reference_base: u8,
    ) -> Result<Option<MergedRecord>> {
        let mut merged = self.merge_site(records, reference_base)?;
        if let Some(m) = merged.as_mut() {
            if self.minimal_output {
                self.prune(&mut m.record);
            }
        }
        Ok(merged)
    }

    /// Like [`combine`](Self::combine), running the external annotation
    /// step on the merged record before any minimal-output pruning.
    pub fn combine_annotated(
        &self,
        records: &[SourceTaggedRecord],
        reference_base: u8,
        annotator: &dyn InfoAnnotator,
    ) -> Result<Option<MergedRecord>> {
        let mut merged = self.merge_site(records, reference_base)?;
        if let Some(m) = merged.as_mut() {
            annotator.annotate(&mut m.record);
            if self.minimal_output {
                self.prune(&mut m.record);
            }
        }
        Ok(merged)
    }

    fn merge_site(
        &self,
        records: &[SourceTaggedRecord],
        reference_base: u8,
    ) -> Result<Option<MergedRecord>> {
        self.validate_site(records)?;

        // Full sample set at this position, before any exclusion, so that
        // samples from excluded sources still come out explicitly uncalled.
        let samples: BTreeSet<String> = records
            .iter()
            .flat_map(|t| t.record.genotypes.keys().cloned())
            .collect();

        let mut contributors: Vec<&SourceTaggedRecord> = records
            .iter()
            .filter(|t| !self.filtered_are_uncalled || t.record.filter.is_unfiltered())
            .collect();
        if contributors.is_empty() {
            return Ok(None);
        }
        contributors.sort_by_key(|t| self.priority.rank(&t.source));

        let union = alleles::unify(&contributors, reference_base)?;
        let (filter, provenance) = filters::resolve_filter(&contributors, self.variant_merge);
        let genotypes =
            genotypes::merge_genotypes(&samples, &contributors, self.genotype_merge, &union)?;

        if self.print_complex_merges && is_complex(&contributors, &union) {
            let first = &contributors[0].record;
            eprintln!(
                "Complex merge at {}:{} across sources {:?}",
                first.contig, first.position, provenance
            );
        }

        let first = &contributors[0].record;
        let mut record = VariantRecord::new(
            first.contig.clone(),
            first.position,
            union.reference.clone(),
            union.alternates.clone(),
            filter,
        )?;
        // Auxiliary attributes come from the highest-priority contributor;
        // the engine never blends INFO across sources.
        record.info = first.info.clone();
        if let Some(key) = &self.set_key {
            record
                .info
                .insert(key.clone(), self.provenance_tag(&provenance));
        }
        for (sample, genotype) in genotypes {
            record.set_genotype(sample, genotype)?;
        }

        Ok(Some(MergedRecord {
            record,
            sources: provenance,
        }))
    }

    fn validate_site(&self, records: &[SourceTaggedRecord]) -> Result<()> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for tagged in records {
            if self.priority.rank(&tagged.source).is_none() {
                return Err(CombineError::UnknownSource(tagged.source.clone()));
            }
            if !seen.insert(tagged.source.as_str()) {
                return Err(CombineError::DuplicateSource(tagged.source.clone()));
            }
            let first = &records[0].record;
            if tagged.record.contig != first.contig || tagged.record.position != first.position {
                return Err(CombineError::LocusMismatch {
                    first: format!("{}:{}", first.contig, first.position),
                    second: format!("{}:{}", tagged.record.contig, tagged.record.position),
                });
            }
        }
        Ok(())
    }

    /// Provenance tag: the single source name, the intersection sentinel
    /// when every configured source contributed under INTERSECTION, or the
    /// joined contributing names.
    fn provenance_tag(&self, provenance: &[String]) -> String {
        if provenance.len() == 1 {
            provenance[0].clone()
        } else if self.variant_merge == MergeType::Intersection
            && provenance.len() == self.priority.len()
        {
            consts::INTERSECTION_SET.to_string()
        } else {
            provenance.join(consts::SET_SEPARATOR)
        }
    }

    /// Strip everything but alleles, filter status, the provenance tag, and
    /// bare genotype calls.
    fn prune(&self, record: &mut VariantRecord) {
        record.info.retain(|k, _| Some(k) == self.set_key.as_ref());
        for genotype in record.genotypes.values_mut() {
            genotype.quality = None;
            genotype.attributes.clear();
        }
    }
}

/// A merge is "complex" when more than one source contributed and either
/// their sample sets overlap or allele indices had to be remapped. Purely
/// observational; never changes the result.
fn is_complex(contributors: &[&SourceTaggedRecord], union: &alleles::AlleleUnion) -> bool {
    if contributors.len() < 2 {
        return false;
    }

    let mut samples: BTreeSet<&str> = BTreeSet::new();
    let overlapping = contributors
        .iter()
        .flat_map(|t| t.record.genotypes.keys())
        .any(|s| !samples.insert(s.as_str()));

    let remapped = contributors.iter().any(|t| {
        union
            .remap(&t.source)
            .is_some_and(|remap| remap.iter().enumerate().any(|(i, &u)| u as usize != i))
    });

    overlapping || remapped
}
