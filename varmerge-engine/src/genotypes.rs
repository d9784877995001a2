use std::collections::BTreeMap;
use std::collections::BTreeSet;

use fxhash::FxHashMap;

use varmerge_core::{Genotype, SourceTaggedRecord};

use crate::GenotypeMergeType;
use crate::alleles::AlleleUnion;
use crate::errors::{CombineError, Result};

// Ploidy used for samples no contributing source called at this position.
const UNCALLED_PLOIDY: usize = 2;

/// Merge per-sample genotype calls across the contributing records.
///
/// `samples` is the full sample set observed at this position, including
/// samples whose only source was excluded as filtered-uncalled; under
/// PRIORITIZE those come out explicitly uncalled rather than omitted.
/// `records` must be sorted in priority order already. Every selected
/// genotype has its allele indices rewritten through its source's remap in
/// `union`; quality and per-sample attributes travel unchanged.
pub fn merge_genotypes(
    samples: &BTreeSet<String>,
    records: &[&SourceTaggedRecord],
    mode: GenotypeMergeType,
    union: &AlleleUnion,
) -> Result<BTreeMap<String, Genotype>> {
    match mode {
        GenotypeMergeType::Prioritize => prioritize(samples, records, union),
        GenotypeMergeType::Uniquify => uniquify(records, union, false),
        GenotypeMergeType::RequireUnique => uniquify(records, union, true),
    }
}

/// First source in priority order with a call for a sample wins.
fn prioritize(
    samples: &BTreeSet<String>,
    records: &[&SourceTaggedRecord],
    union: &AlleleUnion,
) -> Result<BTreeMap<String, Genotype>> {
    let mut merged = BTreeMap::new();

    for sample in samples {
        let winner = records
            .iter()
            .find_map(|tagged| {
                tagged
                    .record
                    .genotypes
                    .get(sample)
                    .map(|gt| (tagged.source.as_str(), gt))
            })
            .map(|(source, gt)| rewrite(sample, source, gt, union))
            .transpose()?;

        merged.insert(
            sample.clone(),
            winner.unwrap_or_else(|| Genotype::uncalled(UNCALLED_PLOIDY)),
        );
    }

    Ok(merged)
}

/// Keep every occurrence, renaming duplicated sample names to
/// `sample.source`; with `fail_on_duplicate` the first duplicate aborts
/// the merge instead.
fn uniquify(
    records: &[&SourceTaggedRecord],
    union: &AlleleUnion,
    fail_on_duplicate: bool,
) -> Result<BTreeMap<String, Genotype>> {
    let mut first_seen: FxHashMap<&str, &str> = FxHashMap::default();
    let mut duplicated: BTreeSet<&str> = BTreeSet::new();
    for tagged in records {
        for sample in tagged.record.genotypes.keys() {
            match first_seen.get(sample.as_str()) {
                None => {
                    first_seen.insert(sample.as_str(), tagged.source.as_str());
                }
                Some(first) => {
                    if fail_on_duplicate {
                        return Err(CombineError::DuplicateSample {
                            sample: sample.clone(),
                            first: first.to_string(),
                            second: tagged.source.clone(),
                        });
                    }
                    duplicated.insert(sample.as_str());
                }
            }
        }
    }

    let mut merged = BTreeMap::new();
    for tagged in records {
        for (sample, gt) in &tagged.record.genotypes {
            let name = if duplicated.contains(sample.as_str()) {
                format!("{}.{}", sample, tagged.source)
            } else {
                sample.clone()
            };
            merged.insert(name, rewrite(sample, &tagged.source, gt, union)?);
        }
    }

    Ok(merged)
}

/// Rewrite a genotype's allele indices through its source's remap.
fn rewrite(
    sample: &str,
    source: &str,
    genotype: &Genotype,
    union: &AlleleUnion,
) -> Result<Genotype> {
    let remap = union
        .remap(source)
        .ok_or_else(|| CombineError::UnknownSource(source.to_string()))?;

    let mut rewritten = genotype.clone();
    for allele in rewritten.alleles.iter_mut() {
        if let Some(index) = allele {
            *index = *remap.get(*index as usize).ok_or_else(|| {
                CombineError::GenotypeIndexOutOfRange {
                    source_name: source.to_string(),
                    sample: sample.to_string(),
                    index: *index,
                }
            })?;
        }
    }
    Ok(rewritten)
}
