use fxhash::FxHashMap;

use varmerge_core::SourceTaggedRecord;

use crate::errors::{CombineError, Result};

/// The union allele set at one position, plus per-source index remaps.
///
/// `remap(source)[local]` is the unified index for that source's local
/// allele index; slot 0 is always the reference. Genotype allele indices
/// are rewritten through these remaps before records are merged.
#[derive(Debug, Clone)]
pub struct AlleleUnion {
    pub reference: String,
    pub alternates: Vec<String>,
    remaps: FxHashMap<String, Vec<u32>>,
}

impl AlleleUnion {
    pub fn remap(&self, source: &str) -> Option<&[u32]> {
        self.remaps.get(source).map(Vec::as_slice)
    }

    /// Number of unified alleles including the reference.
    pub fn allele_count(&self) -> usize {
        1 + self.alternates.len()
    }
}

/// Compute the union reference/alternate allele set across the records at
/// one position.
///
/// When sources disagree on the reference representation (indel padding),
/// the normalization rule is: the unified reference is the longest
/// reference among the inputs, first seen in priority order on length
/// ties. Every input reference must start with the externally supplied
/// reference base and be a prefix of the unified reference; alternates
/// from a record with a shorter reference are suffix-extended with the
/// unified reference's tail so all alleles are expressed against the same
/// span. Anything that cannot be reconciled this way fails the merge.
///
/// The unified alternate list is the deduplicated union of all padded
/// alternates in first-seen order across the (priority-sorted) inputs.
pub fn unify(records: &[&SourceTaggedRecord], reference_base: u8) -> Result<AlleleUnion> {
    debug_assert!(!records.is_empty());

    let contig = records[0].record.contig.clone();
    let position = records[0].record.position;

    // Longest reference wins; first-seen order breaks ties.
    let mut longest = records[0].record.reference.as_str();
    for tagged in &records[1..] {
        if tagged.record.reference.len() > longest.len() {
            longest = tagged.record.reference.as_str();
        }
    }
    let reference = longest.to_string();

    let mut alternates: Vec<String> = Vec::new();
    let mut remaps = FxHashMap::default();

    for tagged in records {
        let rec = &tagged.record;
        let compatible = rec
            .reference
            .as_bytes()
            .first()
            .is_some_and(|b| b.eq_ignore_ascii_case(&reference_base))
            && reference.starts_with(&rec.reference);
        if !compatible {
            return Err(CombineError::ReferenceMismatch {
                source_name: tagged.source.clone(),
                contig: contig.clone(),
                position,
                found: rec.reference.clone(),
                unified: reference.clone(),
            });
        }

        let suffix = &reference[rec.reference.len()..];
        let mut remap: Vec<u32> = Vec::with_capacity(rec.allele_count());
        remap.push(0);
        for alt in &rec.alternates {
            let padded = format!("{}{}", alt, suffix);
            let unified_index = match alternates.iter().position(|a| *a == padded) {
                Some(i) => i,
                None => {
                    alternates.push(padded);
                    alternates.len() - 1
                }
            };
            remap.push(unified_index as u32 + 1);
        }
        remaps.insert(tagged.source.clone(), remap);
    }

    Ok(AlleleUnion {
        reference,
        alternates,
        remaps,
    })
}
