use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use rstest::rstest;

use varmerge_core::{FilterStatus, Genotype, MergedRecord, SourceTaggedRecord, VariantRecord};
use varmerge_engine::traversal::{PositionInput, PositionProcessor, process_shard};
use varmerge_engine::{
    CombineContext, CombineError, CombineOptions, GenotypeMergeType, InfoAnnotator, MergeType,
    VariantSink,
};

fn snp(
    source: &str,
    position: u32,
    alternates: &[&str],
    filter: FilterStatus,
) -> SourceTaggedRecord {
    let record = VariantRecord::new(
        "chr1",
        position,
        "G",
        alternates.iter().map(|a| a.to_string()).collect(),
        filter,
    )
    .unwrap();
    SourceTaggedRecord::new(source, record)
}

fn context(sources: &[&str], options: CombineOptions) -> CombineContext {
    let configured: BTreeSet<String> = sources.iter().map(|s| s.to_string()).collect();
    CombineContext::new(options, &configured).unwrap()
}

fn prioritized(sources: &[&str]) -> CombineOptions {
    CombineOptions {
        priority: Some(sources.join(",")),
        ..CombineOptions::default()
    }
}

#[test]
fn single_source_merge_is_identity_modulo_provenance() {
    let ctx = context(&["A"], prioritized(&["A"]));
    let mut input = snp("A", 100, &["T"], FilterStatus::Pass);
    input
        .record
        .set_genotype("S1", Genotype::called([0, 1]).with_quality(42.0))
        .unwrap();
    input.record.info.insert("DP".into(), "31".into());

    let merged = ctx
        .combine(std::slice::from_ref(&input), b'G')
        .unwrap()
        .unwrap();

    let mut expected = input.record.clone();
    expected.info.insert("set".into(), "A".into());
    assert_eq!(merged.record, expected);
    assert_eq!(merged.sources, vec!["A"]);
}

#[test]
fn union_scenario_takes_both_alternates_and_tags_both_sources() {
    let ctx = context(&["A", "B"], prioritized(&["A", "B"]));
    let records = [
        snp("A", 100, &["T"], FilterStatus::Pass),
        snp("B", 100, &["A"], FilterStatus::Pass),
    ];

    let merged = ctx.combine(&records, b'G').unwrap().unwrap();

    assert_eq!(merged.record.alternates, vec!["T", "A"]);
    assert_eq!(merged.record.filter, FilterStatus::Pass);
    assert_eq!(merged.record.info.get("set").unwrap(), "A-B");
    assert_eq!(merged.sources, vec!["A", "B"]);
}

#[test]
fn intersection_scenario_carries_failed_filter() {
    let options = CombineOptions {
        variant_merge: MergeType::Intersection,
        ..prioritized(&["A", "B"])
    };
    let ctx = context(&["A", "B"], options);
    let records = [
        snp("A", 100, &["T"], FilterStatus::Pass),
        snp("B", 100, &["A"], FilterStatus::filtered(["LowQual"])),
    ];

    let merged = ctx.combine(&records, b'G').unwrap().unwrap();

    assert_eq!(merged.record.filter, FilterStatus::filtered(["LowQual"]));
}

#[test]
fn intersection_full_agreement_uses_sentinel_tag() {
    let options = CombineOptions {
        variant_merge: MergeType::Intersection,
        ..prioritized(&["A", "B"])
    };
    let ctx = context(&["A", "B"], options);
    let records = [
        snp("A", 100, &["T"], FilterStatus::Pass),
        snp("B", 100, &["T"], FilterStatus::Pass),
    ];

    let merged = ctx.combine(&records, b'G').unwrap().unwrap();
    assert_eq!(merged.record.info.get("set").unwrap(), "Intersection");
}

// PRIORITIZE selection must not depend on the order records arrive in.
#[test]
fn prioritize_is_independent_of_input_order() {
    let ctx = context(&["A", "B"], prioritized(&["A", "B"]));
    let mut a = snp("A", 100, &["T"], FilterStatus::Pass);
    a.record
        .set_genotype("S1", Genotype::called([0, 1]))
        .unwrap();
    let mut b = snp("B", 100, &["A"], FilterStatus::Pass);
    b.record
        .set_genotype("S1", Genotype::called([1, 1]))
        .unwrap();

    let forward = ctx
        .combine(&[a.clone(), b.clone()], b'G')
        .unwrap()
        .unwrap();
    let backward = ctx.combine(&[b, a], b'G').unwrap().unwrap();

    assert_eq!(forward, backward);
    // A wins for S1; its local indices are already unified indices.
    assert_eq!(
        forward.record.genotypes["S1"].alleles,
        vec![Some(0), Some(1)]
    );
}

#[test]
fn filtered_are_uncalled_excludes_source_entirely() {
    let options = CombineOptions {
        filtered_are_uncalled: true,
        ..prioritized(&["A", "B"])
    };
    let ctx = context(&["A", "B"], options);
    let mut a = snp("A", 100, &["T"], FilterStatus::filtered(["LowQual"]));
    a.record
        .set_genotype("S1", Genotype::called([1, 1]))
        .unwrap();
    let mut b = snp("B", 100, &["A"], FilterStatus::Pass);
    b.record
        .set_genotype("S2", Genotype::called([0, 1]))
        .unwrap();

    let merged = ctx.combine(&[a, b], b'G').unwrap().unwrap();

    // A is structurally present but contributes nothing.
    assert_eq!(merged.sources, vec!["B"]);
    assert_eq!(merged.record.info.get("set").unwrap(), "B");
    assert_eq!(merged.record.alternates, vec!["A"]);
    // A's sample is still recorded, explicitly uncalled.
    assert!(merged.record.genotypes["S1"].is_uncalled());
    assert!(!merged.record.genotypes["S2"].is_uncalled());
}

#[test]
fn all_sources_excluded_emits_nothing() {
    let options = CombineOptions {
        filtered_are_uncalled: true,
        ..prioritized(&["A"])
    };
    let ctx = context(&["A"], options);
    let records = [snp("A", 100, &["T"], FilterStatus::filtered(["q10"]))];

    assert!(ctx.combine(&records, b'G').unwrap().is_none());
}

#[test]
fn empty_position_emits_nothing() {
    let ctx = context(&["A"], prioritized(&["A"]));
    assert!(ctx.combine(&[], b'G').unwrap().is_none());
}

#[rstest]
#[case("null")]
#[case("NULL")]
#[case("Null")]
fn null_set_key_suppresses_the_tag(#[case] key: &str) {
    let options = CombineOptions {
        set_key: Some(key.to_string()),
        ..prioritized(&["A"])
    };
    let ctx = context(&["A"], options);
    assert_eq!(ctx.set_key(), None);

    let merged = ctx
        .combine(&[snp("A", 100, &["T"], FilterStatus::Pass)], b'G')
        .unwrap()
        .unwrap();
    assert!(merged.record.info.is_empty());
}

#[test]
fn uniquify_keeps_both_renamed_genotypes() {
    let options = CombineOptions {
        genotype_merge: GenotypeMergeType::Uniquify,
        priority: None,
        ..CombineOptions::default()
    };
    let ctx = context(&["A", "B"], options);
    let mut a = snp("A", 100, &["T"], FilterStatus::Pass);
    a.record
        .set_genotype("S1", Genotype::called([0, 1]))
        .unwrap();
    let mut b = snp("B", 100, &["T"], FilterStatus::Pass);
    b.record
        .set_genotype("S1", Genotype::called([1, 1]))
        .unwrap();

    let merged = ctx.combine(&[a, b], b'G').unwrap().unwrap();

    let samples: Vec<&str> = merged.record.genotypes.keys().map(String::as_str).collect();
    assert_eq!(samples, vec!["S1.A", "S1.B"]);
}

#[test]
fn require_unique_is_fatal_at_the_offending_position() {
    let options = CombineOptions {
        genotype_merge: GenotypeMergeType::RequireUnique,
        priority: None,
        ..CombineOptions::default()
    };
    let ctx = context(&["A", "B"], options);
    let mut a = snp("A", 100, &["T"], FilterStatus::Pass);
    a.record
        .set_genotype("S1", Genotype::called([0, 1]))
        .unwrap();
    let mut b = snp("B", 100, &["T"], FilterStatus::Pass);
    b.record
        .set_genotype("S1", Genotype::called([1, 1]))
        .unwrap();

    let err = ctx.combine(&[a, b], b'G');
    assert!(matches!(err, Err(CombineError::DuplicateSample { .. })));
}

#[test]
fn minimal_output_keeps_only_the_provenance_tag() {
    let options = CombineOptions {
        minimal_output: true,
        ..prioritized(&["A"])
    };
    let ctx = context(&["A"], options);
    let mut a = snp("A", 100, &["T"], FilterStatus::Pass);
    a.record.info.insert("DP".into(), "31".into());
    a.record
        .set_genotype(
            "S1",
            Genotype::called([0, 1])
                .with_quality(99.0)
                .with_attribute("AD", "12,19"),
        )
        .unwrap();

    let merged = ctx.combine(&[a], b'G').unwrap().unwrap();

    let keys: Vec<&str> = merged.record.info.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["set"]);
    let gt = &merged.record.genotypes["S1"];
    assert_eq!(gt.alleles, vec![Some(0), Some(1)]);
    assert_eq!(gt.quality, None);
    assert!(gt.attributes.is_empty());
}

struct DepthAnnotator;

impl InfoAnnotator for DepthAnnotator {
    fn annotate(&self, record: &mut VariantRecord) {
        record.info.insert("AN".into(), "2".into());
    }
}

#[test]
fn annotation_runs_before_minimal_pruning() {
    let options = CombineOptions {
        minimal_output: true,
        ..prioritized(&["A"])
    };
    let ctx = context(&["A"], options);
    let records = [snp("A", 100, &["T"], FilterStatus::Pass)];

    let merged = ctx
        .combine_annotated(&records, b'G', &DepthAnnotator)
        .unwrap()
        .unwrap();

    // the annotator ran, then pruning stripped its output along with the
    // rest of the auxiliary INFO
    let keys: Vec<&str> = merged.record.info.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["set"]);
}

#[test]
fn annotation_is_kept_without_pruning() {
    let ctx = context(&["A"], prioritized(&["A"]));
    let records = [snp("A", 100, &["T"], FilterStatus::Pass)];

    let merged = ctx
        .combine_annotated(&records, b'G', &DepthAnnotator)
        .unwrap()
        .unwrap();
    assert_eq!(merged.record.info.get("AN").unwrap(), "2");
}

#[test]
fn unconfigured_source_is_rejected() {
    let ctx = context(&["A"], prioritized(&["A"]));
    let records = [snp("Z", 100, &["T"], FilterStatus::Pass)];
    assert!(matches!(
        ctx.combine(&records, b'G'),
        Err(CombineError::UnknownSource(ref s)) if s == "Z"
    ));
}

#[test]
fn duplicate_source_is_rejected() {
    let ctx = context(&["A", "B"], prioritized(&["A", "B"]));
    let records = [
        snp("A", 100, &["T"], FilterStatus::Pass),
        snp("A", 100, &["A"], FilterStatus::Pass),
    ];
    assert!(matches!(
        ctx.combine(&records, b'G'),
        Err(CombineError::DuplicateSource(ref s)) if s == "A"
    ));
}

struct CollectingSink {
    written: Vec<(MergedRecord, u8)>,
}

impl VariantSink for CollectingSink {
    fn write(&mut self, record: &MergedRecord, reference_base: u8) -> anyhow::Result<()> {
        self.written.push((record.clone(), reference_base));
        Ok(())
    }
}

#[test]
fn shard_processing_is_position_ordered_and_counted() {
    let ctx = context(&["A", "B"], prioritized(&["A", "B"]));

    let inputs: Vec<PositionInput> = (1..=50)
        .map(|i| {
            let records = if i % 10 == 0 {
                // every tenth position has no input records
                vec![]
            } else {
                vec![
                    snp("A", i, &["T"], FilterStatus::Pass),
                    snp("B", i, &["A"], FilterStatus::Pass),
                ]
            };
            PositionInput {
                records,
                reference_base: b'G',
            }
        })
        .collect();

    let output = process_shard(&ctx, &inputs).unwrap().unwrap();

    assert_eq!(output.summary.positions_with_input, 45);
    assert_eq!(output.summary.records_emitted, 45);
    let positions: Vec<u32> = output.merged.iter().map(|m| m.record.position).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);

    // hand the collated shard to a sink, the way the output stage would
    let mut sink = CollectingSink { written: vec![] };
    for merged in &output.merged {
        let reference_base = merged.record.reference.as_bytes()[0];
        sink.write(merged, reference_base).unwrap();
    }
    assert_eq!(sink.written.len(), 45);
    assert!(sink.written.iter().all(|(_, base)| *base == b'G'));
}

#[test]
fn shard_matches_sequential_processing() {
    let ctx = context(&["A", "B"], prioritized(&["A", "B"]));
    let inputs: Vec<PositionInput> = (1..=20)
        .map(|i| PositionInput {
            records: vec![
                snp("A", i, &["T"], FilterStatus::Pass),
                snp("B", i, &["A"], FilterStatus::Pass),
            ],
            reference_base: b'G',
        })
        .collect();

    let parallel = process_shard(&ctx, &inputs).unwrap().unwrap();
    let sequential: Vec<_> = inputs
        .iter()
        .map(|input| ctx.process_position(input).unwrap())
        .collect();
    let folded = sequential
        .into_iter()
        .reduce(|a, b| ctx.combine_partial(a, b))
        .unwrap();

    assert_eq!(parallel.merged, folded.merged);
    assert_eq!(parallel.summary, folded.summary);
}
