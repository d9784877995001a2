use varmerge_core::{FilterStatus, SourceTaggedRecord};

use crate::MergeType;

/// Decide the merged record's pass/fail status and its provenance list.
///
/// UNION leaves the site unfiltered if at least one contributing record is
/// unfiltered; INTERSECTION requires every contributing record to be
/// unfiltered. When the outcome is filtered, the status carries the union
/// of the named filters from the filtered contributors. When it is
/// unfiltered, PASS is reported only if some contributor actually passed,
/// otherwise the status stays unknown.
///
/// Provenance lists every contributing source in the order the records
/// arrive (the orchestrator hands them over priority-sorted). The
/// filtered-are-uncalled exclusion happens before this resolver runs, so
/// an excluded source is simply absent here.
pub fn resolve_filter(
    records: &[&SourceTaggedRecord],
    mode: MergeType,
) -> (FilterStatus, Vec<String>) {
    let provenance: Vec<String> = records.iter().map(|r| r.source.clone()).collect();

    let unfiltered_count = records
        .iter()
        .filter(|r| r.record.filter.is_unfiltered())
        .count();

    let site_unfiltered = match mode {
        MergeType::Union => unfiltered_count > 0,
        MergeType::Intersection => unfiltered_count == records.len(),
    };

    let status = if site_unfiltered {
        if records.iter().any(|r| r.record.filter == FilterStatus::Pass) {
            FilterStatus::Pass
        } else {
            FilterStatus::Unknown
        }
    } else {
        FilterStatus::filtered(
            records
                .iter()
                .flat_map(|r| r.record.filter.filter_names())
                .map(str::to_string),
        )
    };

    (status, provenance)
}
