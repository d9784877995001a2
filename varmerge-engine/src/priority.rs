use std::collections::BTreeSet;

use fxhash::FxHashMap;

use crate::GenotypeMergeType;
use crate::errors::{CombineError, Result};

/// Ordered source preference used to break genotype conflicts.
///
/// Built once at startup from the configured source names and the optional
/// priority string, then immutable for the rest of the run. The list is
/// always an exact permutation of the configured names; construction fails
/// otherwise.
#[derive(Debug, Clone)]
pub struct PriorityList {
    names: Vec<String>,
    ranks: FxHashMap<String, usize>,
}

impl PriorityList {
    /// Validate and materialize the priority ordering.
    ///
    /// With [`GenotypeMergeType::Prioritize`] the comma-separated priority
    /// string is required and supplies the order. The other modes do not
    /// consult priority, so the list defaults to the configured names in
    /// their set order (sorted, which keeps it fixed across runs).
    pub fn resolve(
        configured: &BTreeSet<String>,
        priority: Option<&str>,
        mode: GenotypeMergeType,
    ) -> Result<Self> {
        let names: Vec<String> = match (mode, priority) {
            (GenotypeMergeType::Prioritize, None) => return Err(CombineError::MissingPriority),
            (GenotypeMergeType::Prioritize, Some(p)) => {
                p.split(',').map(|s| s.trim().to_string()).collect()
            }
            (_, _) => configured.iter().cloned().collect(),
        };

        let as_set: BTreeSet<&str> = names.iter().map(String::as_str).collect();
        let configured_set: BTreeSet<&str> = configured.iter().map(String::as_str).collect();
        if names.len() != configured.len() || as_set != configured_set {
            return Err(CombineError::PriorityMismatch {
                configured: configured.iter().cloned().collect(),
                priority: names,
            });
        }

        let ranks = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();

        Ok(PriorityList { names, ranks })
    }

    /// Position of a source in the priority order, lower wins.
    pub fn rank(&self, source: &str) -> Option<usize> {
        self.ranks.get(source).copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sources(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn prioritize_requires_priority_string() {
        let err = PriorityList::resolve(&sources(&["A", "B"]), None, GenotypeMergeType::Prioritize);
        assert!(matches!(err, Err(CombineError::MissingPriority)));
    }

    #[test]
    fn incomplete_priority_rejected() {
        let err = PriorityList::resolve(
            &sources(&["A", "B", "C"]),
            Some("A,B"),
            GenotypeMergeType::Prioritize,
        );
        assert!(matches!(err, Err(CombineError::PriorityMismatch { .. })));
    }

    #[test]
    fn unknown_source_in_priority_rejected() {
        let err = PriorityList::resolve(
            &sources(&["A", "B"]),
            Some("A,D"),
            GenotypeMergeType::Prioritize,
        );
        assert!(matches!(err, Err(CombineError::PriorityMismatch { .. })));
    }

    #[test]
    fn full_priority_preserves_order() {
        let list = PriorityList::resolve(
            &sources(&["A", "B", "C"]),
            Some("C,A,B"),
            GenotypeMergeType::Prioritize,
        )
        .unwrap();
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["C", "A", "B"]);
        assert_eq!(list.rank("C"), Some(0));
        assert_eq!(list.rank("B"), Some(2));
        assert_eq!(list.rank("D"), None);
    }

    #[test]
    fn non_prioritize_defaults_to_fixed_order() {
        let list =
            PriorityList::resolve(&sources(&["B", "A"]), None, GenotypeMergeType::Uniquify)
                .unwrap();
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["A", "B"]);
    }
}
