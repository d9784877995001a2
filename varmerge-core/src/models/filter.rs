use std::collections::BTreeSet;
use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Filter status of a variant record.
///
/// A record is "unfiltered" if it passed filtering or was never filtered at
/// all; only a record carrying named filters counts as filtered.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FilterStatus {
    /// The record passed quality filtering.
    Pass,
    /// The record failed one or more named filters.
    Filtered(BTreeSet<String>),
    /// No filtering was applied.
    Unknown,
}

impl FilterStatus {
    /// Build a `Filtered` status from named filters.
    pub fn filtered<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterStatus::Filtered(names.into_iter().map(|n| n.into()).collect())
    }

    /// True for `Pass` and `Unknown`, false for `Filtered`.
    pub fn is_unfiltered(&self) -> bool {
        !matches!(self, FilterStatus::Filtered(_))
    }

    /// The named filters this record failed, empty when unfiltered.
    pub fn filter_names(&self) -> impl Iterator<Item = &str> {
        match self {
            FilterStatus::Filtered(names) => Some(names.iter().map(String::as_str)),
            _ => None,
        }
        .into_iter()
        .flatten()
    }
}

impl Default for FilterStatus {
    fn default() -> Self {
        FilterStatus::Unknown
    }
}

impl Display for FilterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStatus::Pass => write!(f, "PASS"),
            FilterStatus::Unknown => write!(f, "."),
            FilterStatus::Filtered(names) => {
                let joined = names.iter().cloned().collect::<Vec<_>>().join(";");
                write!(f, "{}", joined)
            }
        }
    }
}
