//! Domain value sets and the index remapping produced when a domain changes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value used when a domain would otherwise be empty.
pub const PLACEHOLDER_VALUE: &str = "domain_item";

/// Ordered, de-duplicated list of value names of one variable.
///
/// # Invariants
/// - At least one value.
/// - Values are trimmed, non-blank, sorted, unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain {
    values: Vec<String>,
}

impl Domain {
    /// Normalizes `values`: trim, drop blanks, sort, dedupe, default to
    /// [`PLACEHOLDER_VALUE`] when nothing is left.
    pub fn normalize<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values: Vec<String> = values
            .into_iter()
            .map(|v| v.as_ref().trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        values.sort();
        values.dedup();
        if values.is_empty() {
            values.push(PLACEHOLDER_VALUE.to_string());
        }
        Self { values }
    }

    /// Number of values (always at least 1).
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Position of `value`; the list is sorted so this is a binary search.
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.values
            .binary_search_by(|probe| probe.as_str().cmp(value))
            .ok()
    }

    /// Computes how indices of `self` move when the domain becomes `next`.
    ///
    /// Returns `None` when both domains are identical.
    ///
    /// When the sizes match the change is treated as a rename: every old value
    /// missing from `next` is paired, in old-index order, with the first new
    /// value nothing maps to yet. No indices are reported as added in that case.
    /// When the sizes differ, old values missing from `next` are dropped and
    /// new values missing from `self` are reported as added.
    pub fn remap_to(&self, next: &Domain) -> Option<DomainRemap> {
        if self == next {
            return None;
        }
        let mut index_map: Vec<Option<usize>> =
            self.values.iter().map(|v| next.index_of(v)).collect();
        let mut added = Vec::new();

        if self.len() == next.len() {
            let mut taken = vec![false; next.len()];
            for target in index_map.iter().flatten() {
                taken[*target] = true;
            }
            for slot in index_map.iter_mut().filter(|slot| slot.is_none()) {
                if let Some(free) = taken.iter().position(|t| !t) {
                    taken[free] = true;
                    *slot = Some(free);
                }
            }
        } else {
            added = (0..next.len())
                .filter(|&i| self.index_of(&next.values[i]).is_none())
                .collect();
        }

        Some(DomainRemap {
            index_map,
            added,
            new_len: next.len(),
        })
    }
}

impl Default for Domain {
    fn default() -> Self {
        Self::normalize(std::iter::empty::<&str>())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.values.join(", "))
    }
}

/// Old-index to new-index mapping for one domain change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRemap {
    /// `index_map[old]` is the new index, or `None` if the value was deleted.
    pub index_map: Vec<Option<usize>>,
    /// New indices with no old counterpart, ascending.
    pub added: Vec<usize>,
    /// Size of the new domain.
    pub new_len: usize,
}

impl DomainRemap {
    /// Old index that moves to `new_index`, if any.
    pub fn source_of(&self, new_index: usize) -> Option<usize> {
        self.index_map
            .iter()
            .position(|target| *target == Some(new_index))
    }
}
