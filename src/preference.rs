//! Preference leaves: one ranking of a variable's domain.
//!
//! A leaf reads left to right from most to least preferred. Consecutive
//! entries are joined by a [`Relation`]. An entry may be *excluded*: it keeps
//! its position but takes no further part in comparisons.
//!
//! The raw interchange form is the alternating sequence
//! `[value, tie, value, tie, ..., value]` where `tie` is `1` for "weakly
//! precedes", `0` for "strictly precedes", and an excluded value `i` is
//! written as `-i - 1`.

use crate::domain::{Domain, DomainRemap};
use crate::error::PreferenceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an entry relates to the entry after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// Strictly precedes (`>`).
    Strict,
    /// Weakly precedes, i.e. ties are allowed (`>=`).
    Weak,
}

impl Relation {
    fn from_flag(flag: i64) -> Result<Self, PreferenceError> {
        match flag {
            0 => Ok(Relation::Strict),
            1 => Ok(Relation::Weak),
            _ => Err(PreferenceError::Malformed),
        }
    }

    fn flag(self) -> i64 {
        match self {
            Relation::Strict => 0,
            Relation::Weak => 1,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Relation::Strict => ">",
            Relation::Weak => ">=",
        }
    }
}

/// One ranked domain index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ranked {
    pub value: usize,
    pub excluded: bool,
}

impl Ranked {
    #[inline]
    pub const fn new(value: usize) -> Self {
        Self {
            value,
            excluded: false,
        }
    }

    #[inline]
    pub const fn excluded(value: usize) -> Self {
        Self {
            value,
            excluded: true,
        }
    }

    fn raw(self) -> i64 {
        if self.excluded {
            -(self.value as i64) - 1
        } else {
            self.value as i64
        }
    }
}

/// A ranking over domain indices.
///
/// # Invariant
/// `relations.len() + 1 == ranked.len()` whenever `ranked` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Preference {
    ranked: Vec<Ranked>,
    relations: Vec<Relation>,
}

impl Preference {
    /// Leaf ranking a single value.
    pub fn single(value: usize) -> Self {
        Self {
            ranked: vec![Ranked::new(value)],
            relations: Vec::new(),
        }
    }

    /// Strict total order over `order`, best first.
    pub fn strict<I: IntoIterator<Item = usize>>(order: I) -> Self {
        let ranked: Vec<Ranked> = order.into_iter().map(Ranked::new).collect();
        let relations = vec![Relation::Strict; ranked.len().saturating_sub(1)];
        Self { ranked, relations }
    }

    /// Parses the raw alternating encoding.
    pub fn from_raw(raw: &[i64]) -> Result<Self, PreferenceError> {
        if raw.is_empty() {
            return Err(PreferenceError::Empty);
        }
        if raw.len() % 2 == 0 {
            return Err(PreferenceError::Malformed);
        }
        let mut ranked = Vec::with_capacity(raw.len() / 2 + 1);
        let mut relations = Vec::with_capacity(raw.len() / 2);
        for (i, &item) in raw.iter().enumerate() {
            if i % 2 == 1 {
                relations.push(Relation::from_flag(item)?);
            } else if item < 0 {
                let value = item
                    .checked_neg()
                    .and_then(|n| usize::try_from(n - 1).ok())
                    .ok_or(PreferenceError::Malformed)?;
                ranked.push(Ranked::excluded(value));
            } else {
                let value = usize::try_from(item).map_err(|_| PreferenceError::Malformed)?;
                ranked.push(Ranked::new(value));
            }
        }
        Ok(Self { ranked, relations })
    }

    /// Raw alternating encoding; length is `2 * len() - 1`.
    pub fn to_raw(&self) -> Vec<i64> {
        let mut raw = Vec::with_capacity(self.raw_len());
        for (i, entry) in self.ranked.iter().enumerate() {
            if i > 0 {
                raw.push(self.relations[i - 1].flag());
            }
            raw.push(entry.raw());
        }
        raw
    }

    #[inline]
    pub fn ranked(&self) -> &[Ranked] {
        &self.ranked
    }

    #[inline]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Number of ranked entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Length of the raw encoding.
    #[inline]
    pub fn raw_len(&self) -> usize {
        (2 * self.ranked.len()).saturating_sub(1)
    }

    /// Checks that the leaf ranks every index of a `domain_len`-value domain
    /// exactly once.
    pub fn validate(&self, domain_len: usize) -> Result<(), PreferenceError> {
        if self.ranked.is_empty() {
            return Err(PreferenceError::Empty);
        }
        if self.relations.len() + 1 != self.ranked.len() {
            return Err(PreferenceError::Malformed);
        }
        let mut seen = vec![false; domain_len];
        for entry in &self.ranked {
            let slot = seen
                .get_mut(entry.value)
                .ok_or(PreferenceError::ValueOutOfRange {
                    index: entry.value,
                    domain_len,
                })?;
            if *slot {
                return Err(PreferenceError::NotAPermutation);
            }
            *slot = true;
        }
        if seen.iter().all(|s| *s) {
            Ok(())
        } else {
            Err(PreferenceError::NotAPermutation)
        }
    }

    /// Rewrites the leaf after its own variable's domain changed.
    ///
    /// Deleted entries disappear together with one adjacent relation: the one
    /// on their left, or the one on their right for the first entry. Surviving
    /// entries are relabelled. Every added index is appended after a fresh
    /// strict relation.
    pub fn remap(&mut self, remap: &DomainRemap) {
        let mut i = 0;
        while i < self.ranked.len() {
            let target = remap
                .index_map
                .get(self.ranked[i].value)
                .copied()
                .flatten();
            match target {
                Some(new_index) => {
                    self.ranked[i].value = new_index;
                    i += 1;
                }
                None => {
                    self.ranked.remove(i);
                    if i == 0 {
                        if !self.relations.is_empty() {
                            self.relations.remove(0);
                        }
                    } else {
                        self.relations.remove(i - 1);
                    }
                }
            }
        }
        for &added in &remap.added {
            if !self.ranked.is_empty() {
                self.relations.push(Relation::Strict);
            }
            self.ranked.push(Ranked::new(added));
        }
    }

    /// Renders the leaf with value names, e.g. `Fair > Rain`.
    pub fn describe(&self, domain: &Domain) -> String {
        let mut out = String::new();
        for (i, entry) in self.ranked.iter().enumerate() {
            if i > 0 {
                out.push(' ');
                out.push_str(self.relations[i - 1].symbol());
                out.push(' ');
            }
            if entry.excluded {
                out.push('~');
            }
            out.push_str(domain.get(entry.value).unwrap_or("?"));
        }
        out
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.ranked.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.relations[i - 1].symbol())?;
            }
            if entry.excluded {
                write!(f, "~")?;
            }
            write!(f, "{}", entry.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remap(old: &[&str], new: &[&str]) -> DomainRemap {
        Domain::normalize(old.iter().copied())
            .remap_to(&Domain::normalize(new.iter().copied()))
            .unwrap()
    }

    #[test]
    fn raw_encoding_roundtrips_ties_and_exclusions() {
        let raw = vec![2, 1, -1, 0, 1];
        let pref = Preference::from_raw(&raw).unwrap();
        assert_eq!(pref.ranked()[1], Ranked::excluded(0));
        assert_eq!(pref.relations(), &[Relation::Weak, Relation::Strict]);
        assert_eq!(pref.to_raw(), raw);
        assert_eq!(pref.raw_len(), 5);
        assert_eq!(pref.to_string(), "2 >= ~0 > 1");
    }

    #[test]
    fn malformed_raw_is_rejected() {
        assert_eq!(Preference::from_raw(&[]), Err(PreferenceError::Empty));
        assert_eq!(Preference::from_raw(&[0, 0]), Err(PreferenceError::Malformed));
        assert_eq!(Preference::from_raw(&[0, 7, 1]), Err(PreferenceError::Malformed));
        assert_eq!(Preference::from_raw(&[i64::MIN]), Err(PreferenceError::Malformed));
        assert_eq!(
            Preference::from_raw(&[0, 0, i64::MIN]),
            Err(PreferenceError::Malformed)
        );
        let largest = Preference::from_raw(&[i64::MAX]).unwrap();
        assert_eq!(largest.ranked()[0], Ranked::new(i64::MAX as usize));
    }

    #[test]
    fn validate_requires_permutation() {
        assert!(Preference::strict([1, 0]).validate(2).is_ok());
        assert_eq!(
            Preference::strict([0, 0]).validate(2),
            Err(PreferenceError::NotAPermutation)
        );
        assert_eq!(
            Preference::strict([0]).validate(2),
            Err(PreferenceError::NotAPermutation)
        );
        assert_eq!(
            Preference::strict([0, 2]).validate(2),
            Err(PreferenceError::ValueOutOfRange {
                index: 2,
                domain_len: 2
            })
        );
    }

    #[test]
    fn deleting_middle_entry_drops_left_relation() {
        // a >= b > c, delete b -> a > c
        let mut pref = Preference::from_raw(&[0, 1, 1, 0, 2]).unwrap();
        pref.remap(&remap(&["a", "b", "c"], &["a", "c"]));
        assert_eq!(pref.to_raw(), vec![0, 0, 1]);
    }

    #[test]
    fn deleting_middle_entry_keeps_right_relation() {
        // a > b >= c, delete b -> a >= c (the left relation goes, whatever its kind)
        let mut pref = Preference::from_raw(&[0, 0, 1, 1, 2]).unwrap();
        pref.remap(&remap(&["a", "b", "c"], &["a", "c"]));
        assert_eq!(pref.to_raw(), vec![0, 1, 1]);
        assert_eq!(pref.relations(), &[Relation::Weak]);
    }

    #[test]
    fn deleting_first_entry_drops_right_relation() {
        // b >= a > c, delete b -> a > c
        let mut pref = Preference::from_raw(&[1, 1, 0, 0, 2]).unwrap();
        pref.remap(&remap(&["a", "b", "c"], &["a", "c"]));
        assert_eq!(pref.to_raw(), vec![0, 0, 1]);
    }

    #[test]
    fn added_values_are_appended_strictly() {
        // Rain > Fair, add Snow
        let mut pref = Preference::strict([1, 0]);
        pref.remap(&remap(&["Fair", "Rain"], &["Fair", "Rain", "Snow"]));
        assert_eq!(pref.to_raw(), vec![1, 0, 0, 0, 2]);
        assert!(pref.validate(3).is_ok());
    }

    #[test]
    fn rename_keeps_ranking() {
        let mut pref = Preference::from_raw(&[1, 1, 0]).unwrap();
        // b renamed to z keeps slot 1
        pref.remap(&remap(&["a", "b"], &["a", "z"]));
        assert_eq!(pref.to_raw(), vec![1, 1, 0]);
    }

    #[test]
    fn replacing_whole_domain_leaves_fresh_order() {
        let mut pref = Preference::strict([1, 0]);
        pref.remap(&remap(&["a", "b"], &["c"]));
        assert_eq!(pref.to_raw(), vec![0]);
    }

    #[test]
    fn exclusion_survives_remap() {
        let mut pref = Preference::from_raw(&[-2, 0, 0]).unwrap();
        pref.remap(&remap(&["b", "c"], &["a", "b", "c"]));
        assert_eq!(pref.to_raw(), vec![-3, 0, 1, 0, 0]);
    }

    #[test]
    fn describe_uses_value_names() {
        let domain = Domain::normalize(["Fair", "Rain"]);
        assert_eq!(Preference::strict([0, 1]).describe(&domain), "Fair > Rain");
    }
}
