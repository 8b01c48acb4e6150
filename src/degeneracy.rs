//! Vacuous-parent analysis.
//!
//! A parent is *degenerate* for a child when the child's ranking never
//! depends on it: with every other parent held fixed, all values of the
//! tested parent address identical leaves. The edge then carries no
//! information.
//!
//! Verdicts are memoized per parent position against the child's CPT
//! generation, so any CPT or topology change discards them.

use crate::arena::VariableId;
use crate::core::CpNet;
use tracing::trace;

/// Outcome of [`is_parent_degenerate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Degeneracy {
    /// Some group of leaves differs across the parent's values.
    NotDegenerate,
    /// Every group is pointwise identical across the parent's values.
    Degenerate,
    /// Reserved for approximate analyses; the exact scan never reports it.
    PossiblyDegenerate,
    /// Unknown variable, bad parent position or a malformed table.
    Error,
    /// The table is larger than the cost cap and no verdict is cached.
    OverCap,
}

impl Degeneracy {
    /// Returns `true` only for a definite [`Degeneracy::Degenerate`].
    #[inline]
    pub fn is_degenerate(self) -> bool {
        self == Degeneracy::Degenerate
    }
}

/// Decides whether parent number `parent_index` of `id` is degenerate.
///
/// Scans `outer * size * inner` leaves where `size` is the tested parent's
/// domain size and `outer`/`inner` are the products of the dimensions before
/// and after it. If that total exceeds `cost_cap` the scan is skipped and a
/// cached verdict, or [`Degeneracy::OverCap`], is returned. Pass `None` to
/// force the scan.
pub fn is_parent_degenerate(
    net: &CpNet,
    id: VariableId,
    parent_index: usize,
    cost_cap: Option<u64>,
) -> Degeneracy {
    let Some(variable) = net.variable(id) else {
        return Degeneracy::Error;
    };
    let cpt = variable.cpt();
    let dims = cpt.dims();
    if parent_index >= dims.len() {
        return Degeneracy::Error;
    }
    let generation = cpt.generation();
    if let Some(verdict) = variable.degeneracy.get(generation, parent_index) {
        trace!(variable = %variable.name(), parent_index, ?verdict, "degeneracy cache hit");
        return verdict;
    }
    let total = cpt.len() as u64;
    if cost_cap.map_or(false, |cap| total > cap) {
        trace!(variable = %variable.name(), parent_index, total, "degeneracy over cap");
        return Degeneracy::OverCap;
    }

    let outer: usize = dims[..parent_index].iter().product();
    let size = dims[parent_index];
    let inner: usize = dims[parent_index + 1..].iter().product();
    let leaves = cpt.leaves();

    let verdict = if leaves.len() != outer * size * inner {
        Degeneracy::Error
    } else {
        let differs = (0..outer).any(|o| {
            (0..inner).any(|i| {
                let base = o * size * inner + i;
                (1..size).any(|k| leaves[base + k * inner] != leaves[base])
            })
        });
        if differs {
            Degeneracy::NotDegenerate
        } else {
            Degeneracy::Degenerate
        }
    };
    variable.degeneracy.insert(generation, parent_index, verdict);
    trace!(variable = %variable.name(), parent_index, ?verdict, "degeneracy computed");
    verdict
}

/// [`is_parent_degenerate`] under the net's configured cost cap.
pub fn verdict_with_config(net: &CpNet, id: VariableId, parent_index: usize) -> Degeneracy {
    is_parent_degenerate(net, id, parent_index, net.config().degeneracy_cost_cap)
}

/// Parents of `id` reported [`Degeneracy::Degenerate`] under `cost_cap`.
pub fn degenerate_parents(net: &CpNet, id: VariableId, cost_cap: Option<u64>) -> Vec<VariableId> {
    let Some(variable) = net.variable(id) else {
        return Vec::new();
    };
    variable
        .parents()
        .iter()
        .enumerate()
        .filter(|&(index, _)| is_parent_degenerate(net, id, index, cost_cap).is_degenerate())
        .map(|(_, &parent)| parent)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkPolicy;
    use crate::operations::{insert_variable, link, set_domain, set_preference, unlink};
    use crate::preference::Preference;

    /// `A{x,y}` and `B{x,y}` both parents of `C{x,y}`; every leaf is `x > y`.
    fn diamond() -> (CpNet, [VariableId; 3]) {
        let mut net = CpNet::new();
        let a = insert_variable(&mut net, "A", ["x", "y"]).unwrap();
        let b = insert_variable(&mut net, "B", ["x", "y"]).unwrap();
        let c = insert_variable(&mut net, "C", ["x", "y"]).unwrap();
        link(&mut net, a, c, &LinkPolicy::acyclic()).unwrap();
        link(&mut net, b, c, &LinkPolicy::acyclic()).unwrap();
        (net, [a, b, c])
    }

    #[test]
    fn uniform_table_is_degenerate_in_every_parent() {
        let (net, [a, b, c]) = diamond();
        assert_eq!(is_parent_degenerate(&net, c, 0, None), Degeneracy::Degenerate);
        assert_eq!(is_parent_degenerate(&net, c, 1, None), Degeneracy::Degenerate);
        assert_eq!(degenerate_parents(&net, c, None), vec![a, b]);
    }

    #[test]
    fn varying_only_one_parent() {
        let (mut net, [a, _, c]) = diamond();
        // ranking flips with A, ignores B
        set_preference(&mut net, c, &[1, 0], Preference::strict([1, 0])).unwrap();
        set_preference(&mut net, c, &[1, 1], Preference::strict([1, 0])).unwrap();
        assert_eq!(is_parent_degenerate(&net, c, 0, None), Degeneracy::NotDegenerate);
        assert_eq!(is_parent_degenerate(&net, c, 1, None), Degeneracy::Degenerate);
        assert_eq!(degenerate_parents(&net, c, None).len(), 1);
        assert!(!degenerate_parents(&net, c, None).contains(&a));
    }

    #[test]
    fn verdict_follows_mutation() {
        let (mut net, [_, _, c]) = diamond();
        assert_eq!(is_parent_degenerate(&net, c, 1, None), Degeneracy::Degenerate);
        set_preference(&mut net, c, &[0, 1], Preference::strict([1, 0])).unwrap();
        assert_eq!(is_parent_degenerate(&net, c, 1, None), Degeneracy::NotDegenerate);
    }

    #[test]
    fn over_cap_without_cached_verdict() {
        let (mut net, [a, _, c]) = diamond();
        assert_eq!(is_parent_degenerate(&net, c, 0, Some(3)), Degeneracy::OverCap);
        assert_eq!(is_parent_degenerate(&net, c, 0, None), Degeneracy::Degenerate);
        assert_eq!(is_parent_degenerate(&net, c, 0, Some(3)), Degeneracy::Degenerate);
        assert_eq!(is_parent_degenerate(&net, c, 0, Some(4)), Degeneracy::Degenerate);

        set_domain(&mut net, a, ["x", "y", "z"]).unwrap();
        assert_eq!(is_parent_degenerate(&net, c, 0, Some(4)), Degeneracy::OverCap);
        unlink(&mut net, a, c).unwrap();
        assert_eq!(verdict_with_config(&net, c, 0), Degeneracy::Degenerate);
    }

    #[test]
    fn bad_requests_are_errors() {
        let (net, [a, _, c]) = diamond();
        assert_eq!(is_parent_degenerate(&net, a, 0, None), Degeneracy::Error);
        assert_eq!(is_parent_degenerate(&net, c, 2, None), Degeneracy::Error);
        assert_eq!(
            is_parent_degenerate(&net, VariableId::new(99), 0, None),
            Degeneracy::Error
        );
    }
}
