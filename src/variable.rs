//! Preference variables: the nodes of a CP-net.

use crate::arena::VariableId;
use crate::cache::VerdictCache;
use crate::cpt::{Cpt, CptEntry};
use crate::degeneracy::Degeneracy;
use crate::domain::Domain;
use crate::preference::Preference;

/// A preference variable.
///
/// Relations are handles into the owning [`crate::CpNet`]; mutating them is
/// the job of [`crate::operations`], which keeps both sides and the CPT
/// shape consistent.
///
/// # Invariants
/// - `parents` is sorted by parent name (stable for equal names).
/// - `cpt.dims()[i]` equals the domain size of `parents[i]`.
/// - Every leaf ranks each domain value exactly once.
/// - Each entry of `parents` is mirrored by one entry in that parent's `children`.
#[derive(Debug, Clone)]
pub struct Variable {
    pub(crate) name: String,
    pub(crate) domain: Domain,
    pub(crate) parents: Vec<VariableId>,
    pub(crate) children: Vec<VariableId>,
    pub(crate) cpt: Cpt,
    pub(crate) degeneracy: VerdictCache<Degeneracy>,
}

impl Variable {
    /// Fresh variable with the placeholder domain and no relations.
    pub(crate) fn new(name: impl Into<String>) -> Self {
        let domain = Domain::default();
        Self {
            name: name.into(),
            cpt: Cpt::new(Preference::strict(0..domain.len())),
            domain,
            parents: Vec::new(),
            children: Vec::new(),
            degeneracy: VerdictCache::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Parents in CPT dimension order.
    #[inline]
    pub fn parents(&self) -> &[VariableId] {
        &self.parents
    }

    #[inline]
    pub fn children(&self) -> &[VariableId] {
        &self.children
    }

    #[inline]
    pub fn cpt(&self) -> &Cpt {
        &self.cpt
    }

    /// Leaf for `condition`, if the condition addresses one.
    pub fn preference(&self, condition: &[usize]) -> Option<&Preference> {
        self.cpt.get_leaf(condition).ok()
    }

    /// Every `(condition, leaf)` pair of the CPT.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = CptEntry<'_>> {
        self.cpt.enumerate()
    }

    /// Number of CPT leaves, without enumerating them.
    #[inline]
    pub fn cpt_len(&self) -> usize {
        self.cpt.len()
    }

    /// Position of `parent` among this variable's parents.
    pub fn parent_position(&self, parent: VariableId) -> Option<usize> {
        self.parents.iter().position(|&p| p == parent)
    }

    /// Returns `true` if `parent` is one of this variable's parents.
    pub fn has_parent(&self, parent: VariableId) -> bool {
        self.parents.contains(&parent)
    }
}
