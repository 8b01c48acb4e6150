//! Conditional preference tables.
//!
//! A `Cpt` with `n` parents is an `n`-dimensional table whose dimension `i`
//! ranges over parent `i`'s domain. It is stored as one flat buffer of leaves
//! addressed by a mixed-radix offset, last dimension fastest, so enumeration
//! order matches the lexicographic order of conditions.
//!
//! # Invariants
//! - `leaves.len()` equals the product of `dims` (1 for no parents).
//! - Every `&mut self` method advances the table's [`Generation`].

use crate::cache::{Generation, Memo};
use crate::domain::DomainRemap;
use crate::error::CptError;
use crate::preference::Preference;
use std::rc::Rc;

/// One domain index per parent, in parent order.
pub type Condition = Vec<usize>;

/// A leaf together with the condition that addresses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CptEntry<'a> {
    pub condition: Condition,
    pub leaf: &'a Preference,
}

#[derive(Debug, Clone)]
pub struct Cpt {
    dims: Vec<usize>,
    leaves: Vec<Preference>,
    generation: Generation,
    conditions: Memo<Vec<Condition>>,
}

impl Cpt {
    /// Table without parents holding a single leaf.
    pub fn new(leaf: Preference) -> Self {
        Self {
            dims: Vec::new(),
            leaves: vec![leaf],
            generation: Generation::default(),
            conditions: Memo::new(),
        }
    }

    /// Size of every dimension, in parent order.
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of leaves.
    #[inline]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// All leaves in enumeration order.
    #[inline]
    pub fn leaves(&self) -> &[Preference] {
        &self.leaves
    }

    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    fn offset(&self, condition: &[usize]) -> Result<usize, CptError> {
        if condition.len() != self.dims.len() {
            return Err(CptError::ConditionArity {
                expected: self.dims.len(),
                actual: condition.len(),
            });
        }
        let mut offset = 0;
        for (dimension, (&index, &size)) in condition.iter().zip(&self.dims).enumerate() {
            if index >= size {
                return Err(CptError::ConditionOutOfRange {
                    dimension,
                    index,
                    size,
                });
            }
            offset = offset * size + index;
        }
        Ok(offset)
    }

    /// Decodes a flat offset back into its condition.
    pub fn condition_at(&self, mut offset: usize) -> Condition {
        let mut condition = vec![0; self.dims.len()];
        for (slot, &size) in condition.iter_mut().zip(&self.dims).rev() {
            *slot = offset % size;
            offset /= size;
        }
        condition
    }

    pub fn get_leaf(&self, condition: &[usize]) -> Result<&Preference, CptError> {
        let offset = self.offset(condition)?;
        Ok(&self.leaves[offset])
    }

    pub fn set_leaf(&mut self, condition: &[usize], leaf: Preference) -> Result<(), CptError> {
        let offset = self.offset(condition)?;
        self.leaves[offset] = leaf;
        self.generation.bump();
        Ok(())
    }

    /// Iterates over every `(condition, leaf)` pair.
    ///
    /// The condition list is memoized until the next mutation; calling
    /// `enumerate` again restarts from the first leaf.
    pub fn enumerate(&self) -> Entries<'_> {
        let conditions = self.conditions.get_or_compute(self.generation, || {
            (0..self.leaves.len()).map(|i| self.condition_at(i)).collect()
        });
        Entries {
            conditions,
            leaves: &self.leaves,
            next: 0,
        }
    }

    /// `(outer, size, inner)` block sizes around dimension `position`.
    fn span(&self, position: usize) -> (usize, usize, usize) {
        let outer = self.dims[..position].iter().product();
        let size = self.dims.get(position).copied().unwrap_or(1);
        let inner = self.dims[(position + 1).min(self.dims.len())..]
            .iter()
            .product();
        (outer, size, inner)
    }

    /// Adds a dimension of `size` at `position`; every existing leaf is
    /// copied into all `size` slots of the new dimension.
    ///
    /// # Panics
    /// If `position > dims().len()` or `size == 0`.
    pub fn insert_parent_dimension(&mut self, position: usize, size: usize) {
        assert!(position <= self.dims.len(), "dimension position out of range");
        assert!(size > 0, "dimension size must be positive");
        let outer: usize = self.dims[..position].iter().product();
        let inner: usize = self.dims[position..].iter().product();
        let mut leaves = Vec::with_capacity(self.leaves.len() * size);
        for block in self.leaves.chunks(inner).take(outer) {
            for _ in 0..size {
                leaves.extend_from_slice(block);
            }
        }
        self.dims.insert(position, size);
        self.leaves = leaves;
        self.generation.bump();
    }

    /// Drops dimension `position`, keeping only its slice 0.
    ///
    /// Leaves stored under any other value of that dimension are discarded.
    ///
    /// # Panics
    /// If `position >= dims().len()`.
    pub fn remove_parent_dimension(&mut self, position: usize) {
        assert!(position < self.dims.len(), "dimension position out of range");
        let (outer, size, inner) = self.span(position);
        let mut leaves = Vec::with_capacity(outer * inner);
        for block in self.leaves.chunks(size * inner) {
            leaves.extend_from_slice(&block[..inner]);
        }
        self.dims.remove(position);
        self.leaves = leaves;
        self.generation.bump();
    }

    /// Re-lays dimension `position` after the parent's domain changed.
    ///
    /// Slices move to their new index, deleted slices are dropped and every
    /// new index receives a copy of the old slice 0.
    ///
    /// # Panics
    /// If `position >= dims().len()`.
    pub fn remap_child_dimension(&mut self, position: usize, remap: &DomainRemap) {
        assert!(position < self.dims.len(), "dimension position out of range");
        let (_, size, inner) = self.span(position);
        debug_assert_eq!(size, remap.index_map.len());
        let sources: Vec<usize> = (0..remap.new_len)
            .map(|k| remap.source_of(k).unwrap_or(0))
            .collect();
        let mut leaves = Vec::with_capacity(self.leaves.len() / size * remap.new_len);
        for block in self.leaves.chunks(size * inner) {
            for &source in &sources {
                leaves.extend_from_slice(&block[source * inner..(source + 1) * inner]);
            }
        }
        self.dims[position] = remap.new_len;
        self.leaves = leaves;
        self.generation.bump();
    }

    /// Reorders dimensions so that new dimension `i` is old dimension
    /// `order[i]`. Leaves keep their content; only their address changes.
    ///
    /// # Panics
    /// If `order` is not a permutation of `0..dims().len()`.
    pub fn permute_dimensions(&mut self, order: &[usize]) {
        assert_eq!(order.len(), self.dims.len(), "permutation arity mismatch");
        let mut seen = vec![false; order.len()];
        for &o in order {
            assert!(o < order.len() && !seen[o], "not a permutation");
            seen[o] = true;
        }
        if order.iter().enumerate().all(|(i, &o)| i == o) {
            return;
        }
        let mut strides = vec![1; self.dims.len()];
        for i in (0..self.dims.len() - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        let dims: Vec<usize> = order.iter().map(|&o| self.dims[o]).collect();
        let mut leaves = Vec::with_capacity(self.leaves.len());
        let mut condition = vec![0; dims.len()];
        for _ in 0..self.leaves.len() {
            let offset: usize = condition
                .iter()
                .zip(order)
                .map(|(&index, &o)| index * strides[o])
                .sum();
            leaves.push(self.leaves[offset].clone());
            for d in (0..dims.len()).rev() {
                condition[d] += 1;
                if condition[d] < dims[d] {
                    break;
                }
                condition[d] = 0;
            }
        }
        self.dims = dims;
        self.leaves = leaves;
        self.generation.bump();
    }

    /// Rewrites every leaf after the owning variable's domain changed.
    pub fn remap_own_preferences(&mut self, remap: &DomainRemap) {
        for leaf in &mut self.leaves {
            leaf.remap(remap);
        }
        self.generation.bump();
    }
}

/// Iterator returned by [`Cpt::enumerate`].
#[derive(Debug)]
pub struct Entries<'a> {
    conditions: Rc<Vec<Condition>>,
    leaves: &'a [Preference],
    next: usize,
}

impl<'a> Iterator for Entries<'a> {
    type Item = CptEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let leaf = self.leaves.get(self.next)?;
        let condition = self.conditions[self.next].clone();
        self.next += 1;
        Some(CptEntry { condition, leaf })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.leaves.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Entries<'_> {}
