//! The CP-net graph.
//!
//! `CpNet` owns every variable in an arena and keeps an ordered membership
//! list. A variable can live in the arena before it joins the membership
//! (it may be named, linked and edited first); only members take part in name
//! uniqueness, cycle sweeps, fingerprints and serialization.
//!
//! # Invariants
//! - No two members share a name; no member has a blank name.
//! - Every relation refers to a live variable.
//! - Membership order is insertion order.

use crate::arena::{VariableArena, VariableId};
use crate::config::NetConfig;
use crate::error::NetError;
use crate::variable::Variable;
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct CpNet {
    arena: VariableArena<Variable>,
    members: Vec<VariableId>,
    config: NetConfig,
}

impl CpNet {
    /// Empty net with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty net with the given configuration.
    pub fn with_config(config: NetConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[inline]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// Member ids in net order.
    #[inline]
    pub fn ids(&self) -> &[VariableId] {
        &self.members
    }

    /// Members in net order.
    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.members
            .iter()
            .filter_map(move |&id| self.arena.get(id).map(|v| (id, v)))
    }

    /// Number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Looks up any live variable, member or not.
    #[inline]
    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.arena.get(id)
    }

    /// Returns `true` if `id` is a live variable.
    #[inline]
    pub fn contains(&self, id: VariableId) -> bool {
        self.arena.contains(id)
    }

    /// Returns `true` if `id` belongs to the membership list.
    pub fn is_member(&self, id: VariableId) -> bool {
        self.members.contains(&id)
    }

    /// Member with the given name.
    pub fn find(&self, name: &str) -> Option<VariableId> {
        self.variables()
            .find(|(_, v)| v.name() == name)
            .map(|(id, _)| id)
    }

    /// Name of any live variable.
    pub fn name_of(&self, id: VariableId) -> Option<&str> {
        self.arena.get(id).map(Variable::name)
    }

    /// Returns `true` if `parent` is a parent of `child`.
    pub fn is_linked(&self, parent: VariableId, child: VariableId) -> bool {
        self.arena
            .get(child)
            .map_or(false, |c| c.has_parent(parent))
    }

    /// Returns `true` if a walk over parent edges starting at `id` comes back
    /// to `id`, i.e. `id` lies on a directed cycle.
    ///
    /// Cycles reachable from `id` that do not pass through it are not
    /// reported.
    pub fn is_cyclic(&self, id: VariableId) -> bool {
        let mut visited = HashSet::new();
        let mut stack: Vec<VariableId> = match self.arena.get(id) {
            Some(start) => start.parents.clone(),
            None => return false,
        };
        while let Some(current) = stack.pop() {
            if current == id {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            if let Some(variable) = self.arena.get(current) {
                stack.extend(variable.parents.iter().copied());
            }
        }
        false
    }

    /// Returns `true` if any member lies on a directed cycle.
    pub fn has_cycle(&self) -> bool {
        self.members.iter().any(|&id| self.is_cyclic(id))
    }

    pub(crate) fn require(&self, id: VariableId) -> Result<&Variable, NetError> {
        self.arena.get(id).ok_or(NetError::UnknownVariable(id))
    }

    pub(crate) fn require_mut(&mut self, id: VariableId) -> Result<&mut Variable, NetError> {
        self.arena.get_mut(id).ok_or(NetError::UnknownVariable(id))
    }

    /// Returns `true` if a member other than `except` is named `name`.
    pub(crate) fn name_taken(&self, name: &str, except: Option<VariableId>) -> bool {
        self.variables()
            .any(|(id, v)| Some(id) != except && v.name() == name)
    }

    pub(crate) fn allocate(&mut self, variable: Variable) -> VariableId {
        self.arena.allocate(variable)
    }

    pub(crate) fn deallocate(&mut self, id: VariableId) -> Option<Variable> {
        self.members.retain(|&m| m != id);
        self.arena.deallocate(id)
    }

    pub(crate) fn push_member(&mut self, id: VariableId) {
        self.members.push(id);
    }
}
