//! Mutating operations on a CP-net.
//!
//! Every operation either succeeds completely or returns an error with the
//! net untouched. Topology and domain changes keep each affected CPT shaped
//! as the product of its parents' domain sizes; derived caches follow the
//! CPT generation counters and need no explicit invalidation here.
//!
//! # Citations
//! - CP-nets: Boutilier et al., "CP-nets: A Tool for Representing and Reasoning with
//!   Conditional Ceteris Paribus Preference Statements", JAIR 21 (2004)

use crate::arena::VariableId;
use crate::config::LinkPolicy;
use crate::core::CpNet;
use crate::domain::Domain;
use crate::error::{LinkError, NameError, NetError};
use crate::preference::Preference;
use crate::variable::Variable;
use tracing::debug;

/// Result of a successful [`link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new parent relation was created.
    Linked,
    /// The pair was already linked; nothing changed.
    AlreadyLinked,
}

fn checked_name(name: &str) -> Result<String, NameError> {
    let name = name.trim();
    if name.is_empty() {
        Err(NameError::Blank)
    } else {
        Ok(name.to_string())
    }
}

/// Position at which a parent named `name` joins `parents`: after every
/// parent whose name sorts at or before it.
fn sorted_position(net: &CpNet, parents: &[VariableId], name: &str) -> usize {
    parents.partition_point(|&p| net.name_of(p).map_or(true, |n| n <= name))
}

/// Creates a variable outside the net's membership.
///
/// The variable starts with the placeholder domain, no relations and a
/// single leaf. It can be linked and edited before [`add_variable`] makes it
/// a member.
pub fn create_variable(net: &mut CpNet, name: &str) -> Result<VariableId, NetError> {
    let name = checked_name(name)?;
    debug!(name = %name, "create variable");
    Ok(net.allocate(Variable::new(name)))
}

/// Makes a live variable a member of the net.
///
/// Adding a variable that is already a member is a no-op. Every parent of
/// the variable must already be a member.
pub fn add_variable(net: &mut CpNet, id: VariableId) -> Result<(), NetError> {
    if net.is_member(id) {
        return Ok(());
    }
    let variable = net.require(id)?;
    let name = variable.name.clone();
    if name.trim().is_empty() {
        return Err(NameError::Blank.into());
    }
    if let Some(&parent) = variable.parents.iter().find(|&&p| !net.is_member(p)) {
        let parent = net.name_of(parent).unwrap_or_default().to_string();
        return Err(LinkError::DetachedParent(parent).into());
    }
    if net.name_taken(&name, Some(id)) {
        return Err(NameError::Duplicate(name).into());
    }
    debug!(name = %name, id = %id, "add variable");
    net.push_member(id);
    Ok(())
}

/// Creates a member variable with the given domain in one step.
pub fn insert_variable<I, S>(
    net: &mut CpNet,
    name: &str,
    values: I,
) -> Result<VariableId, NetError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let checked = checked_name(name)?;
    if net.name_taken(&checked, None) {
        return Err(NameError::Duplicate(checked).into());
    }
    let id = create_variable(net, &checked)?;
    set_domain(net, id, values)?;
    add_variable(net, id)?;
    Ok(id)
}

/// Renames a variable.
///
/// Fails without mutation if the name is blank or held by another member.
/// Children whose parent order changes under the new name have their CPT
/// dimensions permuted to match, so no leaf moves to a different condition.
pub fn rename(net: &mut CpNet, id: VariableId, name: &str) -> Result<(), NetError> {
    let name = checked_name(name)?;
    let current = net.require(id)?;
    if current.name == name {
        return Ok(());
    }
    if net.name_taken(&name, Some(id)) {
        return Err(NameError::Duplicate(name).into());
    }
    let children = current.children.clone();
    debug!(from = %current.name, to = %name, "rename variable");
    net.require_mut(id)?.name = name.clone();

    for child in children {
        let mut parents = net.require(child)?.parents.clone();
        let Some(old) = parents.iter().position(|&p| p == id) else {
            continue;
        };
        parents.remove(old);
        let new = sorted_position(net, &parents, &name);
        if new == old {
            continue;
        }
        parents.insert(new, id);
        let mut order: Vec<usize> = (0..parents.len()).filter(|&i| i != old).collect();
        order.insert(new, old);
        let variable = net.require_mut(child)?;
        variable.parents = parents;
        variable.cpt.permute_dimensions(&order);
        debug!(child = %variable.name, from = old, to = new, "reorder parent dimension");
    }
    Ok(())
}

/// Replaces a variable's domain.
///
/// The input is normalized (trimmed, deduplicated, sorted, never empty).
/// Own leaves are remapped first: deleted values drop out, renamed values
/// keep their rank, added values are appended as least preferred. Each
/// child then re-lays its dimension for this variable, with added values
/// copying the slice of old value 0.
///
/// Returns `false` if the normalized domain equals the current one.
pub fn set_domain<I, S>(net: &mut CpNet, id: VariableId, values: I) -> Result<bool, NetError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let next = Domain::normalize(values);
    let variable = net.require_mut(id)?;
    let Some(remap) = variable.domain.remap_to(&next) else {
        return Ok(false);
    };
    debug!(
        name = %variable.name,
        from = variable.domain.len(),
        to = next.len(),
        added = remap.added.len(),
        "set domain"
    );
    variable.domain = next;
    variable.cpt.remap_own_preferences(&remap);
    let children = variable.children.clone();

    for child in children {
        let variable = net.require_mut(child)?;
        if let Some(position) = variable.parent_position(id) {
            variable.cpt.remap_child_dimension(position, &remap);
        }
    }
    Ok(true)
}

/// Makes `parent` a parent of `child`.
///
/// The parent is placed among `child`'s parents in stable name order and
/// `child`'s CPT gains a dimension at that position, every existing leaf
/// copied across the parent's domain. A link that would exceed
/// `policy.max_in_degree`, or close a cycle while `policy.allow_cycles` is
/// off, is refused and leaves the net unchanged. So is a link from a
/// detached parent to a member child, which the document format could not
/// express.
///
/// # Citations
/// - Cycle detection by depth-first search: Tarjan, "Depth-first search and linear graph algorithms" (1972)
pub fn link(
    net: &mut CpNet,
    parent: VariableId,
    child: VariableId,
    policy: &LinkPolicy,
) -> Result<LinkOutcome, NetError> {
    let source = net.require(parent)?;
    let parent_name = source.name.clone();
    let size = source.domain.len();
    let target = net.require(child)?;
    if target.has_parent(parent) {
        return Ok(LinkOutcome::AlreadyLinked);
    }
    if net.is_member(child) && !net.is_member(parent) {
        return Err(LinkError::DetachedParent(parent_name).into());
    }
    if let Some(limit) = policy.max_in_degree {
        if target.parents.len() >= limit {
            return Err(LinkError::TooManyParents { limit }.into());
        }
    }
    let position = sorted_position(net, &target.parents, &parent_name);

    net.require_mut(child)?.parents.insert(position, parent);
    if !policy.allow_cycles && net.is_cyclic(parent) {
        net.require_mut(child)?.parents.remove(position);
        debug!(parent = %parent_name, "link refused: cycle");
        return Err(LinkError::CyclesNotAllowed.into());
    }
    net.require_mut(parent)?.children.push(child);
    let target = net.require_mut(child)?;
    target.cpt.insert_parent_dimension(position, size);
    debug!(
        parent = %parent_name,
        child = %target.name,
        position,
        size,
        "link"
    );
    Ok(LinkOutcome::Linked)
}

/// [`link`] under the net's configured policy.
pub fn link_with_config(
    net: &mut CpNet,
    parent: VariableId,
    child: VariableId,
) -> Result<LinkOutcome, NetError> {
    let policy = net.config().link;
    link(net, parent, child, &policy)
}

/// Removes the `parent -> child` relation.
///
/// `child`'s CPT loses the parent's dimension and keeps only the leaves
/// stored under the parent's first value; the rest are discarded. Returns
/// `false` if the pair was not linked.
pub fn unlink(net: &mut CpNet, parent: VariableId, child: VariableId) -> Result<bool, NetError> {
    net.require(parent)?;
    let target = net.require_mut(child)?;
    let Some(position) = target.parent_position(parent) else {
        return Ok(false);
    };
    target.parents.remove(position);
    target.cpt.remove_parent_dimension(position);
    debug!(child = %target.name, position, "unlink");
    let source = net.require_mut(parent)?;
    if let Some(slot) = source.children.iter().position(|&c| c == child) {
        source.children.remove(slot);
    }
    Ok(true)
}

/// Unlinks a variable from every neighbour, removes it from the net and
/// frees its slot. Children collapse their CPTs as with [`unlink`].
pub fn destroy(net: &mut CpNet, id: VariableId) -> Result<Variable, NetError> {
    let variable = net.require(id)?;
    let children = variable.children.clone();
    let parents = variable.parents.clone();
    debug!(name = %variable.name, "destroy variable");
    for child in children {
        unlink(net, id, child)?;
    }
    for parent in parents {
        unlink(net, parent, id)?;
    }
    net.deallocate(id).ok_or(NetError::UnknownVariable(id))
}

/// Leaf for `condition` of variable `id`.
pub fn preference<'a>(
    net: &'a CpNet,
    id: VariableId,
    condition: &[usize],
) -> Result<&'a Preference, NetError> {
    Ok(net.require(id)?.cpt.get_leaf(condition)?)
}

/// Stores `leaf` under `condition` of variable `id`.
///
/// The leaf must rank every value of the variable's domain exactly once.
pub fn set_preference(
    net: &mut CpNet,
    id: VariableId,
    condition: &[usize],
    leaf: Preference,
) -> Result<(), NetError> {
    let variable = net.require_mut(id)?;
    leaf.validate(variable.domain.len())?;
    variable.cpt.set_leaf(condition, leaf)?;
    Ok(())
}

/// Returns `true` if `id` lies on a directed cycle.
pub fn is_cyclic(net: &CpNet, id: VariableId) -> bool {
    net.is_cyclic(id)
}

/// Returns `true` if any member of the net lies on a directed cycle.
pub fn has_cycle(net: &CpNet) -> bool {
    net.has_cycle()
}
