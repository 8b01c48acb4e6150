//! CBOR checkpoints of a net.
//!
//! Unlike the document format a snapshot keeps weak relations, exclusions
//! and the net's configuration. Parents are stored by name, so only
//! members are captured and restoring needs every parent to be a member.

use crate::config::{LinkPolicy, NetConfig};
use crate::core::CpNet;
use crate::error::SnapshotError;
use crate::operations::{insert_variable, link, set_preference};
use crate::preference::Preference;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// One member variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSnapshot {
    pub name: String,
    pub domain: Vec<String>,
    /// Parent names in dimension order.
    pub parents: Vec<String>,
    /// Leaves in enumeration order.
    pub leaves: Vec<Preference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetSnapshot {
    pub config: NetConfig,
    pub variables: Vec<VariableSnapshot>,
}

impl NetSnapshot {
    /// Captures every member of `net`.
    pub fn capture(net: &CpNet) -> Self {
        let variables = net
            .variables()
            .map(|(_, variable)| VariableSnapshot {
                name: variable.name().to_string(),
                domain: variable.domain().values().to_vec(),
                parents: variable
                    .parents()
                    .iter()
                    .map(|&p| net.name_of(p).unwrap_or_default().to_string())
                    .collect(),
                leaves: variable.cpt().leaves().to_vec(),
            })
            .collect();
        Self {
            config: *net.config(),
            variables,
        }
    }

    /// Rebuilds a net from the snapshot.
    pub fn restore(&self) -> Result<CpNet, SnapshotError> {
        let mut net = CpNet::with_config(self.config);
        let mut ids = HashMap::with_capacity(self.variables.len());
        for variable in &self.variables {
            let id = insert_variable(&mut net, &variable.name, &variable.domain)?;
            ids.insert(variable.name.as_str(), id);
        }
        for variable in &self.variables {
            let child = ids[variable.name.as_str()];
            for parent in &variable.parents {
                let parent = *ids
                    .get(parent.as_str())
                    .ok_or_else(|| SnapshotError::UnknownVariable(parent.clone()))?;
                link(&mut net, parent, child, &LinkPolicy::permissive())?;
            }
        }
        for variable in &self.variables {
            let id = ids[variable.name.as_str()];
            let conditions: Vec<Vec<usize>> = {
                let restored = net.require(id)?;
                if restored.cpt_len() != variable.leaves.len() {
                    return Err(SnapshotError::Shape(variable.name.clone()));
                }
                (0..restored.cpt_len())
                    .map(|offset| restored.cpt().condition_at(offset))
                    .collect()
            };
            for (condition, leaf) in conditions.iter().zip(&variable.leaves) {
                set_preference(&mut net, id, condition, leaf.clone())?;
            }
        }
        tracing::debug!(variables = net.len(), "restored snapshot");
        Ok(net)
    }

    pub fn to_cbor(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(serde_cbor::to_vec(self)?)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Ok(serde_cbor::from_slice(bytes)?)
    }

    /// Writes the CBOR encoding to `path`.
    pub fn save_to_file(&self, path: &Path) -> Result<(), SnapshotError> {
        std::fs::write(path, self.to_cbor()?)?;
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, SnapshotError> {
        Self::from_cbor(&std::fs::read(path)?)
    }
}
