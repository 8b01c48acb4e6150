//! Structural fingerprints of CP-nets.
//!
//! A fingerprint covers exactly what the document format preserves (member
//! order, names, domains, parent lists by name, and every leaf) so it is
//! stable across an encode/decode round trip and across arena slot reuse.
//! [`SaveState`] uses it to answer "has the net changed since it was saved".
//!
//! # Citations
//! - SHA-256: NIST FIPS 180-4 (2015)
//! - Domain separation & length prefixing: Bernstein et al., "How to hash into elliptic curves" (2009)

use crate::core::CpNet;
use crate::variable::Variable;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 256-bit hash value.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HashValue(pub [u8; 32]);

impl HashValue {
    #[inline]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// SHA-256 of `b"CPN:" || domain || b":v1" || len(data) as u64 LE || data`.
    pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"CPN:");
        hasher.update(domain);
        hasher.update(b":v1");
        hasher.update((data.len() as u64).to_le_bytes());
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Lowercase hex of all 32 bytes.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HashValue({:02x}{:02x}{:02x}{:02x}…)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

fn push_bytes(data: &mut Vec<u8>, bytes: &[u8]) {
    data.extend_from_slice(&(bytes.len() as u64).to_le_bytes());
    data.extend_from_slice(bytes);
}

/// Hash of one variable's own content and its parents' names.
pub fn variable_hash(net: &CpNet, variable: &Variable) -> HashValue {
    let mut data = Vec::new();
    push_bytes(&mut data, variable.name().as_bytes());

    data.extend_from_slice(&(variable.domain().len() as u64).to_le_bytes());
    for value in variable.domain().values() {
        push_bytes(&mut data, value.as_bytes());
    }

    data.extend_from_slice(&(variable.parents().len() as u64).to_le_bytes());
    for &parent in variable.parents() {
        push_bytes(&mut data, net.name_of(parent).unwrap_or_default().as_bytes());
    }

    data.extend_from_slice(&(variable.cpt_len() as u64).to_le_bytes());
    for leaf in variable.cpt().leaves() {
        let raw = leaf.to_raw();
        data.extend_from_slice(&(raw.len() as u64).to_le_bytes());
        for item in raw {
            data.extend_from_slice(&item.to_le_bytes());
        }
    }
    HashValue::hash_with_domain(b"VARIABLE", &data)
}

/// Fingerprint of the whole net, members in net order.
///
/// Detached variables only contribute through the parent names of members.
pub fn net_fingerprint(net: &CpNet) -> HashValue {
    let mut data = Vec::new();
    data.extend_from_slice(&(net.len() as u64).to_le_bytes());
    for (_, variable) in net.variables() {
        data.extend_from_slice(variable_hash(net, variable).as_bytes());
    }
    HashValue::hash_with_domain(b"NET_FINGERPRINT", &data)
}

/// Tracks whether a net still matches its last saved form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    saved: Option<HashValue>,
}

impl SaveState {
    /// Nothing saved yet; every net counts as unsaved.
    pub fn new() -> Self {
        Self::default()
    }

    /// State in which `net` is the saved form.
    pub fn saved(net: &CpNet) -> Self {
        Self {
            saved: Some(net_fingerprint(net)),
        }
    }

    /// Records `net` as saved.
    pub fn mark_saved(&mut self, net: &CpNet) {
        let fingerprint = net_fingerprint(net);
        tracing::debug!(%fingerprint, "marked saved");
        self.saved = Some(fingerprint);
    }

    /// Forgets the saved form.
    pub fn mark_unsaved(&mut self) {
        self.saved = None;
    }

    /// Returns `true` if `net` matches the saved form.
    pub fn is_saved(&self, net: &CpNet) -> bool {
        self.saved == Some(net_fingerprint(net))
    }

    #[inline]
    pub fn fingerprint(&self) -> Option<HashValue> {
        self.saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkPolicy;
    use crate::operations::{destroy, insert_variable, link, rename, set_preference};
    use crate::preference::Preference;

    fn pair() -> CpNet {
        let mut net = CpNet::new();
        let a = insert_variable(&mut net, "A", ["x", "y"]).unwrap();
        let b = insert_variable(&mut net, "B", ["x", "y"]).unwrap();
        link(&mut net, a, b, &LinkPolicy::acyclic()).unwrap();
        net
    }

    #[test]
    fn deterministic_and_id_insensitive() {
        assert_eq!(net_fingerprint(&pair()), net_fingerprint(&pair()));

        // same content, different slots
        let mut net = CpNet::new();
        let scratch = insert_variable(&mut net, "scratch", ["q"]).unwrap();
        let a = insert_variable(&mut net, "A", ["x", "y"]).unwrap();
        destroy(&mut net, scratch).unwrap();
        let b = insert_variable(&mut net, "B", ["x", "y"]).unwrap();
        link(&mut net, a, b, &LinkPolicy::acyclic()).unwrap();
        assert_eq!(net_fingerprint(&net), net_fingerprint(&pair()));
    }

    #[test]
    fn save_state_tracks_edits() {
        let mut net = pair();
        let mut state = SaveState::new();
        assert!(!state.is_saved(&net));
        state.mark_saved(&net);
        assert!(state.is_saved(&net));

        let b = net.find("B").unwrap();
        set_preference(&mut net, b, &[1], Preference::strict([1, 0])).unwrap();
        assert!(!state.is_saved(&net));
        set_preference(&mut net, b, &[1], Preference::strict([0, 1])).unwrap();
        assert!(state.is_saved(&net));

        rename(&mut net, b, "C").unwrap();
        assert!(!state.is_saved(&net));
        state.mark_unsaved();
        assert_eq!(state.fingerprint(), None);
    }

    #[test]
    fn hex_is_full_width() {
        let hash = HashValue::hash_with_domain(b"TEST", b"");
        assert_eq!(hash.to_hex().len(), 64);
        assert!(hash.to_string().starts_with("HashValue("));
    }
}
