//! Error types for CP-net operations.
//!
//! Every expected failure is returned, never panicked: structural refusals
//! (`LinkError`) leave the net exactly as it was before the call.

use crate::arena::VariableId;
use thiserror::Error;

/// Rejected variable name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Empty or whitespace-only name.
    #[error("variable name is blank")]
    Blank,
    /// Another variable in the net already uses this name.
    #[error("a variable named '{0}' already exists")]
    Duplicate(String),
}

/// Out-of-contract CPT addressing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CptError {
    /// The condition does not supply one index per parent.
    #[error("condition has {actual} indices but the table has {expected} parents")]
    ConditionArity { expected: usize, actual: usize },
    /// A condition index exceeds its parent's domain.
    #[error("condition index {index} is out of range for dimension {dimension} of size {size}")]
    ConditionOutOfRange {
        dimension: usize,
        index: usize,
        size: usize,
    },
}

/// Malformed preference leaf.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreferenceError {
    /// A leaf must rank at least one value.
    #[error("preference is empty")]
    Empty,
    /// Raw encoding is not `[index, tie, index, ..., index]`.
    #[error("raw preference must alternate value indices and tie flags")]
    Malformed,
    /// A ranked value does not exist in the domain.
    #[error("value index {index} is outside a domain of {domain_len} values")]
    ValueOutOfRange { index: usize, domain_len: usize },
    /// Some domain value is ranked twice or not at all.
    #[error("preference does not rank every domain value exactly once")]
    NotAPermutation,
}

/// Structural refusal while linking two variables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The link would close a cycle and the policy forbids cycles.
    #[error("cycles not allowed")]
    CyclesNotAllowed,
    /// The child already has the maximum number of parents.
    #[error("too many parents (limit {limit})")]
    TooManyParents { limit: usize },
    /// A member would depend on a variable outside the net.
    #[error("parent `{0}` is not a member of the net")]
    DetachedParent(String),
}

/// Any failure of a net-level operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetError {
    #[error("unknown variable {0}")]
    UnknownVariable(VariableId),
    #[error(transparent)]
    Name(#[from] NameError),
    #[error(transparent)]
    Cpt(#[from] CptError),
    #[error(transparent)]
    Preference(#[from] PreferenceError),
    #[error(transparent)]
    Link(#[from] LinkError),
}

/// Unrecoverable preference-specification document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("document is empty")]
    Empty,
    #[error("document is not well formed: {0}")]
    Syntax(String),
}

/// A document element skipped while decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeIssue {
    #[error("PREFERENCE-VARIABLE {index} has no VARIABLE-NAME")]
    MissingName { index: usize },
    #[error("PREFERENCE-VARIABLE '{0}' has a duplicate name")]
    DuplicateName(String),
    #[error("PREFERENCE-VARIABLE '{0}' has no DOMAIN-VALUEs")]
    NoDomain(String),
    #[error("PREFERENCE-VARIABLE '{name}' was rejected: {error}")]
    InvalidVariable { name: String, error: NetError },
    #[error("PREFERENCE-STATEMENT {statement} names no PREFERENCE-VARIABLE")]
    MissingAffected { statement: String },
    #[error("PREFERENCE-STATEMENT {statement} affects unknown variable '{name}'")]
    UnknownAffected { statement: String, name: String },
    #[error("PREFERENCE-STATEMENT {statement} does not specify any preference")]
    NoPreference { statement: String },
    #[error("PREFERENCE-STATEMENT {statement} has an invalid single-value preference")]
    InvalidSingleValue { statement: String },
    #[error("PREFERENCE-STATEMENT {statement} has segments that do not chain")]
    BrokenChain { statement: String },
    #[error("invalid syntax on PREFERENCE {index} of PREFERENCE-STATEMENT {statement}")]
    PreferenceSyntax { statement: String, index: usize },
    #[error("PREFERENCE-STATEMENT {statement} has an unknown preference value '{value}'")]
    UnknownValue { statement: String, value: String },
    #[error("invalid syntax on CONDITION {index} of PREFERENCE-STATEMENT {statement}")]
    ConditionSyntax { statement: String, index: usize },
    #[error("unknown variable on CONDITION {index} of PREFERENCE-STATEMENT {statement}")]
    UnknownConditionVariable { statement: String, index: usize },
    #[error("unknown value on CONDITION {index} of PREFERENCE-STATEMENT {statement}")]
    UnknownConditionValue { statement: String, index: usize },
    #[error("cannot link CONDITION {index} of PREFERENCE-STATEMENT {statement}: {error}")]
    Unlinkable {
        statement: String,
        index: usize,
        error: NetError,
    },
    #[error("conditions of PREFERENCE-STATEMENT {statement} do not cover every parent")]
    IncompleteCondition { statement: String },
    #[error("PREFERENCE-STATEMENT {statement} was rejected: {error}")]
    Rejected { statement: String, error: NetError },
    #[error("attributes on {element} were ignored")]
    IgnoredAttributes { element: String },
}

/// Invalid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Failure while encoding or restoring a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot encoding failed: {0}")]
    Cbor(#[from] serde_cbor::Error),
    #[error("snapshot file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot of '{0}' does not match its table shape")]
    Shape(String),
    #[error("snapshot references unknown variable '{0}'")]
    UnknownVariable(String),
    #[error(transparent)]
    Net(#[from] NetError),
}
