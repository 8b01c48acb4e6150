use super::element_text;
use crate::arena::VariableId;
use crate::config::{LinkPolicy, NetConfig};
use crate::core::CpNet;
use crate::error::{CodecError, DecodeIssue};
use crate::operations::{insert_variable, link, set_preference};
use crate::preference::Preference;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

#[derive(Parser)]
#[grammar = "codec/prefspec.pest"]
struct PrefSpecParser;

/// A decoded net together with every element that had to be skipped.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub net: CpNet,
    pub issues: Vec<DecodeIssue>,
}

impl Decoded {
    /// Returns `true` if nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

fn text_of(pair: Pair<'_, Rule>) -> String {
    pair.into_inner()
        .find(|p| p.as_rule() == Rule::text)
        .map(|p| element_text(p.as_str()))
        .unwrap_or_default()
}

/// Builds a net from a preference-specification document.
///
/// Variables are read first, then statements. A bad element (missing name,
/// duplicate, unknown value, broken chain, ...) is skipped and reported in
/// [`Decoded::issues`]; only a document that does not parse at all is an
/// error. Conditions link their parents with cycles allowed and no degree
/// limit. Attributes on known elements are ignored and reported.
pub fn decode(source: &str) -> Result<Decoded, CodecError> {
    if source.trim().is_empty() {
        return Err(CodecError::Empty);
    }
    let document = PrefSpecParser::parse(Rule::document, source)
        .map_err(|e| CodecError::Syntax(e.to_string()))?
        .next()
        .ok_or(CodecError::Empty)?;
    let Some(root) = document
        .into_inner()
        .find(|p| p.as_rule() == Rule::specification)
    else {
        return Err(CodecError::Empty);
    };

    let mut builder = Builder {
        net: CpNet::with_config(NetConfig::default()),
        names: HashMap::new(),
        issues: Vec::new(),
    };
    builder.check_attributes(&root);
    let items: Vec<Pair<'_, Rule>> = root.into_inner().collect();
    let mut variable_index = 0;
    for item in &items {
        if item.as_rule() == Rule::variable {
            builder.variable(variable_index, item.clone());
            variable_index += 1;
        }
    }
    for item in &items {
        match item.as_rule() {
            Rule::statement => builder.statement(item.clone()),
            Rule::variable | Rule::specification_open => {}
            rule => trace!(?rule, "skipping element"),
        }
    }

    debug!(
        variables = builder.net.len(),
        issues = builder.issues.len(),
        "decoded net"
    );
    Ok(Decoded {
        net: builder.net,
        issues: builder.issues,
    })
}

struct Builder {
    net: CpNet,
    names: HashMap<String, VariableId>,
    issues: Vec<DecodeIssue>,
}

impl Builder {
    fn report(&mut self, issue: DecodeIssue) {
        warn!(%issue, "skipping element");
        self.issues.push(issue);
    }

    /// Reports an element whose opening tag carries attributes.
    fn check_attributes(&mut self, pair: &Pair<'_, Rule>) {
        let Some(open) = pair.clone().into_inner().next() else {
            return;
        };
        if open
            .clone()
            .into_inner()
            .flatten()
            .any(|p| p.as_rule() == Rule::attribute)
        {
            let element = open
                .as_str()
                .trim_start_matches('<')
                .split(|c: char| c.is_whitespace() || c == '>')
                .next()
                .unwrap_or_default()
                .to_string();
            self.report(DecodeIssue::IgnoredAttributes { element });
        }
    }

    fn variable(&mut self, index: usize, pair: Pair<'_, Rule>) {
        self.check_attributes(&pair);
        let mut name = None;
        let mut values = Vec::new();
        for child in pair.into_inner() {
            if matches!(child.as_rule(), Rule::variable_name | Rule::domain_value) {
                self.check_attributes(&child);
            }
            match child.as_rule() {
                Rule::variable_name if name.is_none() => name = Some(text_of(child)),
                Rule::domain_value => values.push(text_of(child)),
                _ => {}
            }
        }
        let Some(name) = name else {
            return self.report(DecodeIssue::MissingName { index });
        };
        if self.names.contains_key(&name) {
            return self.report(DecodeIssue::DuplicateName(name));
        }
        if values.is_empty() {
            return self.report(DecodeIssue::NoDomain(name));
        }
        match insert_variable(&mut self.net, &name, &values) {
            Ok(id) => {
                self.names.insert(name, id);
            }
            Err(error) => self.report(DecodeIssue::InvalidVariable { name, error }),
        }
    }

    fn statement(&mut self, pair: Pair<'_, Rule>) {
        self.check_attributes(&pair);
        let mut id = None;
        let mut affected = None;
        let mut conditions = Vec::new();
        let mut segments = Vec::new();
        for child in pair.into_inner() {
            if matches!(
                child.as_rule(),
                Rule::statement_id | Rule::affected | Rule::condition | Rule::preference
            ) {
                self.check_attributes(&child);
            }
            match child.as_rule() {
                Rule::statement_id if id.is_none() => id = Some(text_of(child)),
                Rule::affected if affected.is_none() => affected = Some(text_of(child)),
                Rule::condition => conditions.push(text_of(child)),
                Rule::preference => segments.push(text_of(child)),
                _ => {}
            }
        }
        let statement = id.unwrap_or_else(|| "unknown".to_string());
        if let Err(issue) = self.apply(&statement, affected, &conditions, &segments) {
            self.report(issue);
        }
    }

    fn apply(
        &mut self,
        statement: &str,
        affected: Option<String>,
        conditions: &[String],
        segments: &[String],
    ) -> Result<(), DecodeIssue> {
        let statement = statement.to_string();
        let name = affected.ok_or_else(|| DecodeIssue::MissingAffected {
            statement: statement.clone(),
        })?;
        let target = *self
            .names
            .get(&name)
            .ok_or_else(|| DecodeIssue::UnknownAffected {
                statement: statement.clone(),
                name: name.clone(),
            })?;
        let order = chain(&statement, segments)?;

        let domain = self
            .net
            .require(target)
            .map_err(|error| DecodeIssue::Rejected {
                statement: statement.clone(),
                error,
            })?
            .domain();
        let mut ranking = Vec::with_capacity(order.len());
        for value in &order {
            let index = domain
                .index_of(value)
                .ok_or_else(|| DecodeIssue::UnknownValue {
                    statement: statement.clone(),
                    value: value.clone(),
                })?;
            ranking.push(index);
        }
        let leaf = Preference::strict(ranking);
        leaf.validate(domain.len())
            .map_err(|error| DecodeIssue::Rejected {
                statement: statement.clone(),
                error: error.into(),
            })?;

        let mut assignments = Vec::with_capacity(conditions.len());
        for (index, text) in conditions.iter().enumerate() {
            let parts: Vec<&str> = text.split('=').collect();
            let [parent, value] = parts[..] else {
                return Err(DecodeIssue::ConditionSyntax {
                    statement,
                    index,
                });
            };
            let parent = *self
                .names
                .get(parent)
                .ok_or_else(|| DecodeIssue::UnknownConditionVariable {
                    statement: statement.clone(),
                    index,
                })?;
            let value = self
                .net
                .variable(parent)
                .and_then(|v| v.domain().index_of(value))
                .ok_or_else(|| DecodeIssue::UnknownConditionValue {
                    statement: statement.clone(),
                    index,
                })?;
            assignments.push((index, parent, value));
        }

        let target_parents = self.net.variable(target).map(|v| v.parents()).unwrap_or_default();
        if target_parents
            .iter()
            .any(|p| !assignments.iter().any(|&(_, parent, _)| parent == *p))
        {
            return Err(DecodeIssue::IncompleteCondition { statement });
        }

        for &(index, parent, _) in &assignments {
            link(&mut self.net, parent, target, &LinkPolicy::permissive()).map_err(|error| {
                DecodeIssue::Unlinkable {
                    statement: statement.clone(),
                    index,
                    error,
                }
            })?;
        }

        let variable = self.net.require(target).map_err(|error| DecodeIssue::Rejected {
            statement: statement.clone(),
            error,
        })?;
        let mut slots = vec![None; variable.parents().len()];
        for &(_, parent, value) in &assignments {
            if let Some(position) = variable.parent_position(parent) {
                slots[position] = Some(value);
            }
        }
        let condition: Option<Vec<usize>> = slots.into_iter().collect();
        let condition = condition.ok_or_else(|| DecodeIssue::IncompleteCondition {
            statement: statement.clone(),
        })?;

        set_preference(&mut self.net, target, &condition, leaf)
            .map_err(|error| DecodeIssue::Rejected { statement, error })
    }
}

/// Joins `a:b` segments into one order. A lone segment without `:` names a
/// single-value ranking and must be the only segment.
fn chain(statement: &str, segments: &[String]) -> Result<Vec<String>, DecodeIssue> {
    let statement = statement.to_string();
    if segments.is_empty() {
        return Err(DecodeIssue::NoPreference { statement });
    }
    let mut order: Vec<String> = Vec::with_capacity(segments.len() + 1);
    for (index, segment) in segments.iter().enumerate() {
        let parts: Vec<&str> = segment.split(':').collect();
        match parts[..] {
            [single] => {
                if segments.len() != 1 {
                    return Err(DecodeIssue::InvalidSingleValue { statement });
                }
                order.push(single.to_string());
            }
            [better, worse] => {
                match order.last() {
                    None => order.push(better.to_string()),
                    Some(last) if last == better => {}
                    Some(_) => return Err(DecodeIssue::BrokenChain { statement }),
                }
                order.push(worse.to_string());
            }
            _ => return Err(DecodeIssue::PreferenceSyntax { statement, index }),
        }
    }
    Ok(order)
}
