//! Structured plan description of a compiled expression tree.

use crate::index::IndexPlan;
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

///
/// ExplainNode
///
/// One node of a plan description: the node kind, its scalar attributes
/// and its children in evaluation order.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ExplainNode {
    pub name: String,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Self>,
}

impl ExplainNode {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn attr(mut self, key: &str, value: impl fmt::Display) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}{}", "", self.name, indent = depth * 2)?;
        for (key, value) in &self.attributes {
            write!(f, " {key}={value}")?;
        }
        writeln!(f)?;

        for child in &self.children {
            child.write_indented(f, depth + 1)?;
        }

        Ok(())
    }
}

impl fmt::Display for ExplainNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

///
/// ExplainPlan
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ExplainPlan {
    pub root: ExplainNode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexPlan>,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_indented_tree() {
        let node = ExplainNode::new("And")
            .child(ExplainNode::new("Pos").attr("min", 2).attr("max", 3))
            .child(ExplainNode::new("VarRef").attr("name", "x"));

        assert_eq!(node.to_string(), "And\n  Pos max=3 min=2\n  VarRef name=x\n");
    }

    #[test]
    fn attributes_are_ordered_by_key() {
        let node = ExplainNode::new("Cast").attr("type", "xs:double").attr("a", 1);
        let keys: Vec<_> = node.attributes.keys().map(String::as_str).collect();

        assert_eq!(keys, ["a", "type"]);
    }
}
