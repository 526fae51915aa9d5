//! Generic labeled-tree adapter over a parsed requirement document.
//!
//! The compiler's contract begins at the tree: an external parser (XML or
//! otherwise) produces a `ConditionTree`, and everything above this module
//! only reads names, attributes and children. The tree also derives
//! `Deserialize` so documents can be supplied as JSON, which is what the demo
//! binary and the tests use.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// Attribute present but its text failed to coerce to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("attribute `{name}` has value `{value}` which is not a valid {expected}")]
pub struct AttributeTypeError {
    pub name: String,
    pub value: String,
    pub expected: &'static str,
}

/// One child of an element: either a nested element or a text fragment.
/// Text fragments are always leaves.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NodeContent {
    Text(String),
    Element(ConditionTree),
}

/// A labeled tree node: element name, unique-keyed string attributes, and
/// ordered children. Constructed once per document, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConditionTree {
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<NodeContent>,
}

impl ConditionTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter, used to assemble documents in code.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: ConditionTree) -> Self {
        self.children.push(NodeContent::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(NodeContent::Text(text.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw attribute lookup, `None` when absent.
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Typed attribute lookup with a default. The default is returned when
    /// the attribute is absent; a present-but-unparseable value is an error,
    /// never silently defaulted.
    pub fn attr<T: FromStr>(&self, name: &str, default: T) -> Result<T, AttributeTypeError> {
        match self.attributes.get(name) {
            Some(raw) => raw.parse().map_err(|_| AttributeTypeError {
                name: name.to_string(),
                value: raw.clone(),
                expected: std::any::type_name::<T>(),
            }),
            None => Ok(default),
        }
    }

    /// Element children in document order, skipping text fragments.
    /// Restartable: iterating borrows, it never consumes the tree.
    pub fn elements(&self) -> impl Iterator<Item = &ConditionTree> {
        self.children.iter().filter_map(|child| match child {
            NodeContent::Element(el) => Some(el),
            NodeContent::Text(_) => None,
        })
    }

    /// Concatenated text of all descendant fragments in document order,
    /// markup stripped.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                NodeContent::Text(fragment) => out.push_str(fragment),
                NodeContent::Element(el) => el.collect_text(out),
            }
        }
    }

    /// Depth-first pre-order traversal over element nodes.
    pub fn visit(&self, visitor: &mut dyn FnMut(&ConditionTree)) {
        visitor(self);
        for child in self.elements() {
            child.visit(visitor);
        }
    }
}
