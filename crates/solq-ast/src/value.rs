use std::borrow::Cow;

use serde_json::Value;

use crate::{
    node::NodeId,
    tree::{Ast, NodeRef},
};

pub mod attr_keys {
    pub const ABSOLUTE_PATH: &str = "absolutePath";
    pub const BODY: &str = "body";
    pub const NAME: &str = "name";
    pub const NODES: &str = "nodes";
    pub const NODE_TYPE: &str = "nodeType";
    pub const SRC: &str = "src";
    pub const STATEMENTS: &str = "statements";
    pub const TYPE: &str = "type";
    pub const VALUE: &str = "value";

    // Lookup-only keys resolved from node metadata rather than stored attributes.
    pub const BASE_NODE_TYPE: &str = "baseNodeType";
    pub const CATEGORY: &str = "category";
    pub const DEPTH: &str = "depth";
    pub const NODE_TYPE_ALIAS: &str = "node_type";
}

/// Node type of the statement-block wrapper that gets flattened into its statement list.
pub(crate) const BLOCK: &str = "Block";

/// A stored attribute value.
///
/// `Json` holds scalars, null, and objects or nested lists that carry no
/// `nodeType`; those are kept exactly as the compiler emitted them.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Node(NodeId),
    List(Vec<AttrValue>),
    Json(Value),
}

impl AttrValue {
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            AttrValue::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            AttrValue::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(Value::as_str)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Json(Value::Null))
    }
}

/// A list attribute viewed through the tree that owns its nodes.
#[derive(Debug, Clone, Copy)]
pub struct ListRef<'a> {
    pub(crate) ast: &'a Ast,
    pub(crate) items: &'a [AttrValue],
}

impl<'a> ListRef<'a> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<FieldRef<'a>> {
        self.items
            .get(index)
            .map(|item| FieldRef::from_attr(self.ast, item))
    }

    pub fn iter(self) -> impl Iterator<Item = FieldRef<'a>> + 'a {
        let ast = self.ast;
        self.items.iter().map(move |item| FieldRef::from_attr(ast, item))
    }

    /// Iterates over the list items that are tree nodes, skipping scalars.
    pub fn nodes(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let ast = self.ast;
        self.items
            .iter()
            .filter_map(move |item| item.as_node().map(|id| ast.node(id)))
    }
}

/// The result of looking up a field on a node.
#[derive(Debug, Clone)]
pub enum FieldRef<'a> {
    Node(NodeRef<'a>),
    List(ListRef<'a>),
    Value(Cow<'a, Value>),
}

impl<'a> FieldRef<'a> {
    pub(crate) fn from_attr(ast: &'a Ast, value: &'a AttrValue) -> Self {
        match value {
            AttrValue::Node(id) => FieldRef::Node(ast.node(*id)),
            AttrValue::List(items) => FieldRef::List(ListRef { ast, items }),
            AttrValue::Json(value) => FieldRef::Value(Cow::Borrowed(value)),
        }
    }

    pub fn as_node(&self) -> Option<NodeRef<'a>> {
        match self {
            FieldRef::Node(node) => Some(*node),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<ListRef<'a>> {
        match self {
            FieldRef::List(list) => Some(*list),
            _ => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            FieldRef::Value(value) => Some(value.as_ref()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Resolves one step of a dotted path below this field.
    pub(crate) fn step(self, segment: &str) -> Option<FieldRef<'a>> {
        match self {
            FieldRef::Node(node) => node.field(segment),
            FieldRef::List(list) => segment.parse::<usize>().ok().and_then(|index| list.get(index)),
            FieldRef::Value(Cow::Borrowed(value)) => match value {
                Value::Object(map) => map.get(segment).map(|v| FieldRef::Value(Cow::Borrowed(v))),
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index))
                    .map(|v| FieldRef::Value(Cow::Borrowed(v))),
                _ => None,
            },
            FieldRef::Value(Cow::Owned(_)) => None,
        }
    }

    /// Equality against a filter value. Tree nodes never equal a plain value.
    pub fn matches(&self, expected: &Value) -> bool {
        match self {
            FieldRef::Value(value) => value.as_ref() == expected,
            FieldRef::List(list) => match expected {
                Value::Array(expected) => {
                    list.len() == expected.len()
                        && list.iter().zip(expected).all(|(item, e)| item.matches(e))
                }
                _ => false,
            },
            FieldRef::Node(_) => false,
        }
    }
}
