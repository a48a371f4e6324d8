use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::{
    arena::Arena,
    error::{AstError, Result, json_kind},
    grammar::category_of,
    location::Location,
    node::{Node, NodeId},
    tree::Ast,
    value::{AttrValue, BLOCK, attr_keys},
};

/// Outcome of building one JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Built {
    Node(NodeId),
    /// Anything that is not an object tagged with `nodeType`, returned as is.
    Value(Value),
}

/// Builds tree nodes from compiler JSON into a single arena.
///
/// Before a node is created its fields are normalized:
///
/// - `body` is stored as `nodes` (a `body` wins over an existing `nodes`)
/// - a field holding a `Block` object is replaced by the block's `statements`
/// - a missing or null `nodes` becomes an empty list
/// - a `nodes` holding a single node becomes a one-element list
#[derive(Debug, Default)]
pub struct Builder {
    nodes: Arena<Node>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds `raw` and everything nested below it, attaching the result to
    /// `parent`.
    pub fn build(&mut self, raw: &Value, parent: Option<NodeId>) -> Result<Built> {
        let Value::Object(map) = raw else {
            return Ok(Built::Value(raw.clone()));
        };

        match map.get(attr_keys::NODE_TYPE) {
            None => Ok(Built::Value(raw.clone())),
            Some(Value::String(node_type)) => {
                self.build_node(node_type, map, parent).map(Built::Node)
            }
            Some(other) => Err(AstError::malformed(
                attr_keys::NODE_TYPE,
                format!("expected a string, found {}", json_kind(other)),
            )),
        }
    }

    /// Builds a whole tree whose root is `raw`.
    pub fn build_tree(mut self, raw: &Value) -> Result<Ast> {
        match self.build(raw, None)? {
            Built::Node(root) => Ok(self.finish(root)),
            Built::Value(value) => Err(AstError::malformed(
                "<root>",
                format!(
                    "expected an object with a `nodeType`, found {}",
                    json_kind(&value)
                ),
            )),
        }
    }

    /// Seals the arena into an [`Ast`] rooted at `root`.
    pub fn finish(self, root: NodeId) -> Ast {
        Ast {
            nodes: self.nodes,
            root,
        }
    }

    fn build_node(
        &mut self,
        node_type: &str,
        raw: &Map<String, Value>,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let src = match raw.get(attr_keys::SRC) {
            Some(Value::String(src)) => src,
            Some(other) => {
                return Err(AstError::malformed(
                    node_type,
                    format!("`src` must be a string, found {}", json_kind(other)),
                ));
            }
            None => return Err(AstError::malformed(node_type, "missing `src`")),
        };
        let location = Location::parse(node_type, src)?;
        let depth = parent.map_or(0, |parent| self.nodes[parent].depth + 1);

        let id = self.nodes.alloc(Node {
            node_type: node_type.into(),
            category: category_of(node_type),
            depth,
            location,
            parent,
            attributes: BTreeMap::new(),
            adjacent: Vec::new(),
        });
        tracing::trace!(node_type, depth, src = src.as_str(), "Built node");

        let has_body = raw.contains_key(attr_keys::BODY);
        for (key, value) in raw {
            let key = match key.as_str() {
                attr_keys::BODY => attr_keys::NODES,
                attr_keys::NODES if has_body => continue,
                key => key,
            };
            let value = self.build_field(key, value, id)?;
            self.nodes[id].attributes.insert(key.into(), value);
        }

        Ok(id)
    }

    fn build_field(&mut self, key: &str, value: &Value, owner: NodeId) -> Result<AttrValue> {
        let built = match value {
            Value::Object(map)
                if map.get(attr_keys::NODE_TYPE).and_then(Value::as_str) == Some(BLOCK) =>
            {
                match map.get(attr_keys::STATEMENTS) {
                    None | Some(Value::Null) => AttrValue::List(Vec::new()),
                    Some(statements) => self.build_value(statements, owner)?,
                }
            }
            Value::Null if key == attr_keys::NODES => AttrValue::List(Vec::new()),
            value => self.build_value(value, owner)?,
        };

        // A single statement body (`while (c) i++;`) is still a child list.
        match built {
            AttrValue::Node(id) if key == attr_keys::NODES => {
                Ok(AttrValue::List(vec![AttrValue::Node(id)]))
            }
            built => Ok(built),
        }
    }

    fn build_value(&mut self, value: &Value, owner: NodeId) -> Result<AttrValue> {
        match value {
            Value::Object(_) => match self.build(value, Some(owner))? {
                Built::Node(id) => {
                    self.nodes[owner].adjacent.push(id);
                    Ok(AttrValue::Node(id))
                }
                Built::Value(value) => Ok(AttrValue::Json(value)),
            },
            Value::Array(items) => items
                .iter()
                .map(|item| self.build_value(item, owner))
                .collect::<Result<Vec<_>>>()
                .map(AttrValue::List),
            scalar => Ok(AttrValue::Json(scalar.clone())),
        }
    }
}
