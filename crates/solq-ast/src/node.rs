use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::{
    arena::ArenaId,
    grammar::Category,
    location::{Location, Offset},
    value::{AttrValue, attr_keys},
};

pub type NodeId = ArenaId<Node>;

/// One element of a compiler AST.
///
/// Nodes carry no structural equality: two nodes are the same only when they
/// have the same [`NodeId`] in the same tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) node_type: SmolStr,
    pub(crate) category: Option<Category>,
    pub(crate) depth: usize,
    pub(crate) location: Location,
    pub(crate) parent: Option<NodeId>,
    pub(crate) attributes: BTreeMap<SmolStr, AttrValue>,
    pub(crate) adjacent: Vec<NodeId>,
}

impl Node {
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn offset(&self) -> Option<Offset> {
        self.location.offset
    }

    pub fn scope_id(&self) -> i64 {
        self.location.scope_id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Sorted names of the attributes stored on this node.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = &str> {
        self.attributes.keys().map(SmolStr::as_str)
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Nodes exposing a `nodes` child list support indexed and keyed access.
    pub fn is_iterable(&self) -> bool {
        matches!(self.attributes.get(attr_keys::NODES), Some(AttrValue::List(_)))
    }

    /// Every node reachable through one attribute, in construction order.
    pub fn adjacent(&self) -> &[NodeId] {
        &self.adjacent
    }

    /// Hashing key derived from `(node_type, depth, offset)`.
    ///
    /// Distinct nodes may share a key, so it must not stand in for identity.
    pub fn bucket_key(&self) -> (&str, usize, Option<Offset>) {
        (&self.node_type, self.depth, self.location.offset)
    }
}
