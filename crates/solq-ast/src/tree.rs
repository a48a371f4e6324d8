use std::{
    borrow::Cow,
    fmt,
    hash::{Hash, Hasher},
    ptr,
};

use itertools::Itertools;
use serde_json::Value;

use crate::{
    arena::Arena,
    builder::Builder,
    error::{AstError, Result},
    grammar::Category,
    location::Offset,
    node::{Node, NodeId},
    value::{AttrValue, FieldRef, ListRef, attr_keys},
};

/// A tree built from one compiler AST document.
///
/// The arena owns every node; parent links are plain [`NodeId`]s. The tree is
/// never modified after [`Ast::from_json`] returns.
#[derive(Debug, Clone)]
pub struct Ast {
    pub(crate) nodes: Arena<Node>,
    pub(crate) root: NodeId,
}

impl Ast {
    /// Builds a tree from a JSON AST object. The input is only read.
    pub fn from_json(raw: &Value) -> Result<Self> {
        Builder::new().build_tree(raw)
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.node(self.root)
    }

    /// # Panics
    ///
    /// Panics if `id` was not allocated by this tree.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.index() < self.nodes.len(), "{id:?} does not belong to this tree");
        NodeRef { ast: self, id }
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.nodes.get(id).map(|_| NodeRef { ast: self, id })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in pre-order (parents before children).
    pub fn iter(&self) -> impl ExactSizeIterator<Item = NodeRef<'_>> {
        self.nodes.iter().map(move |(id, _)| NodeRef { ast: self, id })
    }
}

/// A borrowed handle to one node of an [`Ast`].
///
/// Equality and hashing are by identity (same tree, same node id).
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    pub(crate) ast: &'a Ast,
    pub(crate) id: NodeId,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && ptr::eq(self.ast, other.ast)
    }
}

impl Eq for NodeRef<'_> {}

impl Hash for NodeRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(self.ast, state);
        self.id.hash(state);
    }
}

impl<'a> NodeRef<'a> {
    #[inline(always)]
    pub fn data(&self) -> &'a Node {
        &self.ast.nodes[self.id]
    }

    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node_type(&self) -> &'a str {
        self.data().node_type()
    }

    pub fn category(&self) -> Option<Category> {
        self.data().category
    }

    pub fn depth(&self) -> usize {
        self.data().depth
    }

    pub fn offset(&self) -> Option<Offset> {
        self.data().offset()
    }

    pub fn scope_id(&self) -> i64 {
        self.data().scope_id()
    }

    /// Sorted field names. `baseNodeType` is listed when the node has a
    /// grammar category.
    pub fn fields(self) -> impl Iterator<Item = &'a str> {
        let base_node_type = self.category().map(|_| attr_keys::BASE_NODE_TYPE);
        self.data().fields().merge(base_node_type).dedup()
    }

    pub fn attr(&self, name: &str) -> Option<&'a AttrValue> {
        self.data().attr(name)
    }

    /// String attribute, if `name` holds a JSON string.
    pub fn str_attr(&self, name: &str) -> Option<&'a str> {
        self.attr(name).and_then(AttrValue::as_str)
    }

    pub fn name(&self) -> Option<&'a str> {
        self.str_attr(attr_keys::NAME)
    }

    pub fn parent_node(&self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|id| self.ast.node(id))
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        std::iter::successors(self.parent_node(), |node| node.parent_node())
    }

    /// Every node reachable through one attribute, in construction order.
    pub fn adjacent(self) -> impl ExactSizeIterator<Item = NodeRef<'a>> + 'a {
        let ast = self.ast;
        self.data().adjacent.iter().map(move |id| ast.node(*id))
    }

    pub fn is_iterable(&self) -> bool {
        self.data().is_iterable()
    }

    pub fn as_iterable(&self) -> Option<IterableNode<'a>> {
        match self.attr(attr_keys::NODES)? {
            AttrValue::List(items) => Some(IterableNode {
                node: *self,
                items: ListRef {
                    ast: self.ast,
                    items,
                },
            }),
            _ => None,
        }
    }

    /// Looks up a field by a dotted path such as `typeName.name` or `nodes.0`.
    ///
    /// Besides stored attributes, `nodeType`, `baseNodeType` and `depth`
    /// resolve from node metadata.
    pub fn get(&self, path: &str) -> Option<FieldRef<'a>> {
        let mut segments = path.split('.');
        let first = self.field(segments.next()?)?;
        segments.try_fold(first, |field, segment| field.step(segment))
    }

    pub(crate) fn field(&self, key: &str) -> Option<FieldRef<'a>> {
        match key {
            attr_keys::NODE_TYPE | attr_keys::NODE_TYPE_ALIAS => Some(FieldRef::Value(Cow::Owned(
                Value::String(self.node_type().to_string()),
            ))),
            attr_keys::BASE_NODE_TYPE | attr_keys::CATEGORY => self
                .category()
                .map(|category| FieldRef::Value(Cow::Owned(Value::String(category.to_string())))),
            attr_keys::DEPTH => Some(FieldRef::Value(Cow::Owned(Value::from(self.depth())))),
            _ => self
                .attr(key)
                .map(|value| FieldRef::from_attr(self.ast, value)),
        }
    }

    /// Short human-readable label: `name = value`, or the first of `name`,
    /// `value`, `absolutePath`.
    pub fn display(&self) -> Option<String> {
        let render = |key: &str| self.attr(key).and_then(render_attr);

        if let (Some(name), Some(value)) = (render(attr_keys::NAME), render(attr_keys::VALUE)) {
            return Some(format!("{name} = {value}"));
        }

        [attr_keys::NAME, attr_keys::VALUE, attr_keys::ABSOLUTE_PATH]
            .into_iter()
            .find_map(render)
    }
}

fn render_attr(value: &AttrValue) -> Option<String> {
    match value.as_json()? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl fmt::Display for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.node_type())?;
        if self.is_iterable() {
            write!(f, " iterable")?;
        }
        match self.attr(attr_keys::TYPE) {
            Some(AttrValue::Json(Value::String(ty))) => write!(f, " {ty}")?,
            Some(AttrValue::Node(id)) => {
                if let Some(label) = self.ast.node(*id).display() {
                    write!(f, " {label}")?;
                }
            }
            _ => {}
        }
        match self.display() {
            Some(label) => write!(f, " '{label}'>"),
            None => write!(f, " object>"),
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}@{}", self.id.index())
    }
}

/// A node with an ordered `nodes` child list.
#[derive(Debug, Clone, Copy)]
pub struct IterableNode<'a> {
    node: NodeRef<'a>,
    items: ListRef<'a>,
}

impl<'a> IterableNode<'a> {
    pub fn node(&self) -> NodeRef<'a> {
        self.node
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The child at `index`, if that item is a tree node.
    pub fn get(&self, index: usize) -> Option<NodeRef<'a>> {
        self.items.get(index).and_then(|item| item.as_node())
    }

    /// The first child whose `name` attribute equals `name`.
    pub fn by_name(&self, name: &str) -> Result<NodeRef<'a>> {
        self.iter()
            .find(|child| child.name() == Some(name))
            .ok_or_else(|| AstError::NotFound(name.into()))
    }

    pub fn iter(self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.items.nodes()
    }

    pub fn contains(&self, node: &NodeRef<'_>) -> bool {
        self.iter()
            .any(|child| child.id == node.id && ptr::eq(child.ast, node.ast))
    }
}

impl<'a> IntoIterator for IterableNode<'a> {
    type Item = NodeRef<'a>;
    type IntoIter = Box<dyn Iterator<Item = NodeRef<'a>> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.items.nodes())
    }
}
