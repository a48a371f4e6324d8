//! Queries combining an ancestor test with a descendant test.
//!
//! Every combinator takes [`Filters`] (any filter may match) and reports "no
//! match" as `None` or an empty list. Ancestor depths follow
//! [`NodeRef::parent`], descendant depths follow [`SearchOptions::max_depth`].

use crate::{error::Result, filter::Filters, search::SearchOptions, tree::NodeRef};

/// Default ancestor depth: the immediate parent.
pub const PARENT_DEPTH: isize = -1;
/// Default descendant depth: nodes directly adjacent to the starting node.
pub const CHILD_DEPTH: usize = 1;
/// Default depth used to find the candidate nodes of [`NodeRef::find_node`].
pub const NODE_DEPTH: usize = 1;

pub type ParentChild<'a> = (NodeRef<'a>, NodeRef<'a>);
pub type NodeMatch<'a> = (NodeRef<'a>, NodeRef<'a>, NodeRef<'a>);

impl<'a> NodeRef<'a> {
    /// The first ancestor found by trying each filter in turn.
    pub fn parent_has_attributes(
        self,
        filters: &Filters,
        depth: isize,
    ) -> Result<Option<NodeRef<'a>>> {
        for filter in filters {
            if let Some(parent) = self.parent(depth, Some(filter))? {
                return Ok(Some(parent));
            }
        }
        Ok(None)
    }

    /// One ancestor per filter that finds one, in filter order.
    pub fn parents_have_attributes(
        self,
        filters: &Filters,
        depth: isize,
    ) -> Result<Vec<NodeRef<'a>>> {
        let mut parents = Vec::new();
        for filter in filters {
            if let Some(parent) = self.parent(depth, Some(filter))? {
                parents.push(parent);
            }
        }
        Ok(parents)
    }

    /// The first shallowest descendant within `depth` levels matching `filters`.
    pub fn child_has_attributes(
        self,
        filters: &Filters,
        depth: usize,
    ) -> Result<Option<NodeRef<'a>>> {
        Ok(self
            .children_have_attributes(filters, depth)?
            .into_iter()
            .next())
    }

    /// The shallowest descendants within `depth` levels matching `filters`.
    pub fn children_have_attributes(
        self,
        filters: &Filters,
        depth: usize,
    ) -> Result<Vec<NodeRef<'a>>> {
        Ok(self.children(
            &SearchOptions::new()
                .filters(filters.clone())
                .max_depth(depth)
                .include_children(false),
        ))
    }

    /// `(parent, child)` when this node has both a matching ancestor and a
    /// matching descendant.
    pub fn parent_child_has_attributes(
        self,
        parent_filters: &Filters,
        child_filters: &Filters,
        parent_depth: isize,
        child_depth: usize,
    ) -> Result<Option<ParentChild<'a>>> {
        let Some(parent) = self.parent_has_attributes(parent_filters, parent_depth)? else {
            return Ok(None);
        };
        Ok(self
            .child_has_attributes(child_filters, child_depth)?
            .map(|child| (parent, child)))
    }

    /// `(child, parent)` for the first descendant within `child_depth` levels
    /// matching `child_filters` that has an ancestor matching `parent_filters`.
    pub fn find_child_with_parent(
        self,
        child_filters: &Filters,
        parent_filters: &Filters,
        parent_depth: isize,
        child_depth: usize,
    ) -> Result<Option<ParentChild<'a>>> {
        let candidates = self.children(
            &SearchOptions::new()
                .filters(child_filters.clone())
                .max_depth(child_depth),
        );

        for child in candidates {
            if let Some(parent) = child.parent_has_attributes(parent_filters, parent_depth)? {
                return Ok(Some((child, parent)));
            }
        }
        Ok(None)
    }

    /// `(node, parent, child)` for the first descendant within `node_depth`
    /// levels matching `node_filters` that passes
    /// [`NodeRef::parent_child_has_attributes`].
    pub fn find_node(
        self,
        node_filters: &Filters,
        parent_filters: &Filters,
        child_filters: &Filters,
        node_depth: usize,
        parent_depth: isize,
        child_depth: usize,
    ) -> Result<Option<NodeMatch<'a>>> {
        for node in self.node_candidates(node_filters, node_depth) {
            if let Some((parent, child)) = node.parent_child_has_attributes(
                parent_filters,
                child_filters,
                parent_depth,
                child_depth,
            )? {
                return Ok(Some((node, parent, child)));
            }
        }
        Ok(None)
    }

    /// Every match [`NodeRef::find_node`] would consider, in pre-order.
    pub fn find_nodes(
        self,
        node_filters: &Filters,
        parent_filters: &Filters,
        child_filters: &Filters,
        node_depth: usize,
        parent_depth: isize,
        child_depth: usize,
    ) -> Result<Vec<NodeMatch<'a>>> {
        let mut matches = Vec::new();
        for node in self.node_candidates(node_filters, node_depth) {
            if let Some((parent, child)) = node.parent_child_has_attributes(
                parent_filters,
                child_filters,
                parent_depth,
                child_depth,
            )? {
                matches.push((node, parent, child));
            }
        }
        Ok(matches)
    }

    /// `(sibling, parent)`: an ancestor matching `parent_filters`, then one of
    /// its descendants matching `sibling_filters`.
    pub fn find_sibling(
        self,
        parent_filters: &Filters,
        sibling_filters: &Filters,
        parent_depth: isize,
        sibling_depth: usize,
    ) -> Result<Option<ParentChild<'a>>> {
        let Some(parent) = self.parent_has_attributes(parent_filters, parent_depth)? else {
            return Ok(None);
        };
        Ok(parent
            .child_has_attributes(sibling_filters, sibling_depth)?
            .map(|sibling| (sibling, parent)))
    }

    /// Like [`NodeRef::find_sibling`] but returns every matching sibling.
    pub fn find_siblings(
        self,
        parent_filters: &Filters,
        sibling_filters: &Filters,
        parent_depth: isize,
        sibling_depth: usize,
    ) -> Result<Option<(Vec<NodeRef<'a>>, NodeRef<'a>)>> {
        let Some(parent) = self.parent_has_attributes(parent_filters, parent_depth)? else {
            return Ok(None);
        };
        let siblings = parent.children_have_attributes(sibling_filters, sibling_depth)?;
        Ok((!siblings.is_empty()).then_some((siblings, parent)))
    }

    fn node_candidates(self, node_filters: &Filters, node_depth: usize) -> Vec<NodeRef<'a>> {
        self.children(
            &SearchOptions::new()
                .filters(node_filters.clone())
                .max_depth(node_depth),
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Filter, error::AstError, filter, tree::Ast};

    /// ```text
    /// ContractDefinition Bank
    ///   FunctionDefinition deposit
    ///     ExpressionStatement
    ///       FunctionCall transfer
    ///     EmitStatement
    ///   FunctionDefinition audit
    ///     Return
    /// ```
    fn bank() -> Ast {
        Ast::from_json(&json!({
            "nodeType": "ContractDefinition",
            "src": "0:200:0",
            "name": "Bank",
            "nodes": [
                {
                    "nodeType": "FunctionDefinition",
                    "src": "10:100:0",
                    "name": "deposit",
                    "visibility": "public",
                    "body": {
                        "nodeType": "Block",
                        "src": "30:80:0",
                        "statements": [
                            {
                                "nodeType": "ExpressionStatement",
                                "src": "35:30:0",
                                "expression": {
                                    "nodeType": "FunctionCall",
                                    "src": "35:29:0",
                                    "name": "transfer"
                                }
                            },
                            {"nodeType": "EmitStatement", "src": "70:20:0"}
                        ]
                    }
                },
                {
                    "nodeType": "FunctionDefinition",
                    "src": "120:60:0",
                    "name": "audit",
                    "visibility": "internal",
                    "body": [{"nodeType": "Return", "src": "130:10:0"}]
                }
            ]
        }))
        .unwrap()
    }

    fn by_type(node_type: &str) -> Filters {
        filter!("nodeType" => node_type).into()
    }

    fn find<'a>(ast: &'a Ast, node_type: &str) -> NodeRef<'a> {
        ast.iter().find(|node| node.node_type() == node_type).unwrap()
    }

    #[test]
    fn test_parent_has_attributes() {
        let ast = bank();
        let call = find(&ast, "FunctionCall");
        let filters = Filters::from(vec![
            filter!("nodeType" => "ContractDefinition"),
            filter!("nodeType" => "FunctionDefinition"),
        ]);

        assert_eq!(
            call.parent_has_attributes(&filters, 0).unwrap().map(|node| node.node_type()),
            Some("ContractDefinition")
        );
        assert_eq!(
            call.parents_have_attributes(&filters, 0)
                .unwrap()
                .iter()
                .map(|node| node.node_type())
                .collect::<Vec<_>>(),
            vec!["ContractDefinition", "FunctionDefinition"]
        );
        assert!(
            call.parent_has_attributes(&by_type("ContractDefinition"), PARENT_DEPTH)
                .unwrap()
                .is_none()
        );
        assert!(call.parents_have_attributes(&by_type("Return"), 0).unwrap().is_empty());
        assert!(matches!(
            ast.root().parent_has_attributes(&filters, PARENT_DEPTH),
            Err(AstError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_child_has_attributes() {
        let ast = bank();
        let deposit = find(&ast, "FunctionDefinition");
        let statements = Filters::from(vec![
            filter!("nodeType" => "ExpressionStatement"),
            filter!("nodeType" => "EmitStatement"),
        ]);

        assert_eq!(
            deposit
                .child_has_attributes(&statements, CHILD_DEPTH)
                .unwrap()
                .map(|node| node.node_type()),
            Some("ExpressionStatement")
        );
        assert_eq!(
            deposit.children_have_attributes(&statements, CHILD_DEPTH).unwrap().len(),
            2
        );
        assert!(
            deposit
                .child_has_attributes(&by_type("FunctionCall"), CHILD_DEPTH)
                .unwrap()
                .is_none()
        );
        assert!(
            deposit
                .child_has_attributes(&by_type("FunctionCall"), 2)
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn test_parent_child_has_attributes() {
        let ast = bank();
        let statement = find(&ast, "ExpressionStatement");

        let (parent, child) = statement
            .parent_child_has_attributes(
                &by_type("FunctionDefinition"),
                &by_type("FunctionCall"),
                PARENT_DEPTH,
                CHILD_DEPTH,
            )
            .unwrap()
            .unwrap();
        assert_eq!(parent.name(), Some("deposit"));
        assert_eq!(child.name(), Some("transfer"));

        assert!(
            statement
                .parent_child_has_attributes(
                    &by_type("ContractDefinition"),
                    &by_type("FunctionCall"),
                    PARENT_DEPTH,
                    CHILD_DEPTH,
                )
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_find_child_with_parent() {
        let ast = bank();
        let public = Filters::from(filter!("visibility" => "public"));

        let (child, parent) = ast
            .root()
            .find_child_with_parent(&by_type("FunctionCall"), &public, 0, 3)
            .unwrap()
            .unwrap();
        assert_eq!(child.name(), Some("transfer"));
        assert_eq!(parent.name(), Some("deposit"));

        assert!(
            ast.root()
                .find_child_with_parent(&by_type("FunctionCall"), &public, 0, CHILD_DEPTH)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_find_node() {
        let ast = bank();
        let root = ast.root();
        let functions = by_type("FunctionDefinition");
        let contract = by_type("ContractDefinition");
        let any = Filters::from(Filter::new());

        let (node, parent, child) = root
            .find_node(&functions, &contract, &any, NODE_DEPTH, PARENT_DEPTH, CHILD_DEPTH)
            .unwrap()
            .unwrap();
        assert_eq!(node.name(), Some("deposit"));
        assert_eq!(parent, root);
        assert_eq!(child.node_type(), "ExpressionStatement");

        let matches = root
            .find_nodes(&functions, &contract, &any, NODE_DEPTH, PARENT_DEPTH, CHILD_DEPTH)
            .unwrap();
        assert_eq!(
            matches
                .iter()
                .map(|(node, _, child)| (node.name(), child.node_type()))
                .collect::<Vec<_>>(),
            vec![
                (Some("deposit"), "ExpressionStatement"),
                (Some("audit"), "Return")
            ]
        );

        assert!(
            root.find_nodes(
                &functions,
                &contract,
                &by_type("EmitStatement"),
                NODE_DEPTH,
                PARENT_DEPTH,
                CHILD_DEPTH
            )
            .unwrap()
            .len()
                == 1
        );
        assert!(
            root.find_node(
                &functions,
                &contract,
                &by_type("Literal"),
                NODE_DEPTH,
                PARENT_DEPTH,
                CHILD_DEPTH
            )
            .unwrap()
            .is_none()
        );
    }

    #[test]
    fn test_find_sibling() {
        let ast = bank();
        let emit = find(&ast, "EmitStatement");
        let function = by_type("FunctionDefinition");

        let (sibling, parent) = emit
            .find_sibling(&function, &by_type("ExpressionStatement"), PARENT_DEPTH, CHILD_DEPTH)
            .unwrap()
            .unwrap();
        assert_eq!(sibling.node_type(), "ExpressionStatement");
        assert_eq!(parent.name(), Some("deposit"));

        let (siblings, _) = emit
            .find_siblings(&function, &Filters::default(), PARENT_DEPTH, CHILD_DEPTH)
            .unwrap()
            .unwrap();
        assert_eq!(siblings.len(), 2);
        assert!(siblings.contains(&emit));

        assert!(
            emit.find_siblings(&function, &by_type("Return"), PARENT_DEPTH, CHILD_DEPTH)
                .unwrap()
                .is_none()
        );
        assert!(
            emit.find_sibling(&by_type("ContractDefinition"), &function, PARENT_DEPTH, CHILD_DEPTH)
                .unwrap()
                .is_none()
        );
    }
}
