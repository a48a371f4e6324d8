//! Property-based testing strategies for compiler AST documents.
//!
//! Every generated document comes with a matching source text: each node's
//! `src` points at the text rendered for it, so offsets nest exactly the way
//! the tree does and the root spans the whole text.
//!
//! # Examples
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use solq_test::strategies::arb_source_unit;
//!
//! proptest! {
//!     #[test]
//!     fn test_something(generated in arb_source_unit()) {
//!         let ast = solq_ast::Ast::from_json(&generated.ast).unwrap();
//!         // Your test here
//!     }
//! }
//! ```

use proptest::prelude::*;
use serde_json::{Value, json};

/// Node types used for generated nodes.
pub const NODE_TYPES: &[&str] = &[
    "ContractDefinition",
    "FunctionDefinition",
    "ModifierDefinition",
    "IfStatement",
    "ExpressionStatement",
    "FunctionCall",
    "Identifier",
    "VariableDeclaration",
];

/// How a generated node hands its children to the compiler output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStyle {
    /// `"nodes": [...]`
    Nodes,
    /// `"body": [...]`
    Body,
    /// `"body": {"nodeType": "Block", "statements": [...]}`
    Block,
}

/// The shape of a generated node before it is rendered.
#[derive(Debug, Clone)]
pub struct ArbNode {
    pub node_type: &'static str,
    pub name: Option<String>,
    pub style: BodyStyle,
    pub children: Vec<ArbNode>,
}

/// A generated AST document plus the source text its offsets point into.
#[derive(Debug, Clone)]
pub struct GeneratedSource {
    pub ast: Value,
    pub source: String,
}

pub fn arb_node_type() -> impl Strategy<Value = &'static str> {
    prop::sample::select(NODE_TYPES)
}

pub fn arb_name() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-z][a-z0-9_]{0,6}")
}

pub fn arb_body_style() -> impl Strategy<Value = BodyStyle> {
    prop_oneof![
        Just(BodyStyle::Nodes),
        Just(BodyStyle::Body),
        Just(BodyStyle::Block),
    ]
}

/// Strategy for generating a subtree up to four levels deep.
pub fn arb_node() -> impl Strategy<Value = ArbNode> {
    let leaf =
        (arb_node_type(), arb_name(), arb_body_style()).prop_map(|(node_type, name, style)| ArbNode {
            node_type,
            name,
            style,
            children: Vec::new(),
        });

    leaf.prop_recursive(4, 48, 4, |inner| {
        (
            arb_node_type(),
            arb_name(),
            arb_body_style(),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(node_type, name, style, children)| ArbNode {
                node_type,
                name,
                style,
                children,
            })
    })
}

/// Strategy for generating a `SourceUnit` document and its source text.
pub fn arb_source_unit() -> impl Strategy<Value = GeneratedSource> {
    prop::collection::vec(arb_node(), 0..4).prop_map(|children| {
        render(&ArbNode {
            node_type: "SourceUnit",
            name: None,
            style: BodyStyle::Nodes,
            children,
        })
    })
}

/// Renders `root` into an AST document and the source text it describes.
pub fn render(root: &ArbNode) -> GeneratedSource {
    let mut source = String::new();
    let ast = render_node(root, &mut source);
    GeneratedSource { ast, source }
}

fn render_node(node: &ArbNode, source: &mut String) -> Value {
    let start = source.len();
    source.push_str(node.node_type);
    if let Some(name) = &node.name {
        source.push(' ');
        source.push_str(name);
    }
    source.push_str(" {\n");

    let block_start = source.len();
    let children = node
        .children
        .iter()
        .map(|child| render_node(child, source))
        .collect::<Vec<_>>();
    let block_len = source.len() - block_start;
    source.push_str("}\n");

    let mut object = json!({
        "nodeType": node.node_type,
        "src": format!("{start}:{}:0", source.len() - start),
    });
    if let Some(name) = &node.name {
        object["name"] = json!(name);
    }
    match node.style {
        BodyStyle::Nodes => object["nodes"] = Value::Array(children),
        BodyStyle::Body => object["body"] = Value::Array(children),
        BodyStyle::Block => {
            object["body"] = json!({
                "nodeType": "Block",
                "src": format!("{block_start}:{block_len}:0"),
                "statements": children
            });
        }
    }
    object
}
