#![no_main]

use arbitrary::Arbitrary;
use itertools::Itertools;
use libfuzzer_sys::fuzz_target;
use serde_json::{Value, json};
use solq_ast::{Ast, ExtractOptions, Filters, SearchOptions};

#[derive(Debug, Clone, Arbitrary)]
enum Body {
    Nodes(Vec<ArbitraryNode>),
    Body(Vec<ArbitraryNode>),
    Block(Option<Vec<ArbitraryNode>>),
    Null,
}

#[derive(Debug, Clone, Arbitrary)]
struct ArbitraryNode {
    node_type: String,
    start: i64,
    length: i64,
    scope: i64,
    name: Option<String>,
    body: Body,
}

impl ArbitraryNode {
    fn to_json(&self) -> Value {
        let mut node = json!({
            "nodeType": self.node_type,
            "src": format!("{}:{}:{}", self.start, self.length, self.scope),
        });
        if let Some(name) = &self.name {
            node["name"] = json!(name);
        }

        let children = |nodes: &[ArbitraryNode]| nodes.iter().map(Self::to_json).collect_vec();
        match &self.body {
            Body::Nodes(nodes) => node["nodes"] = Value::Array(children(nodes)),
            Body::Body(nodes) => node["body"] = Value::Array(children(nodes)),
            Body::Block(statements) => {
                node["body"] = json!({
                    "nodeType": "Block",
                    "src": "0:0:0",
                    "statements": statements.as_deref().map(children),
                });
            }
            Body::Null => node["nodes"] = Value::Null,
        }
        node
    }
}

#[derive(Debug, Clone, Arbitrary)]
struct Context {
    raw_json: Option<String>,
    generated: Option<ArbitraryNode>,
    filter: Option<String>,
    source: String,
    max_depth: Option<u8>,
    include_parents: bool,
    include_children: bool,
}

fuzz_target!(|context: Context| {
    let raw = match (&context.raw_json, &context.generated) {
        (Some(raw), _) => match serde_json::from_str::<Value>(raw) {
            Ok(raw) => raw,
            Err(_) => return,
        },
        (_, Some(generated)) => generated.to_json(),
        _ => return,
    };

    let Ok(ast) = Ast::from_json(&raw) else {
        return;
    };

    let mut options = SearchOptions::new()
        .include_parents(context.include_parents)
        .include_children(context.include_children);
    if let Some(max_depth) = context.max_depth {
        options = options.max_depth(max_depth as usize);
    }
    if let Some(filters) = context.filter.as_deref().and_then(|f| f.parse::<Filters>().ok()) {
        options = options.filters(filters);
    }

    for node in ast.root().children(&options) {
        assert!(node.depth() > 0);
        let _ = node.parents(0, None);
        let _ = node.extract(&context.source, &ExtractOptions::default());
    }
});
