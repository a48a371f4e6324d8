use rstest::{fixture, rstest};
use serde_json::{Value, json};
use solq_ast::{
    Ast, AstError, Category, ExtractOptions, Filters, NodeRef, SearchOptions, filter,
    from_standard_output,
};

#[fixture]
fn crowd_funding() -> Value {
    json!({
        "nodeType": "SourceUnit",
        "src": "0:83:0",
        "id": 5,
        "absolutePath": "./contracts/CrowdFunding.sol",
        "exportedSymbols": {"Withdrawal": [4]},
        "license": "MIT",
        "nodes": [
            {
                "nodeType": "PragmaDirective",
                "src": "39:23:0",
                "id": 1,
                "literals": ["solidity", "^", "0.8", ".9"]
            },
            {
                "nodeType": "ErrorDefinition",
                "src": "64:19:0",
                "id": 4,
                "name": "Withdrawal",
                "nameLocation": "70:10:0",
                "errorSelector": "70e44c6a",
                "parameters": {
                    "nodeType": "ParameterList",
                    "src": "80:2:0",
                    "id": 3,
                    "parameters": []
                }
            }
        ]
    })
}

fn labels(nodes: &[NodeRef<'_>]) -> Vec<String> {
    nodes.iter().map(ToString::to_string).collect()
}

#[rstest]
fn test_crowd_funding_tree(crowd_funding: Value) {
    let ast = Ast::from_json(&crowd_funding).unwrap();
    let root = ast.root();
    let children = root.as_iterable().unwrap();

    assert_eq!(root.to_string(), "<SourceUnit iterable './contracts/CrowdFunding.sol'>");
    assert_eq!(children.len(), 2);
    assert!(children.iter().all(|child| child.depth() == 1));
    assert_eq!(
        labels(&children.iter().collect::<Vec<_>>()),
        vec!["<PragmaDirective object>", "<ErrorDefinition 'Withdrawal'>"]
    );

    let withdrawal = children.by_name("Withdrawal").unwrap();
    let found =
        root.children(&SearchOptions::new().filters(filter!("node_type" => "ErrorDefinition")));
    assert_eq!(found, vec![withdrawal]);
    assert_eq!(withdrawal.parent(0, None).unwrap(), Some(root));
    assert_eq!(withdrawal.category(), Some(Category::ContractPart));
    assert_eq!(withdrawal.str_attr("errorSelector"), Some("70e44c6a"));
    assert!(withdrawal.is_child_of(root));
    assert!(children.contains(&withdrawal));
}

#[rstest]
fn test_crowd_funding_lookup_failures(crowd_funding: Value) {
    let ast = Ast::from_json(&crowd_funding).unwrap();
    let root = ast.root();
    let children = root.as_iterable().unwrap();

    assert!(matches!(children.by_name("Deposit"), Err(AstError::NotFound(_))));
    assert!(matches!(root.parent(-1, None), Err(AstError::OutOfRange { .. })));

    let pragma = children.get(0).unwrap();
    for depth in [1, 2, -2] {
        assert!(matches!(pragma.parent(depth, None), Err(AstError::OutOfRange { .. })));
    }
}

#[rstest]
fn test_crowd_funding_extract(crowd_funding: Value) {
    let source = format!(
        "{:<39}pragma solidity ^0.8.9;\n\nerror Withdrawal();",
        "// SPDX-License-Identifier: MIT"
    );
    let ast = Ast::from_json(&crowd_funding).unwrap();
    let children = ast.root().as_iterable().unwrap();
    let plain = ExtractOptions {
        line_numbers: false,
        ..Default::default()
    };

    assert_eq!(
        children.get(0).unwrap().extract(&source, &plain).unwrap(),
        "pragma solidity ^0.8.9;"
    );
    assert_eq!(
        children
            .by_name("Withdrawal")
            .unwrap()
            .extract(&source, &ExtractOptions::default())
            .unwrap(),
        "3: error Withdrawal();"
    );
}

#[rstest]
fn test_crowd_funding_standard_output(crowd_funding: Value) {
    let output = json!({
        "sources": {
            "./contracts/CrowdFunding.sol": {"id": 0, "ast": crowd_funding}
        }
    });
    let units = from_standard_output(&output).unwrap();

    assert_eq!(units.len(), 1);
    assert_eq!(units[0].path(), "./contracts/CrowdFunding.sol");
    assert_eq!(units[0].absolute_path(), Some("./contracts/CrowdFunding.sol"));
    assert!(units[0].dependencies().is_empty());
}

fn statement(src: &str, name: &str) -> Value {
    json!({
        "nodeType": "ExpressionStatement",
        "src": src,
        "expression": {"nodeType": "Identifier", "src": src, "name": name}
    })
}

fn function(body: Value) -> Value {
    json!({
        "nodeType": "FunctionDefinition",
        "src": "0:60:0",
        "name": "withdraw",
        "body": body
    })
}

fn structure(ast: &Ast) -> Vec<(String, usize, String, Vec<String>)> {
    ast.iter()
        .map(|node| {
            (
                node.node_type().to_string(),
                node.depth(),
                node.offset().map(|offset| offset.to_string()).unwrap_or_default(),
                node.fields().map(String::from).collect(),
            )
        })
        .collect()
}

#[rstest]
#[case::block(json!({
    "nodeType": "Block",
    "src": "20:40:0",
    "statements": [statement("22:5:0", "a"), statement("30:5:0", "b")]
}))]
#[case::flat_list(json!([statement("22:5:0", "a"), statement("30:5:0", "b")]))]
fn test_block_body_matches_flat_body(#[case] body: Value) {
    let flat = json!([statement("22:5:0", "a"), statement("30:5:0", "b")]);
    let expected = Ast::from_json(&function(flat)).unwrap();
    let ast = Ast::from_json(&function(body)).unwrap();

    assert_eq!(structure(&ast), structure(&expected));

    let identifiers = ast
        .root()
        .children(&SearchOptions::new().filters(filter!("nodeType" => "Identifier")));
    assert_eq!(
        identifiers.iter().map(|node| node.name()).collect::<Vec<_>>(),
        vec![Some("a"), Some("b")]
    );
    assert!(identifiers.iter().all(|node| node.depth() == 2));
}

#[rstest]
#[case(json!({"node_type": "ErrorDefinition"}), 1)]
#[case(json!([{"nodeType": "PragmaDirective"}, {"name": "Withdrawal"}]), 2)]
#[case(json!([{"nodeType": "PragmaDirective", "literals.0": "solidity"}]), 1)]
#[case(json!({"baseNodeType": "ContractPart"}), 1)]
#[case(json!({"depth": 2}), 1)]
fn test_filters_from_json(crowd_funding: Value, #[case] filters: Value, #[case] expected: usize) {
    let ast = Ast::from_json(&crowd_funding).unwrap();
    let filters = Filters::try_from(&filters).unwrap();

    assert_eq!(ast.root().children(&SearchOptions::new().filters(filters)).len(), expected);
}
