//! `solq-ast` builds a queryable tree from the JSON AST emitted by the Solidity
//! compiler.
//!
//! ## Examples
//!
//! ```
//! use serde_json::json;
//! use solq_ast::{Ast, ExtractOptions, SearchOptions, filter};
//!
//! let source = "pragma solidity ^0.8.9;\ncontract Vault {}\n";
//! let ast = Ast::from_json(&json!({
//!     "nodeType": "SourceUnit",
//!     "src": "0:42:0",
//!     "absolutePath": "contracts/Vault.sol",
//!     "nodes": [
//!         {"nodeType": "PragmaDirective", "src": "0:23:0", "literals": ["solidity", "^0.8.9"]},
//!         {"nodeType": "ContractDefinition", "src": "24:17:0", "name": "Vault", "nodes": []}
//!     ]
//! }))
//! .unwrap();
//!
//! let contracts = ast
//!     .root()
//!     .children(&SearchOptions::new().filters(filter!("nodeType" => "ContractDefinition")));
//! assert_eq!(contracts.len(), 1);
//!
//! let vault = ast.root().as_iterable().unwrap().by_name("Vault").unwrap();
//! assert_eq!(vault, contracts[0]);
//! assert_eq!(vault.parent(0, None).unwrap(), Some(ast.root()));
//!
//! let options = ExtractOptions { line_numbers: false, ..Default::default() };
//! assert_eq!(vault.extract(source, &options).unwrap(), "contract Vault {}");
//! ```
mod arena;
mod builder;
mod error;
mod filter;
mod grammar;
mod location;
mod node;
mod relation;
mod search;
mod source;
mod tree;
mod unit;
mod value;

pub use arena::{Arena, ArenaId};
pub use builder::{Built, Builder};
pub use error::{AstError, Result};
pub use filter::{Filter, Filters};
pub use grammar::{Category, GRAMMAR, category_of, members};
pub use location::{Location, Offset};
pub use node::{Node, NodeId};
pub use relation::{CHILD_DEPTH, NODE_DEPTH, NodeMatch, PARENT_DEPTH, ParentChild};
pub use search::SearchOptions;
pub use source::{ExtractOptions, insert_line_numbers};
pub use tree::{Ast, IterableNode, NodeRef};
#[cfg(feature = "file-io")]
pub use unit::from_standard_output_file;
pub use unit::{
    DependencyResolver, ImportResolver, SourceUnit, from_ast, from_json, from_standard_output,
    from_standard_output_with,
};
pub use value::{AttrValue, FieldRef, ListRef, attr_keys};
