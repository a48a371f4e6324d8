//! Grammar categories grouping the compiler's concrete node types.
//!
//! The table is incomplete by nature: node types that are not listed simply
//! have no category. Categories are disjoint, so the reverse lookup is a plain
//! map from node type to category.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr, IntoStaticStr,
)]
pub enum Category {
    SourceUnit,
    ContractPart,
    Expression,
    PrimaryExpression,
    Statement,
    TypeName,
    YulStatement,
}

pub static GRAMMAR: &[(Category, &[&str])] = &[
    (
        Category::SourceUnit,
        &[
            "ImportDirective",
            "LibraryDefinition",
            "ContractDefinition",
            "InterfaceDefinition",
        ],
    ),
    (
        Category::ContractPart,
        &[
            "ConstructorDefinition",
            "ErrorDefinition",
            "EnumDefinition",
            "EventDefinition",
            "FunctionDefinition",
            "FallbackFunctionDefinition",
            "ReceiveFunctionDefinition",
            "ModifierDefinition",
            "StateVariableDeclaration",
            "StructDefinition",
            "UsingForDeclaration",
        ],
    ),
    (
        Category::Expression,
        &[
            "Assignment",
            "BinaryOperation",
            "Conditional",
            "FunctionCall",
            "IndexAccess",
            "MemberAccess",
            "NewExpression",
            "UnaryOperation",
            "VariableDeclaration",
        ],
    ),
    (
        Category::PrimaryExpression,
        &[
            "BooleanLiteral",
            "ElementaryTypeNameExpression",
            "HexLiteral",
            "Identifier",
            "NumberLiteral",
            "StringLiteral",
            "TupleExpression",
        ],
    ),
    (
        Category::Statement,
        &[
            "BreakStatement",
            "ContinueStatement",
            "DoWhileStatement",
            "EmitStatement",
            "ExpressionStatement",
            "ForStatement",
            "IfStatement",
            "InlineAssemblyStatement",
            "PlaceholderStatement",
            "SimpleStatement",
            "TryStatement",
            "Throw",
            "WhileStatement",
            "ReturnStatement",
            "RevertStatement",
            "AssemblyStatement",
        ],
    ),
    (
        Category::TypeName,
        &[
            "ArrayTypeName",
            "ElementaryTypeName",
            "FunctionTypeName",
            "Mapping",
            "UserDefinedTypeName",
            "IdentifierPath",
        ],
    ),
    (
        Category::YulStatement,
        &[
            "YulVariableDeclaration",
            "YulAssignment",
            "YulFunctionCall",
            "YulIfStatement",
            "YulForStatement",
            "YulSwitchStatement",
            "Leave",
            "Break",
            "Continue",
            "YulFunctionDefinition",
        ],
    ),
];

static CATEGORY_INDEX: LazyLock<FxHashMap<&'static str, Category>> = LazyLock::new(|| {
    let mut index = FxHashMap::default();

    for (category, members) in GRAMMAR {
        for node_type in *members {
            index.entry(*node_type).or_insert(*category);
        }
    }

    index
});

/// Returns the grammar category of `node_type`, if it has one.
pub fn category_of(node_type: &str) -> Option<Category> {
    CATEGORY_INDEX.get(node_type).copied()
}

/// Returns the node types belonging to `category`.
pub fn members(category: Category) -> &'static [&'static str] {
    GRAMMAR
        .iter()
        .find_map(|(c, members)| (*c == category).then_some(*members))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use rustc_hash::FxHashSet;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case("ContractDefinition", Some(Category::SourceUnit))]
    #[case("ErrorDefinition", Some(Category::ContractPart))]
    #[case("ReceiveFunctionDefinition", Some(Category::ContractPart))]
    #[case("ModifierDefinition", Some(Category::ContractPart))]
    #[case("FunctionCall", Some(Category::Expression))]
    #[case("Identifier", Some(Category::PrimaryExpression))]
    #[case("IfStatement", Some(Category::Statement))]
    #[case("Mapping", Some(Category::TypeName))]
    #[case("YulAssignment", Some(Category::YulStatement))]
    #[case("PragmaDirective", None)]
    #[case("SourceUnit", None)]
    #[case("ReceiveFunctionDefinitionModifierDefinition", None)]
    fn test_category_of(#[case] node_type: &str, #[case] expected: Option<Category>) {
        assert_eq!(category_of(node_type), expected);
    }

    #[test]
    fn test_categories_are_disjoint() {
        let mut seen = FxHashSet::default();

        for (_, members) in GRAMMAR {
            for node_type in *members {
                assert!(seen.insert(*node_type), "{node_type} is listed twice");
            }
        }
    }

    #[test]
    fn test_every_category_has_members() {
        for category in Category::iter() {
            assert!(!members(category).is_empty(), "{category} has no members");
            for node_type in members(category) {
                assert_eq!(category_of(node_type), Some(category));
            }
        }
    }

    #[test]
    fn test_category_names_round_trip() {
        for category in Category::iter() {
            assert_eq!(Category::from_str(category.as_ref()).unwrap(), category);
        }
        assert!(Category::from_str("Block").is_err());
    }
}
