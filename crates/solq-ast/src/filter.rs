use std::str::FromStr;

use serde_json::Value;
use smol_str::SmolStr;

use crate::{
    error::{AstError, json_kind},
    tree::NodeRef,
};

/// A conjunction of `field == value` tests.
///
/// Keys are dotted paths as accepted by [`NodeRef::get`]. A missing field
/// compares equal to `null`. The empty filter matches every node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(SmolStr, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        self.conditions.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[(SmolStr, Value)] {
        &self.conditions
    }

    /// `true` when every condition holds.
    pub fn matches(&self, node: &NodeRef<'_>) -> bool {
        self.conditions
            .iter()
            .all(|(key, value)| field_equals(node, key, value))
    }

    /// `true` when at least one condition holds. Used for exclusion.
    pub fn matches_any(&self, node: &NodeRef<'_>) -> bool {
        self.conditions
            .iter()
            .any(|(key, value)| field_equals(node, key, value))
    }
}

fn field_equals(node: &NodeRef<'_>, key: &str, expected: &Value) -> bool {
    match node.get(key) {
        Some(field) => field.matches(expected),
        None => expected.is_null(),
    }
}

impl TryFrom<&Value> for Filter {
    type Error = AstError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Filter {
                conditions: map
                    .iter()
                    .map(|(key, value)| (SmolStr::new(key), value.clone()))
                    .collect(),
            }),
            other => Err(AstError::TypeMismatch {
                found: json_kind(other),
            }),
        }
    }
}

impl FromStr for Filter {
    type Err = AstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::try_from(&serde_json::from_str::<Value>(s)?)
    }
}

/// A disjunction of [`Filter`]s. Defaults to a single empty filter, which
/// matches everything.
#[derive(Debug, Clone, PartialEq)]
pub struct Filters(Vec<Filter>);

impl Default for Filters {
    fn default() -> Self {
        Filters(vec![Filter::default()])
    }
}

impl Filters {
    /// `true` when any filter matches.
    pub fn matches(&self, node: &NodeRef<'_>) -> bool {
        self.0.iter().any(|filter| filter.matches(node))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Filter> for Filters {
    fn from(filter: Filter) -> Self {
        Filters(vec![filter])
    }
}

impl From<Vec<Filter>> for Filters {
    fn from(filters: Vec<Filter>) -> Self {
        Filters(filters)
    }
}

impl<'a> IntoIterator for &'a Filters {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl TryFrom<&Value> for Filters {
    type Error = AstError;

    /// An object becomes one filter, a list of objects becomes one filter per item.
    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(_) => Filter::try_from(value).map(Filters::from),
            Value::Array(items) => items
                .iter()
                .map(Filter::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Filters),
            other => Err(AstError::TypeMismatch {
                found: json_kind(other),
            }),
        }
    }
}

impl FromStr for Filters {
    type Err = AstError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filters::try_from(&serde_json::from_str::<Value>(s)?)
    }
}

/// Builds a [`Filter`] from `key => value` pairs.
///
/// ```
/// use solq_ast::filter;
///
/// let f = filter!("nodeType" => "FunctionDefinition", "visibility" => "public");
/// assert_eq!(f.conditions().len(), 2);
/// ```
#[macro_export]
macro_rules! filter {
    () => {
        $crate::Filter::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Filter::new()$(.with($key, $value))+
    };
}
