use rustc_hash::FxHashMap;
use serde_json::Value;
use smol_str::SmolStr;

use crate::{
    error::{AstError, Result},
    filter,
    search::SearchOptions,
    tree::{Ast, NodeRef},
    value::attr_keys,
};

const SOURCES: &str = "sources";
const AST: &str = "ast";
const IMPORT_DIRECTIVE: &str = "ImportDirective";

/// One source file of a compilation: its tree plus the files it depends on.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    path: SmolStr,
    ast: Ast,
    dependencies: Vec<usize>,
}

impl SourceUnit {
    pub fn new(path: impl Into<SmolStr>, ast: Ast) -> Self {
        Self {
            path: path.into(),
            ast,
            dependencies: Vec::new(),
        }
    }

    /// The key this unit had in the compiler's `sources` object.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn root(&self) -> NodeRef<'_> {
        self.ast.root()
    }

    /// The root's `absolutePath` attribute, if present.
    pub fn absolute_path(&self) -> Option<&str> {
        self.root().str_attr(attr_keys::ABSOLUTE_PATH)
    }

    /// Indices of the units this one depends on, within the same collection.
    pub fn dependencies(&self) -> &[usize] {
        &self.dependencies
    }

    pub fn set_dependencies(&mut self, dependencies: Vec<usize>) {
        self.dependencies = dependencies;
    }
}

/// Fills in the dependency edges of a freshly built set of units.
pub trait DependencyResolver {
    fn resolve(&self, units: Vec<SourceUnit>) -> Vec<SourceUnit>;
}

/// Links every unit to the units named by its `ImportDirective`s.
///
/// An import is resolved against each unit's `sources` key and its root
/// `absolutePath`. Imports naming files outside the collection are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportResolver;

impl DependencyResolver for ImportResolver {
    fn resolve(&self, mut units: Vec<SourceUnit>) -> Vec<SourceUnit> {
        let mut index = FxHashMap::default();
        for (i, unit) in units.iter().enumerate() {
            index.entry(SmolStr::new(unit.path())).or_insert(i);
            if let Some(absolute_path) = unit.absolute_path() {
                index.entry(SmolStr::new(absolute_path)).or_insert(i);
            }
        }

        let imports =
            SearchOptions::new().filters(filter!(attr_keys::NODE_TYPE => IMPORT_DIRECTIVE));
        let edges = units
            .iter()
            .enumerate()
            .map(|(i, unit)| {
                let mut dependencies = unit
                    .root()
                    .children(&imports)
                    .into_iter()
                    .filter_map(|import| import.str_attr(attr_keys::ABSOLUTE_PATH))
                    .filter_map(|path| index.get(path).copied())
                    .filter(|&dependency| dependency != i)
                    .collect::<Vec<_>>();
                dependencies.sort_unstable();
                dependencies.dedup();

                tracing::trace!(unit = unit.path(), ?dependencies, "Resolved imports");
                dependencies
            })
            .collect::<Vec<_>>();

        for (unit, dependencies) in units.iter_mut().zip(edges) {
            unit.set_dependencies(dependencies);
        }
        units
    }
}

/// Builds one unit per entry of a compiler standard-output document and links
/// them with [`ImportResolver`].
pub fn from_standard_output(output: &Value) -> Result<Vec<SourceUnit>> {
    from_standard_output_with(output, &ImportResolver)
}

/// Like [`from_standard_output`] with a caller-supplied resolver.
///
/// Units come back in the iteration order of the `sources` object.
pub fn from_standard_output_with<R>(output: &Value, resolver: &R) -> Result<Vec<SourceUnit>>
where
    R: DependencyResolver + ?Sized,
{
    let sources = match output.get(SOURCES) {
        Some(Value::Object(sources)) => sources,
        Some(_) => return Err(AstError::malformed(SOURCES, "expected an object")),
        None => return Err(AstError::malformed(SOURCES, "missing `sources`")),
    };

    let entries = sources.iter().collect::<Vec<_>>();
    let units = build_units(&entries)?;
    tracing::debug!(units = units.len(), "Built source units");

    Ok(resolver.resolve(units))
}

#[cfg(feature = "parallel")]
fn build_units(entries: &[(&String, &Value)]) -> Result<Vec<SourceUnit>> {
    use rayon::prelude::*;

    entries
        .par_iter()
        .map(|(path, source)| build_unit(path, source))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn build_units(entries: &[(&String, &Value)]) -> Result<Vec<SourceUnit>> {
    entries
        .iter()
        .map(|(path, source)| build_unit(path, source))
        .collect()
}

fn build_unit(path: &str, source: &Value) -> Result<SourceUnit> {
    let ast = source
        .get(AST)
        .ok_or_else(|| AstError::malformed(path, "source entry has no `ast`"))?;
    let ast = from_ast(ast)?;
    tracing::debug!(path, nodes = ast.len(), "Built source unit");

    Ok(SourceUnit::new(path, ast))
}

/// Builds a tree from a single AST object. Dependencies are not resolved.
pub fn from_ast(ast: &Value) -> Result<Ast> {
    Ast::from_json(ast)
}

/// Accepts either a standard-output document or a bare AST object.
///
/// A bare AST becomes a single unit named after its `absolutePath`, or
/// `<ast>` when it has none.
pub fn from_json(document: &Value) -> Result<Vec<SourceUnit>> {
    if document.get(SOURCES).is_some() {
        return from_standard_output(document);
    }
    if document.get(attr_keys::NODE_TYPE).is_some() {
        let ast = from_ast(document)?;
        let path = ast
            .root()
            .str_attr(attr_keys::ABSOLUTE_PATH)
            .unwrap_or("<ast>")
            .to_string();
        return Ok(vec![SourceUnit::new(path, ast)]);
    }

    Err(AstError::malformed(
        "<document>",
        "expected a `sources` object or an AST object with a `nodeType`",
    ))
}

/// Reads and builds a standard-output document (or bare AST) from disk.
#[cfg(feature = "file-io")]
pub fn from_standard_output_file(path: impl AsRef<std::path::Path>) -> Result<Vec<SourceUnit>> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "Reading compiler output");

    let reader = std::io::BufReader::new(std::fs::File::open(path)?);
    let document: Value = serde_json::from_reader(reader)?;
    from_json(&document)
}
