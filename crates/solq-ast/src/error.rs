use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

/// Result type for tree construction and query operations.
pub type Result<T> = std::result::Result<T, AstError>;

#[derive(Debug, Error, Diagnostic)]
pub enum AstError {
    #[error("Malformed input at `{context}`: {reason}")]
    #[diagnostic(
        code(solq_ast::malformed_input),
        help("Every object carrying a `nodeType` needs a `src` of the form `start:length:scope`.")
    )]
    MalformedInput { context: SmolStr, reason: String },

    #[error("No child named `{0}`")]
    #[diagnostic(code(solq_ast::not_found))]
    NotFound(SmolStr),

    #[error("Depth {requested} is out of range for a node at depth {depth}")]
    #[diagnostic(
        code(solq_ast::out_of_range),
        help("Ancestor depths must resolve to a value between 0 and the node depth (exclusive).")
    )]
    OutOfRange { requested: isize, depth: usize },

    #[error("Filters must be an object or a list of objects, found {found}")]
    #[diagnostic(code(solq_ast::type_mismatch))]
    TypeMismatch { found: &'static str },

    #[error("`{node_type}` has no source location")]
    #[diagnostic(code(solq_ast::missing_location))]
    MissingLocation { node_type: SmolStr },

    #[error(transparent)]
    #[diagnostic(code(solq_ast::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(solq_ast::io))]
    Io(#[from] std::io::Error),
}

impl AstError {
    pub(crate) fn malformed(context: impl Into<SmolStr>, reason: impl Into<String>) -> Self {
        AstError::MalformedInput {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Short name of a JSON value's kind, used in error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}
