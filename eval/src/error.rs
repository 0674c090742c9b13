//! Evaluation error types.

use thiserror::Error;

/// Result type for expression evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors raised while evaluating an expression.
///
/// All of these are expression-level defects: they fail the owning
/// constraint unconditionally, independent of the data under evaluation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EvalError {
    #[error("Unknown function: {name}()")]
    UnknownFunction { name: String },

    #[error("Function {name}() called with {given} argument(s), expected {expected}")]
    FunctionArity {
        name: String,
        given: usize,
        expected: String,
    },

    #[error("Function {name}() requires a node-set argument")]
    NodeSetRequired { name: String },
}

impl EvalError {
    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::UnknownFunction { name: name.into() }
    }

    pub fn arity(name: impl Into<String>, given: usize, expected: impl Into<String>) -> Self {
        Self::FunctionArity {
            name: name.into(),
            given,
            expected: expected.into(),
        }
    }

    pub fn node_set_required(name: impl Into<String>) -> Self {
        Self::NodeSetRequired { name: name.into() }
    }
}
