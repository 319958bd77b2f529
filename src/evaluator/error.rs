use thiserror::Error;

/// Typed message carrier inside [`Value::Error`](super::value::Value).
///
/// These are runtime values, not Rust errors: evaluation never unwinds, it
/// hands an `Error` value back through every composition point instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("identifier not found: {name}")]
    IdentifierNotFound { name: String },
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: &'static str,
        operator: String,
        right: &'static str,
    },
    #[error("unknown operator: {operator}")]
    UnknownOperator { operator: String },
    #[error("unknown operator: {operator}{kind}")]
    UnknownPrefixOperator {
        operator: String,
        kind: &'static str,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("not a function: {kind}")]
    NotAFunction { kind: &'static str },
    #[error("property '{property}' not found on built-in object")]
    PropertyNotFound { property: String },
    #[error("property access not implemented for {kind}")]
    PropertyAccessUnimplemented { kind: &'static str },
    #[error("cannot access property '{property}' of type {kind}")]
    PropertyUnsupported {
        property: String,
        kind: &'static str,
    },
}
