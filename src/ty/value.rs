use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;
use thiserror::Error;

use super::Type;

/// A literal value produced by evaluating an expression without variables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(SmolStr),
    Tuple(Vec<Value>),
    Object(IndexMap<SmolStr, Value>),
}

impl Value {
    pub fn string(s: impl Into<SmolStr>) -> Self {
        Value::String(s.into())
    }

    /// Structural type of the value. `null` has no type of its own.
    pub fn ty(&self) -> Type {
        match self {
            Value::Null => Type::Dynamic,
            Value::Bool(_) => Type::Bool,
            Value::Number(_) => Type::Number,
            Value::String(_) => Type::String,
            Value::Tuple(elems) => Type::Tuple(elems.iter().map(Value::ty).collect()),
            Value::Object(attrs) => {
                Type::object(attrs.iter().map(|(name, v)| (name.clone(), v.ty())))
            }
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The value as a whole number, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() => Some(*n as i64),
            _ => None,
        }
    }

    /// Render a primitive for string interpolation.
    pub fn to_template_string(&self) -> Option<SmolStr> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(SmolStr::new(if *b { "true" } else { "false" })),
            Value::Number(n) => Some(SmolStr::new(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s.as_str()),
            Value::Tuple(elems) => {
                f.write_str("[")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                f.write_str("]")
            }
            Value::Object(attrs) => {
                f.write_str("{")?;
                for (i, (name, v)) in attrs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", name, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Errors from evaluating an expression without any variables in scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The expression refers to a variable.
    #[error("variables not allowed here: {0}")]
    Variables(String),

    /// The expression calls a function.
    #[error("function calls not allowed here: {0}()")]
    FunctionCall(String),

    /// An operator was applied to operands of the wrong type.
    #[error("invalid operand for {op}: {message}")]
    Operand { op: &'static str, message: String },

    /// An object key did not evaluate to a string.
    #[error("object key must be a string")]
    ObjectKey,

    /// The expression cannot be evaluated statically.
    #[error("unsupported expression: {0}")]
    Unsupported(&'static str),

    /// The expression is missing or failed to parse.
    #[error("invalid expression")]
    Invalid,
}

impl EvalError {
    pub fn operand(op: &'static str, message: impl Into<String>) -> Self {
        Self::Operand {
            op,
            message: message.into(),
        }
    }
}
