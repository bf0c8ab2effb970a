//! Evaluation of expressions without any variables or functions in scope.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::ast::{BinaryOp, Expr, TemplatePart, UnaryOp};
use crate::ty::{EvalError, Value};

impl Expr {
    /// Evaluate the expression statically.
    ///
    /// Fails on anything that needs variables or function calls, and on
    /// expressions that did not parse.
    pub fn value(&self) -> Result<Value, EvalError> {
        match self {
            Expr::Literal { value, .. } => Ok(value.clone()),
            Expr::Template { parts, .. } => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Literal { text, .. } => out.push_str(text),
                        TemplatePart::Interpolation(inner) => {
                            let value = inner.value()?;
                            let text = value.to_template_string().ok_or_else(|| {
                                EvalError::operand("template", "cannot interpolate a collection")
                            })?;
                            out.push_str(&text);
                        }
                    }
                }
                Ok(Value::String(SmolStr::new(out)))
            }
            Expr::Traversal(t) => Err(EvalError::Variables(t.root.to_string())),
            Expr::Relative { .. } => Err(EvalError::Unsupported("index into a value")),
            Expr::Tuple { elements, .. } => elements
                .iter()
                .map(Expr::value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Tuple),
            Expr::Object { items, .. } => {
                let mut attrs = IndexMap::new();
                for item in items {
                    let key = item.key.as_object_key().ok_or(EvalError::ObjectKey)?;
                    attrs.insert(key, item.value.value()?);
                }
                Ok(Value::Object(attrs))
            }
            Expr::FunctionCall { name, .. } => Err(EvalError::FunctionCall(name.to_string())),
            Expr::For(_) => Err(EvalError::Unsupported("for expression")),
            Expr::Conditional {
                cond,
                then,
                otherwise,
                ..
            } => match cond.value()? {
                Value::Bool(true) => then.value(),
                Value::Bool(false) => otherwise.value(),
                _ => Err(EvalError::operand("?", "condition must be a bool")),
            },
            Expr::Binary { op, lhs, rhs, .. } => binary(*op, lhs.value()?, rhs.value()?),
            Expr::Unary { op, operand, .. } => match (op, operand.value()?) {
                (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (UnaryOp::Neg, _) => Err(EvalError::operand("-", "expected a number")),
                (UnaryOp::Not, _) => Err(EvalError::operand("!", "expected a bool")),
            },
            Expr::Parens { inner, .. } => inner.value(),
            Expr::Empty(_) | Expr::Invalid(_) => Err(EvalError::Invalid),
        }
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    use BinaryOp::*;

    let numbers = || match (number_operand(&lhs), number_operand(&rhs)) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(EvalError::operand(op.as_str(), "expected number operands")),
    };

    let value = match op {
        Eq => Value::Bool(lhs == rhs),
        NotEq => Value::Bool(lhs != rhs),
        Or | And => match (&lhs, &rhs) {
            (Value::Bool(a), Value::Bool(b)) if op == Or => Value::Bool(*a || *b),
            (Value::Bool(a), Value::Bool(b)) => Value::Bool(*a && *b),
            _ => return Err(EvalError::operand(op.as_str(), "expected bool operands")),
        },
        Lt => numbers().map(|(a, b)| Value::Bool(a < b))?,
        LtEq => numbers().map(|(a, b)| Value::Bool(a <= b))?,
        Gt => numbers().map(|(a, b)| Value::Bool(a > b))?,
        GtEq => numbers().map(|(a, b)| Value::Bool(a >= b))?,
        Add => numbers().map(|(a, b)| Value::Number(a + b))?,
        Sub => numbers().map(|(a, b)| Value::Number(a - b))?,
        Mul => numbers().map(|(a, b)| Value::Number(a * b))?,
        Div | Mod => {
            let (a, b) = numbers()?;
            if b == 0.0 {
                return Err(EvalError::operand(op.as_str(), "division by zero"));
            }
            Value::Number(if op == Div { a / b } else { a % b })
        }
    };
    Ok(value)
}

/// Numbers, and strings that parse as numbers, are valid arithmetic operands.
fn number_operand(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(*n),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
