//! Type declarations written as expressions.
//!
//! ```text
//! string | number | bool | any
//! list(T) | set(T) | map(T)
//! tuple([T, ...])
//! object({ name = T, other = optional(T) })
//! ```

use thiserror::Error;

use crate::base::TextRange;
use crate::syntax::{Expr, ObjectItem};
use crate::ty::{ObjectType, Type};

/// Why an expression is not a valid type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeExprError {
    #[error("unknown type keyword {0:?}")]
    UnknownKeyword(String),
    #[error("unknown type constructor {0:?}")]
    UnknownConstructor(String),
    #[error("{name}() expects {expected} argument(s)")]
    Arity { name: String, expected: usize },
    #[error("optional() is only valid for object attributes")]
    OptionalOutsideObject,
    #[error("invalid object attribute name")]
    AttributeName,
    #[error("expected a type expression")]
    NotAType(TextRange),
}

/// Parse a type declaration expression.
pub fn type_from_expr(expr: &Expr) -> Result<Type, TypeExprError> {
    match expr {
        Expr::Parens { inner, .. } => type_from_expr(inner),
        Expr::Traversal(t) if t.steps.is_empty() => match t.root.as_str() {
            "string" => Ok(Type::String),
            "number" => Ok(Type::Number),
            "bool" => Ok(Type::Bool),
            "any" => Ok(Type::Dynamic),
            other => Err(TypeExprError::UnknownKeyword(other.to_string())),
        },
        Expr::FunctionCall { name, args, .. } => match name.as_str() {
            "list" => Ok(Type::list(single_arg(name, args)?)),
            "set" => Ok(Type::set(single_arg(name, args)?)),
            "map" => Ok(Type::map(single_arg(name, args)?)),
            "tuple" => match args.as_slice() {
                [Expr::Tuple { elements, .. }] => {
                    Ok(Type::Tuple(elements.iter().map(type_from_expr).collect::<Result<_, _>>()?))
                }
                [other] => Err(TypeExprError::NotAType(other.range())),
                _ => Err(arity(name, 1)),
            },
            "object" => match args.as_slice() {
                [Expr::Object { items, .. }] => object_type(items).map(Type::Object),
                [other] => Err(TypeExprError::NotAType(other.range())),
                _ => Err(arity(name, 1)),
            },
            "optional" => Err(TypeExprError::OptionalOutsideObject),
            other => Err(TypeExprError::UnknownConstructor(other.to_string())),
        },
        other => Err(TypeExprError::NotAType(other.range())),
    }
}

fn single_arg(name: &str, args: &[Expr]) -> Result<Type, TypeExprError> {
    match args {
        [arg] => type_from_expr(arg),
        _ => Err(arity(name, 1)),
    }
}

fn arity(name: &str, expected: usize) -> TypeExprError {
    TypeExprError::Arity {
        name: name.to_string(),
        expected,
    }
}

fn object_type(items: &[ObjectItem]) -> Result<ObjectType, TypeExprError> {
    let mut obj = ObjectType::default();
    for item in items {
        let name = item.key.as_object_key().ok_or(TypeExprError::AttributeName)?;
        let ty = match &item.value {
            // optional(T) or optional(T, default)
            Expr::FunctionCall { name: f, args, .. } if f == "optional" => match args.as_slice() {
                [ty] | [ty, _] => {
                    obj.optional.insert(name.clone());
                    type_from_expr(ty)?
                }
                _ => return Err(arity("optional", 1)),
            },
            value => type_from_expr(value)?,
        };
        obj.attributes.insert(name, ty);
    }
    Ok(obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextSize;
    use crate::parser::parse_expression;
    use rstest::rstest;

    fn parse_type(input: &str) -> Result<Type, TypeExprError> {
        let (expr, errors) = parse_expression(input, TextSize::new(0));
        assert!(errors.is_empty(), "{:?}", errors);
        type_from_expr(&expr)
    }

    #[rstest]
    #[case("string", Type::String)]
    #[case("any", Type::Dynamic)]
    #[case("list(number)", Type::list(Type::Number))]
    #[case("map(set(bool))", Type::map(Type::set(Type::Bool)))]
    #[case("tuple([string, number])", Type::Tuple(vec![Type::String, Type::Number]))]
    #[case(
        "object({ name = string, port = optional(number, 80) })",
        Type::object_with_optional([("name", Type::String), ("port", Type::Number)], ["port"])
    )]
    fn test_valid_types(#[case] input: &str, #[case] expected: Type) {
        assert_eq!(parse_type(input), Ok(expected));
    }

    #[rstest]
    #[case("strng")]
    #[case("list(string, number)")]
    #[case("optional(string)")]
    #[case("frobnicate(string)")]
    #[case("\"string\"")]
    fn test_invalid_types(#[case] input: &str) {
        assert!(parse_type(input).is_err());
    }
}
