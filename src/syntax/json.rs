//! Lowering of JSON documents into [`Body`] trees.
//!
//! JSON has no syntax for blocks, labels or traversals, so the shape of the
//! resulting body depends on the schema: a key declared as a block becomes
//! one block per nested label object (or array element), a key declared as
//! an attribute becomes an attribute. Strings containing `${` are parsed as
//! templates, and strings in positions that expect a traversal, keyword or
//! type are parsed as native expressions.

use std::borrow::Cow;

use smol_str::SmolStr;
use text_size::TextRange;

use super::ast::{Attribute, Block, Body, BodyItem, Expr, Label, ObjectItem};
use crate::parser::{
    JsonKind, JsonProperty, JsonString, JsonValue, SyntaxError, parse_expression, parse_template,
};
use crate::schema::{BlockSchema, BodySchema, Constraint};
use crate::ty::{Type, Value};

/// Lower a parsed JSON document under `schema`.
pub fn lower_json(root: &JsonValue, schema: &BodySchema) -> (Body, Vec<SyntaxError>) {
    let mut lowering = Lowering::default();
    let body = match root.as_object() {
        Some(props) => lowering.body(props, schema, root.range),
        None => {
            lowering
                .errors
                .push(SyntaxError::new("root of a JSON document must be an object", root.range));
            Body::empty(root.range)
        }
    };
    (body, lowering.errors)
}

#[derive(Default)]
struct Lowering {
    errors: Vec<SyntaxError>,
}

impl Lowering {
    fn body(&mut self, props: &[JsonProperty], schema: &BodySchema, range: TextRange) -> Body {
        let mut items = Vec::new();
        for prop in props {
            if prop.key.starts_with("//") {
                continue;
            }
            if let Some(block_schema) = schema.blocks.get(prop.key.as_str()) {
                let mut labels = Vec::new();
                self.blocks(prop, block_schema, &prop.value, &mut labels, &mut items);
                continue;
            }
            let constraint = schema.attribute_schema(&prop.key).map(|a| &a.constraint);
            items.push(BodyItem::Attribute(Attribute {
                name: prop.key.clone(),
                name_range: prop.key_range,
                expr: self.expr(&prop.value, constraint),
                range: prop.key_range.cover(prop.value.range),
            }));
        }
        Body::new(items, range)
    }

    /// Walk label objects down to block bodies. Arrays are allowed at any
    /// level to repeat blocks.
    fn blocks(
        &mut self,
        ty: &JsonProperty,
        schema: &BlockSchema,
        value: &JsonValue,
        labels: &mut Vec<Label>,
        out: &mut Vec<BodyItem>,
    ) {
        match &value.kind {
            JsonKind::Array(elems) => {
                for elem in elems {
                    self.blocks(ty, schema, elem, labels, out);
                }
            }
            JsonKind::Object(props) if labels.len() < schema.labels.len() => {
                for prop in props.iter().filter(|p| !p.key.starts_with("//")) {
                    labels.push(Label {
                        value: prop.key.clone(),
                        range: prop.key_range,
                    });
                    self.blocks(ty, schema, &prop.value, labels, out);
                    labels.pop();
                }
            }
            JsonKind::Object(props) => {
                let label_values: Vec<&str> = labels.iter().map(|l| l.value.as_str()).collect();
                let lookup = |name: &str| {
                    props
                        .iter()
                        .find(|p| p.key == name)
                        .and_then(|p| static_value(&p.value))
                };
                let body_schema = match schema.dependent_body_for(&label_values, &lookup) {
                    Some(dep) => Cow::Owned(schema.body.merged_with(dep)),
                    None => Cow::Borrowed(&schema.body),
                };
                let body = self.body(props, &body_schema, value.range);
                out.push(BodyItem::Block(Block {
                    ty: ty.key.clone(),
                    ty_range: ty.key_range,
                    labels: labels.clone(),
                    body,
                    range: ty.key_range.cover(value.range),
                }));
            }
            _ => self.errors.push(SyntaxError::new(
                format!("expected an object for block {:?}", ty.key.as_str()),
                value.range,
            )),
        }
    }

    fn expr(&mut self, value: &JsonValue, constraint: Option<&Constraint>) -> Expr {
        let range = value.range;
        match &value.kind {
            JsonKind::Null => Expr::Literal {
                value: Value::Null,
                range,
            },
            JsonKind::Bool(b) => Expr::Literal {
                value: Value::Bool(*b),
                range,
            },
            JsonKind::Number(n) => Expr::Literal {
                value: Value::Number(*n),
                range,
            },
            JsonKind::String(s) => self.string(value, s, constraint),
            JsonKind::Array(elems) => Expr::Tuple {
                elements: elems
                    .iter()
                    .enumerate()
                    .map(|(i, elem)| {
                        let elem_constraint = element_constraint(constraint, i);
                        self.expr(elem, elem_constraint.as_ref())
                    })
                    .collect(),
                range,
            },
            JsonKind::Object(props) => Expr::Object {
                items: props
                    .iter()
                    .map(|prop| {
                        let attr_constraint = attribute_constraint(constraint, &prop.key);
                        ObjectItem {
                            key: Expr::Literal {
                                value: Value::String(prop.key.clone()),
                                range: prop.key_range,
                            },
                            value: self.expr(&prop.value, attr_constraint.as_ref()),
                        }
                    })
                    .collect(),
                range,
            },
            JsonKind::Invalid => Expr::Invalid(range),
        }
    }

    fn string(&mut self, value: &JsonValue, s: &JsonString, constraint: Option<&Constraint>) -> Expr {
        let offset = value.content_offset();
        let is_template = s.value.contains("${") || s.value.contains("%{");

        if !is_template && constraint.is_some_and(expects_expression) {
            let (expr, errors) = parse_expression(&s.value, offset);
            if errors.is_empty() && !expr.is_empty() {
                return expr;
            }
        }

        if is_template {
            let (expr, errors) = parse_template(&s.value, offset);
            self.errors.extend(errors);
            return match expr {
                Expr::Template { parts, .. } => Expr::Template {
                    parts,
                    range: value.range,
                },
                Expr::Literal { value: v, .. } => Expr::Literal {
                    value: v,
                    range: value.range,
                },
                other => other,
            };
        }

        Expr::Literal {
            value: Value::String(s.value.clone()),
            range: value.range,
        }
    }
}

/// Positions where a plain string stands for native syntax.
fn expects_expression(constraint: &Constraint) -> bool {
    match constraint {
        Constraint::Keyword(_) | Constraint::Reference(_) | Constraint::TypeDeclaration => true,
        Constraint::OneOf(alternatives) => {
            !alternatives.is_empty() && alternatives.iter().all(expects_expression)
        }
        _ => false,
    }
}

fn static_value(value: &JsonValue) -> Option<Value> {
    match &value.kind {
        JsonKind::Null => Some(Value::Null),
        JsonKind::Bool(b) => Some(Value::Bool(*b)),
        JsonKind::Number(n) => Some(Value::Number(*n)),
        JsonKind::String(s) => Some(Value::String(s.value.clone())),
        _ => None,
    }
}

fn element_constraint(constraint: Option<&Constraint>, index: usize) -> Option<Constraint> {
    match constraint? {
        Constraint::List(elem) | Constraint::Set(elem) => Some((**elem).clone()),
        Constraint::Tuple(elems) => elems.get(index).cloned(),
        Constraint::LiteralType(Type::List(elem) | Type::Set(elem)) => {
            Some(Constraint::LiteralType((**elem).clone()))
        }
        Constraint::LiteralType(Type::Tuple(elems)) => {
            elems.get(index).cloned().map(Constraint::LiteralType)
        }
        Constraint::OneOf(alternatives) => alternatives
            .iter()
            .find_map(|alt| element_constraint(Some(alt), index)),
        _ => None,
    }
}

fn attribute_constraint(constraint: Option<&Constraint>, key: &SmolStr) -> Option<Constraint> {
    match constraint? {
        Constraint::Object(obj) => obj.attributes.get(key).map(|a| a.constraint.clone()),
        Constraint::Map(elem) => Some((**elem).clone()),
        Constraint::LiteralType(Type::Object(obj)) => {
            obj.attributes.get(key).cloned().map(Constraint::LiteralType)
        }
        Constraint::LiteralType(Type::Map(elem)) => Some(Constraint::LiteralType((**elem).clone())),
        Constraint::OneOf(alternatives) => alternatives
            .iter()
            .find_map(|alt| attribute_constraint(Some(alt), key)),
        _ => None,
    }
}
