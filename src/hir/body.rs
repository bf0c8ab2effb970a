//! Schema lookups shared by the target and origin collectors.

use std::borrow::Cow;

use smol_str::SmolStr;
use tracing::trace;

use crate::base::{Address, Step};
use crate::schema::{AddrStep, BlockSchema, BodySchema};
use crate::syntax::{Attribute, Block, Body, Expr};
use crate::ty::Value;

/// Effective schema of one block instance.
pub(crate) struct BlockBody<'s> {
    /// Declared body merged with the selected dependent body, if any.
    pub schema: Cow<'s, BodySchema>,
    pub dependent: Option<&'s BodySchema>,
}

/// Pick the dependent body a block's labels and attributes select.
pub(crate) fn resolve_block_body<'s>(block: &Block, schema: &'s BlockSchema) -> BlockBody<'s> {
    if schema.dependent_body.is_empty() {
        return BlockBody {
            schema: Cow::Borrowed(&schema.body),
            dependent: None,
        };
    }

    let labels = block.label_values();
    let lookup = |name: &str| block.body.attribute(name).and_then(|attr| static_value(&attr.expr));
    let dependent = schema.dependent_body_for(&labels, &lookup);
    if dependent.is_none() {
        trace!(
            "[SCHEMA] no dependent body for {} {:?}",
            block.ty,
            labels
        );
    }
    BlockBody {
        schema: match dependent {
            Some(dep) => Cow::Owned(schema.body.merged_with(dep)),
            None => Cow::Borrowed(&schema.body),
        },
        dependent,
    }
}

/// Static value of an expression; bare keywords count as strings.
fn static_value(expr: &Expr) -> Option<Value> {
    expr.value()
        .ok()
        .or_else(|| expr.as_keyword().map(Value::string))
}

/// The syntax an address schema is applied to.
#[derive(Clone, Copy)]
pub(crate) enum AddrNode<'a> {
    /// An attribute and the body it belongs to.
    Attribute(&'a Attribute, &'a Body),
    Block(&'a Block),
}

/// Build an address from schema steps.
///
/// Returns `None` when a step cannot be resolved, e.g. a label that is
/// missing or an attribute value that is not a static string.
pub(crate) fn resolve_address(steps: &[AddrStep], node: AddrNode<'_>) -> Option<Address> {
    let mut address = Address::default();
    for step in steps {
        let name = match step {
            AddrStep::Static(name) => name.clone(),
            AddrStep::AttrName => match node {
                AddrNode::Attribute(attr, _) => attr.name.clone(),
                AddrNode::Block(_) => return None,
            },
            AddrStep::Label(index) => match node {
                AddrNode::Block(block) => block.labels.get(*index)?.value.clone(),
                AddrNode::Attribute(..) => return None,
            },
            AddrStep::AttrValue { name, is_optional } => {
                let body = match node {
                    AddrNode::Attribute(_, body) => body,
                    AddrNode::Block(block) => &block.body,
                };
                let value = body
                    .attribute(name)
                    .and_then(|attr| static_value(&attr.expr))
                    .and_then(|value| value.as_str().map(SmolStr::from));
                match value {
                    Some(value) => value,
                    None if *is_optional => continue,
                    None => return None,
                }
            }
        };
        address = address.join(Step::attr(name));
    }
    if address.is_empty() { None } else { Some(address) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::schema::{DependencyKeys, LabelSchema};
    use rstest::rstest;

    fn first_block(input: &str) -> Block {
        let parse = parse(input);
        assert!(parse.ok(), "{:?}", parse.errors);
        parse.body.blocks().next().cloned().unwrap()
    }

    #[rstest]
    #[case(vec![AddrStep::stat("var"), AddrStep::Label(0)], Some("var.region"))]
    #[case(vec![AddrStep::Label(0), AddrStep::attr_value("name")], Some("region.main"))]
    #[case(vec![AddrStep::stat("x"), AddrStep::Label(3)], None)]
    #[case(vec![AddrStep::stat("x"), AddrStep::attr_value("missing")], None)]
    #[case(vec![AddrStep::AttrName], None)]
    fn test_block_address(#[case] steps: Vec<AddrStep>, #[case] expected: Option<&str>) {
        let block = first_block("variable \"region\" {\n  name = \"main\"\n}\n");
        let address = resolve_address(&steps, AddrNode::Block(&block));
        assert_eq!(address.map(|a| a.to_string()).as_deref(), expected);
    }

    #[test]
    fn test_optional_attribute_value_step() {
        let block = first_block("thing {}\n");
        let steps = vec![
            AddrStep::stat("thing"),
            AddrStep::AttrValue {
                name: "alias".into(),
                is_optional: true,
            },
        ];
        let address = resolve_address(&steps, AddrNode::Block(&block));
        assert_eq!(address, Some(Address::root("thing")));
    }

    #[test]
    fn test_attribute_address() {
        let parse = parse("kind = other\nname = 1\n");
        let body = &parse.body;
        let attr = body.attribute("name").unwrap();
        let steps = vec![AddrStep::attr_value("kind"), AddrStep::AttrName];
        let address = resolve_address(&steps, AddrNode::Attribute(attr, body));
        assert_eq!(address, Some(Address::from_names(["other", "name"])));
    }

    #[test]
    fn test_dependent_body_by_label_and_attribute() {
        let schema = BlockSchema::new(BodySchema::new())
            .with_labels([LabelSchema::dep_key("type")])
            .with_dependent_body(
                DependencyKeys::label(0, "a").and_attribute("mode", Value::string("fast")),
                BodySchema::new().with_block("fast", BlockSchema::default()),
            )
            .with_dependent_body(
                DependencyKeys::label(0, "a"),
                BodySchema::new().with_block("plain", BlockSchema::default()),
            );

        let fast = first_block("thing \"a\" {\n  mode = fast\n}\n");
        let resolved = resolve_block_body(&fast, &schema);
        assert!(resolved.schema.blocks.contains_key("fast"));

        let plain = first_block("thing \"a\" {}\n");
        let resolved = resolve_block_body(&plain, &schema);
        assert!(resolved.schema.blocks.contains_key("plain"));

        let none = first_block("thing \"b\" {}\n");
        let resolved = resolve_block_body(&none, &schema);
        assert!(resolved.dependent.is_none());
        assert!(resolved.schema.blocks.is_empty());
    }
}
