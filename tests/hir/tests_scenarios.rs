//! End-to-end target collection for the canonical attribute and block cases.

use hclref::base::{Address, Step};
use hclref::hir::{Targets, collect_reference_targets};
use hclref::parser::parse;
use hclref::schema::{
    AddrStep, AttributeAddrSchema, AttributeSchema, BlockAddrSchema, BlockSchema, BodySchema,
    Constraint, ObjectAttribute,
};
use hclref::ty::Type;
use hclref::{TextRange, TextSize};
use tokio_util::sync::CancellationToken;

fn targets_of(source: &str, schema: &BodySchema) -> Targets {
    let parse = parse(source);
    assert!(parse.ok(), "Parse errors: {:?}", parse.errors);
    collect_reference_targets("main.hcl", &parse.body, schema, &CancellationToken::new())
        .expect("not cancelled")
}

fn attr_schema(constraint: Constraint) -> BodySchema {
    BodySchema::new().with_attribute(
        "attr",
        AttributeSchema::new(constraint)
            .with_address(AttributeAddrSchema::new([AddrStep::AttrName]).as_expr_type()),
    )
}

// =============================================================================
// ATTRIBUTES
// =============================================================================

#[test]
fn test_scalar_assigned_to_list_attribute() {
    let schema = attr_schema(Constraint::list(Type::Bool.into()));
    assert!(targets_of("attr = true", &schema).is_empty());
}

#[test]
fn test_empty_list_attribute() {
    let schema = attr_schema(Constraint::list(Type::Bool.into()));
    let targets = targets_of("attr = []", &schema);

    assert_eq!(targets.len(), 1);
    let attr = &targets.as_slice()[0];
    assert_eq!(attr.address, Address::root("attr"));
    assert_eq!(attr.range.range, TextRange::new(0.into(), 9.into()));
    assert_eq!(attr.ty, Some(Type::list(Type::Bool)));
    assert!(attr.nested.is_empty());
}

#[test]
fn test_list_attribute_with_invalid_element() {
    let schema = attr_schema(Constraint::list(Type::String.into()));
    let targets = targets_of(r#"attr = ["one", 42, "two"]"#, &schema);

    assert_eq!(targets.len(), 1);
    let attr = &targets.as_slice()[0];
    assert_eq!(attr.ty, Some(Type::list(Type::String)));

    let nested: Vec<_> = attr.nested.iter().map(|t| t.address.clone()).collect();
    assert_eq!(
        nested,
        vec![
            Address::new(vec![Step::root("attr"), Step::index(0)]),
            Address::new(vec![Step::root("attr"), Step::index(2)]),
        ]
    );
    for element in attr.nested.iter() {
        assert_eq!(element.ty, Some(Type::String));
    }
}

// =============================================================================
// BLOCKS
// =============================================================================

#[test]
fn test_implied_attribute_of_empty_block() {
    let schema = BodySchema::new().with_block(
        "blk",
        BlockSchema::new(BodySchema::new().with_attribute(
            "attr",
            AttributeSchema::new(Constraint::list(Type::Bool.into())),
        ))
        .with_address(BlockAddrSchema::new([AddrStep::stat("blk")]).infer_body().body_as_data()),
    );
    let source = "blk {}";
    let targets = targets_of(source, &schema);

    assert_eq!(targets.len(), 1);
    let blk = &targets.as_slice()[0];
    assert_eq!(blk.address, Address::root("blk"));
    assert_eq!(blk.ty, Some(Type::object([("attr", Type::list(Type::Bool))])));

    assert_eq!(blk.nested.len(), 1);
    let attr = &blk.nested.as_slice()[0];
    assert_eq!(attr.address, Address::from_names(["blk", "attr"]));
    let brace = TextSize::from(source.find('{').unwrap() as u32);
    assert_eq!(attr.range.range, TextRange::empty(brace));
}

#[test]
fn test_object_with_optional_attribute_declared_expression() {
    let schema = attr_schema(Constraint::object([
        ("bar", ObjectAttribute::required(Type::Number.into())),
        ("foo", ObjectAttribute::optional(Type::String.into())),
    ]));
    let targets = targets_of("attr = {\n  bar = 42\n}\n", &schema);

    assert_eq!(targets.len(), 1);
    let attr = &targets.as_slice()[0];
    assert_eq!(
        attr.ty,
        Some(Type::object_with_optional(
            [("foo", Type::String), ("bar", Type::Number)],
            ["foo"]
        ))
    );
    let nested: Vec<_> = attr.nested.iter().map(|t| t.address.to_string()).collect();
    assert_eq!(nested, vec!["attr.bar"]);
    assert_eq!(attr.nested.as_slice()[0].ty, Some(Type::Number));
}
