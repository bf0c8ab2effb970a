//! Properties every collection must hold regardless of input.

use hclref::base::Address;
use hclref::hir::{
    Origins, Targets, TypedExpr, collect_reference_origins, collect_reference_targets,
};
use hclref::parser::{parse, parse_expression};
use hclref::schema::{
    AddrStep, AttributeAddrSchema, AttributeSchema, BodySchema, Constraint, ObjectAttribute,
};
use hclref::ty::Type;
use rstest::rstest;
use tokio_util::sync::CancellationToken;

use crate::helpers::decoder_helpers::target_addresses;
use crate::helpers::schema_fixtures::{OUTPUTS, RESOURCES, VARIABLES, config_schema};

fn collect(source: &str, schema: &BodySchema) -> (Targets, Origins) {
    let parse = parse(source);
    let cancel = CancellationToken::new();
    let targets = collect_reference_targets("main.hcl", &parse.body, schema, &cancel).unwrap();
    let origins = collect_reference_origins("main.hcl", &parse.body, schema, &cancel).unwrap();
    (targets, origins)
}

#[rstest]
#[case(VARIABLES)]
#[case(RESOURCES)]
#[case(OUTPUTS)]
fn test_collection_is_idempotent(#[case] source: &str) {
    let schema = config_schema();
    assert_eq!(collect(source, &schema), collect(source, &schema));
}

#[test]
fn test_one_of_is_deterministic() {
    let constraint = Constraint::OneOf(vec![
        Constraint::list(Type::String.into()),
        Constraint::list(Type::Dynamic.into()),
    ]);
    let schema = BodySchema::new().with_attribute(
        "attr",
        AttributeSchema::new(constraint)
            .with_address(AttributeAddrSchema::new([AddrStep::AttrName]).as_expr_type()),
    );
    let first = collect(r#"attr = ["a"]"#, &schema).0;
    for _ in 0..10 {
        assert_eq!(collect(r#"attr = ["a"]"#, &schema).0, first);
    }
    assert_eq!(first.as_slice()[0].ty, Some(Type::list(Type::String)));
}

// Every target produced under an attribute or object key is addressed by
// that name.
#[rstest]
#[case("a = 1", vec!["a"])]
#[case("a = { b = 1, c = \"x\" }", vec!["a", "a.b", "a.c"])]
#[case("a = { c = \"x\", b = 1 }", vec!["a", "a.c", "a.b"])]
fn test_round_trip_addressing(#[case] source: &str, #[case] expected: Vec<&str>) {
    let schema = BodySchema::new().with_any_attribute(
        AttributeSchema::new(Constraint::OneOf(vec![
            Type::Number.into(),
            Constraint::object([
                ("b", ObjectAttribute::required(Type::Number.into())),
                ("c", ObjectAttribute::required(Type::String.into())),
            ]),
        ]))
        .with_address(AttributeAddrSchema::new([AddrStep::AttrName]).as_expr_type()),
    );
    let (targets, _) = collect(source, &schema);
    assert_eq!(target_addresses(&targets), expected);

    // the text at each definition range parses back to the terminal step
    for target in targets.deep_iter() {
        let def = target.def_range.as_ref().unwrap();
        let (expr, errors) = parse_expression(&source[def.range], 0.into());
        assert!(errors.is_empty(), "{:?}", errors);
        let name = target.address.last().and_then(|step| step.name()).unwrap();
        assert_eq!(
            expr.as_traversal().and_then(|t| t.address()),
            Some(Address::root(name)),
            "definition of {}",
            target.address
        );
    }
}

// A container literal type behaves exactly like the matching container
// constraint over literal element types.
#[rstest]
#[case("[1, 2]", Type::list(Type::Number))]
#[case("[\"a\"]", Type::set(Type::String))]
#[case("{ x = true }", Type::map(Type::Bool))]
#[case("{ x = 1, y = \"s\" }", Type::object([("x", Type::Number), ("y", Type::String)]))]
#[case("[1, \"s\"]", Type::Tuple(vec![Type::Number, Type::String]))]
fn test_container_homomorphism(#[case] source: &str, #[case] ty: Type) {
    let (expr, errors) = parse_expression(source, 0.into());
    assert!(errors.is_empty(), "{:?}", errors);
    let constraint = Constraint::for_container_type(&ty).unwrap();
    let literal = Constraint::LiteralType(ty);

    let by_literal = TypedExpr::new("main.hcl", &expr, &literal);
    let by_container = TypedExpr::new("main.hcl", &expr, &constraint);
    assert_eq!(by_literal.infer_type(), by_container.infer_type());
    assert_eq!(by_literal.accepts(), by_container.accepts());
}

#[test]
fn test_graceful_degradation() {
    let schema = config_schema();
    let source = format!("{}\nvariable {{\n}}\n{}", VARIABLES, OUTPUTS);
    let (targets, origins) = collect(&source, &schema);
    let (clean_targets, _) = collect(&format!("{}\n{}", VARIABLES, OUTPUTS), &schema);

    // the unlabeled variable is skipped and nothing else changes
    assert_eq!(target_addresses(&targets), target_addresses(&clean_targets));
    assert_eq!(origins.len(), 2);
}
