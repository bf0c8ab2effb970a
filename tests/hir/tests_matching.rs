//! Matching origins against targets collected from several files.

use hclref::base::{Address, FileRange, ScopeId};
use hclref::hir::{
    Origin, OriginConstraint, Origins, Target, Targets, collect_reference_origins,
    collect_reference_targets,
};
use hclref::parser::parse;
use hclref::schema::BodySchema;
use hclref::ty::Type;
use hclref::{TextRange, TextSize};
use tokio_util::sync::CancellationToken;

use crate::helpers::decoder_helpers::{origin_addresses, target_addresses};
use crate::helpers::schema_fixtures::{OUTPUTS, RESOURCES, VARIABLES, config_schema};

fn workspace(schema: &BodySchema) -> (Targets, Origins) {
    let cancel = CancellationToken::new();
    let mut targets = Targets::default();
    let mut origins = Origins::default();
    for (file, source) in [
        ("variables.hcl", VARIABLES),
        ("resources.hcl", RESOURCES),
        ("outputs.hcl", OUTPUTS),
    ] {
        let parse = parse(source);
        assert!(parse.ok(), "Parse errors in '{}': {:?}", file, parse.errors);
        targets.extend(collect_reference_targets(file, &parse.body, schema, &cancel).unwrap());
        origins.extend(collect_reference_origins(file, &parse.body, schema, &cancel).unwrap());
    }
    origins.sort();
    (targets, origins)
}

fn range(start: u32, end: u32) -> FileRange {
    FileRange::new("main.hcl", TextRange::new(start.into(), end.into()))
}

#[test]
fn test_workspace_targets() {
    let (targets, _) = workspace(&config_schema());
    assert_eq!(
        target_addresses(&targets),
        vec![
            "var.region",
            "var.region",
            "var.zones",
            "var.zones",
            "aws_subnet.main",
            "aws_subnet.main",
            "aws_subnet.main.cidr_block",
            "aws_subnet.main.id",
            "aws_instance.web",
            "aws_instance.web",
            "aws_instance.web.ami",
            "aws_instance.web.subnet_id",
            "aws_instance.web.tags",
            r#"aws_instance.web.tags["Name"]"#,
            "aws_instance.web.ebs_block_device",
            "aws_instance.web.ebs_block_device[0]",
            "aws_instance.web.ebs_block_device[0].volume_size",
            "local.name",
            "local.name",
        ]
    );
}

#[test]
fn test_variable_types() {
    let (targets, _) = workspace(&config_schema());
    let typed: Vec<_> = targets
        .iter()
        .filter(|t| t.address.to_string().starts_with("var."))
        .filter_map(|t| t.ty.clone())
        .collect();
    assert_eq!(
        typed,
        vec![Type::String, Type::Tuple(vec![Type::String, Type::String])]
    );
}

#[test]
fn test_workspace_origins_sorted_by_file() {
    let (_, origins) = workspace(&config_schema());
    assert_eq!(
        origin_addresses(&origins),
        vec![
            "var.region",
            "aws_instance.web.ebs_block_device[0].volume_size",
            "aws_subnet.main.id",
        ]
    );
}

#[test]
fn test_every_origin_resolves() {
    let (targets, origins) = workspace(&config_schema());
    for origin in origins.iter() {
        let matched = targets.match_origin(origin);
        assert!(!matched.is_empty(), "{} does not resolve", origin.address);
        // only typed targets satisfy a type requirement
        assert!(matched.iter().all(|t| t.ty.is_some()));
    }
}

#[test]
fn test_origins_targeting_implied_attribute() {
    let (targets, origins) = workspace(&config_schema());
    let id = targets
        .deep_iter()
        .find(|t| t.address.to_string() == "aws_subnet.main.id")
        .unwrap();
    assert!(id.range.range.is_empty());
    assert_eq!(origin_addresses(&origins.targeting(id)), vec!["aws_subnet.main.id"]);
}

#[test]
fn test_scope_constraint() {
    let mut target = Target::new(Address::from_names(["var", "a"]), range(0, 10));
    target.scope_id = Some(ScopeId::from("variable"));

    let any = Origin::new(target.address.clone(), range(20, 25));
    let wrong_scope = any.clone().with_constraint(OriginConstraint {
        of_type: None,
        of_scope_id: Some(ScopeId::from("local")),
    });
    let either = wrong_scope.clone().with_constraint(OriginConstraint {
        of_type: None,
        of_scope_id: Some(ScopeId::from("variable")),
    });

    assert!(target.matches(&any));
    assert!(!target.matches(&wrong_scope));
    assert!(target.matches(&either));
}

#[test]
fn test_type_constraint() {
    let mut target = Target::new(Address::root("a"), range(0, 10));
    let origin = Origin::new(Address::root("a"), range(20, 21)).with_constraint(OriginConstraint {
        of_type: Some(Type::String),
        of_scope_id: None,
    });
    assert!(!target.matches(&origin));

    target.ty = Some(Type::Number);
    assert!(target.matches(&origin));

    target.ty = Some(Type::list(Type::Bool));
    assert!(!target.matches(&origin));

    target.ty = Some(Type::Dynamic);
    assert!(target.matches(&origin));
}

#[test]
fn test_local_address_window() {
    let mut target = Target::new(Address::from_names(["thing", "a"]), range(10, 12));
    target.local_address = Some(Address::from_names(["self", "a"]));
    target.targetable_from = Some(range(5, 30));

    let inside = Origin::new(Address::from_names(["self", "a"]), range(20, 26));
    let outside = Origin::new(Address::from_names(["self", "a"]), range(40, 46));
    assert!(target.matches(&inside));
    assert!(!target.matches(&outside));
    assert_eq!(
        Targets::new(vec![target]).innermost_at_pos("main.hcl", TextSize::from(11)).map(|t| t.address.to_string()),
        Some("thing.a".to_string())
    );
}
