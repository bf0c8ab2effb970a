//! Position queries: origin at cursor, go-to-target, find-origins, type.

use hclref::ide::PathContext;
use hclref::ty::Type;
use rstest::rstest;
use tokio_util::sync::CancellationToken;

use crate::helpers::decoder_helpers::{
    decoder_from_sources, offset_of, origin_addresses, target_addresses,
};
use crate::helpers::schema_fixtures::{OUTPUTS, RESOURCES, VARIABLES, config_schema};

fn workspace() -> PathContext {
    decoder_from_sources(
        config_schema(),
        &[
            ("variables.hcl", VARIABLES),
            ("resources.hcl", RESOURCES),
            ("outputs.hcl", OUTPUTS),
        ],
    )
    .path_context()
    .unwrap()
}

#[test]
fn test_origin_at_pos() {
    let ctx = workspace();
    let pos = offset_of(OUTPUTS, "region\n");
    let origin = ctx.reference_origin_at_pos("outputs.hcl", pos).unwrap().unwrap();
    assert_eq!(origin.address.to_string(), "var.region");
    assert_eq!(origin.range.file, "outputs.hcl");

    let outside = offset_of(OUTPUTS, "locals");
    assert_eq!(ctx.reference_origin_at_pos("outputs.hcl", outside).unwrap(), None);
}

// The position query agrees with filtering the full collection.
#[rstest]
#[case("var.region")]
#[case("value")]
#[case("ebs_block_device[0]")]
#[case("volume_size")]
#[case("\"size\"")]
fn test_origin_at_pos_agrees_with_collection(#[case] needle: &str) {
    let ctx = workspace();
    let cancel = CancellationToken::new();
    let pos = offset_of(OUTPUTS, needle);

    let all = ctx.collect_reference_origins(&cancel, "outputs.hcl").unwrap();
    let expected = all.at_pos("outputs.hcl", pos).cloned();
    assert_eq!(ctx.reference_origin_at_pos("outputs.hcl", pos).unwrap(), expected);
}

#[test]
fn test_targets_for_origin_across_files() {
    let ctx = workspace();
    let cancel = CancellationToken::new();

    let pos = offset_of(OUTPUTS, "var.region");
    let targets = ctx
        .reference_targets_for_origin_at_pos(&cancel, "outputs.hcl", pos)
        .unwrap();
    assert_eq!(target_addresses(&targets), vec!["var.region"]);
    let target = &targets.as_slice()[0];
    assert_eq!(target.range.file, "variables.hcl");
    assert_eq!(target.ty, Some(Type::String));

    let pos = offset_of(RESOURCES, "aws_subnet.main.id");
    let targets = ctx
        .reference_targets_for_origin_at_pos(&cancel, "resources.hcl", pos)
        .unwrap();
    assert_eq!(target_addresses(&targets), vec!["aws_subnet.main.id"]);
}

#[test]
fn test_no_targets_without_origin() {
    let ctx = workspace();
    let cancel = CancellationToken::new();
    let pos = offset_of(OUTPUTS, "locals");
    let targets = ctx
        .reference_targets_for_origin_at_pos(&cancel, "outputs.hcl", pos)
        .unwrap();
    assert!(targets.is_empty());
}

#[test]
fn test_origins_targeting_pos() {
    let ctx = workspace();
    let cancel = CancellationToken::new();

    let pos = offset_of(RESOURCES, "volume_size");
    let origins = ctx
        .reference_origins_targeting_pos(&cancel, "resources.hcl", pos)
        .unwrap();
    assert_eq!(
        origin_addresses(&origins),
        vec!["aws_instance.web.ebs_block_device[0].volume_size"]
    );
    assert_eq!(origins.as_slice()[0].range.file, "outputs.hcl");
}

#[test]
fn test_origins_targeting_variable_block() {
    let ctx = workspace();
    let cancel = CancellationToken::new();

    let pos = offset_of(VARIABLES, "variable \"region\"");
    let origins = ctx
        .reference_origins_targeting_pos(&cancel, "variables.hcl", pos)
        .unwrap();
    assert_eq!(origin_addresses(&origins), vec!["var.region"]);

    let pos = offset_of(VARIABLES, "variable \"zones\"");
    let origins = ctx
        .reference_origins_targeting_pos(&cancel, "variables.hcl", pos)
        .unwrap();
    assert!(origins.is_empty());
}

#[rstest]
#[case(RESOURCES, "resources.hcl", "ami", Some(Type::String))]
#[case(RESOURCES, "resources.hcl", "tags", Some(Type::map(Type::String)))]
#[case(RESOURCES, "resources.hcl", "volume_size", Some(Type::Number))]
#[case(RESOURCES, "resources.hcl", "subnet_id", Some(Type::String))]
#[case(OUTPUTS, "outputs.hcl", "name", Some(Type::String))]
#[case(VARIABLES, "variables.hcl", "variable", None)]
fn test_type_at_pos(
    #[case] source: &str,
    #[case] file: &str,
    #[case] needle: &str,
    #[case] expected: Option<Type>,
) {
    let ctx = workspace();
    let pos = offset_of(source, needle);
    assert_eq!(ctx.type_at_pos(file, pos).unwrap(), expected);
}
