//! Decoder state management, errors and cancellation.

use hclref::ide::{DecodeError, Decoder};
use hclref::schema::BodySchema;
use tokio_util::sync::CancellationToken;

use crate::helpers::decoder_helpers::{decoder_from_sources, target_addresses};
use crate::helpers::schema_fixtures::{OUTPUTS, RESOURCES, VARIABLES, config_schema};

fn workspace() -> Decoder {
    decoder_from_sources(
        config_schema(),
        &[
            ("variables.hcl", VARIABLES),
            ("resources.hcl", RESOURCES),
            ("outputs.hcl", OUTPUTS),
        ],
    )
}

#[test]
fn test_no_schema_is_an_error() {
    let decoder = Decoder::new();
    decoder.set_file_content("main.hcl", VARIABLES);
    assert_eq!(decoder.path_context().err(), Some(DecodeError::NoSchema));
}

#[test]
fn test_unknown_file_is_an_error() {
    let ctx = workspace().path_context().unwrap();
    let cancel = CancellationToken::new();
    assert_eq!(
        ctx.collect_reference_targets(&cancel, "missing.hcl"),
        Err(DecodeError::FileNotFound("missing.hcl".to_string()))
    );
    assert_eq!(
        ctx.collect_reference_origins(&cancel, "missing.hcl"),
        Err(DecodeError::FileNotFound("missing.hcl".to_string()))
    );
}

#[test]
fn test_cancelled_collection() {
    let ctx = workspace().path_context().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    assert_eq!(
        ctx.collect_reference_targets(&cancel, "variables.hcl"),
        Err(DecodeError::Cancelled)
    );
    assert_eq!(ctx.collect_all_origins(&cancel), Err(DecodeError::Cancelled));
}

#[test]
fn test_all_targets_in_file_order() {
    let ctx = workspace().path_context().unwrap();
    let cancel = CancellationToken::new();

    let mut expected = Vec::new();
    for file in ["variables.hcl", "resources.hcl", "outputs.hcl"] {
        expected.extend(target_addresses(
            &ctx.collect_reference_targets(&cancel, file).unwrap(),
        ));
    }
    let all = ctx.collect_all_targets(&cancel).unwrap();
    assert_eq!(target_addresses(&all), expected);
}

#[test]
fn test_removed_file_is_not_in_new_snapshots() {
    let decoder = workspace();
    let before = decoder.path_context().unwrap();
    assert!(decoder.remove_file("variables.hcl"));
    let after = decoder.path_context().unwrap();

    let cancel = CancellationToken::new();
    assert!(before.collect_reference_targets(&cancel, "variables.hcl").is_ok());
    assert!(after.collect_reference_targets(&cancel, "variables.hcl").is_err());
}

#[test]
fn test_json_file_matches_native_file() {
    let schema = BodySchema::new().with_block(
        "variable",
        config_schema().blocks.get("variable").cloned().unwrap(),
    );
    let decoder = Decoder::new();
    decoder.set_schema(schema);
    decoder.set_file_content("native.hcl", VARIABLES);
    decoder.set_file_content(
        "vars.json",
        r#"{
  "variable": {
    "region": {
      "type": "string",
      "default": "eu-west-1"
    },
    "zones": {
      "default": ["a", "b"]
    }
  }
}"#,
    );

    let ctx = decoder.path_context().unwrap();
    let cancel = CancellationToken::new();
    let native = ctx.collect_reference_targets(&cancel, "native.hcl").unwrap();
    let json = ctx.collect_reference_targets(&cancel, "vars.json").unwrap();

    let shape = |targets: &hclref::hir::Targets| {
        targets
            .deep_iter()
            .map(|t| (t.address.clone(), t.ty.clone(), t.scope_id.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(&native), shape(&json));
}
