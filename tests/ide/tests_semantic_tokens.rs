//! Semantic tokens for resolved references and target definitions.

use hclref::TextRange;
use hclref::ide::{SemanticToken, TokenType, semantic_tokens};
use tokio_util::sync::CancellationToken;

use crate::helpers::decoder_helpers::{context_from_source, decoder_from_sources, offset_of};
use crate::helpers::schema_fixtures::{OUTPUTS, RESOURCES, VARIABLES, config_schema};

fn token_at(source: &str, needle: &str, token_type: TokenType) -> SemanticToken {
    let start = offset_of(source, needle);
    SemanticToken {
        range: TextRange::at(start, (needle.len() as u32).into()),
        token_type,
    }
}

#[test]
fn test_unresolved_references_have_no_token() {
    let ctx = context_from_source(config_schema(), OUTPUTS);
    let tokens = semantic_tokens(&ctx, &CancellationToken::new(), "main.hcl").unwrap();

    // `local.name` is the only target in this file and nothing refers to it
    assert!(tokens.iter().all(|t| t.token_type == TokenType::Definition));
    assert_eq!(tokens, vec![token_at(OUTPUTS, "name", TokenType::Definition)]);
}

#[test]
fn test_references_resolved_across_files() {
    let ctx = decoder_from_sources(
        config_schema(),
        &[
            ("variables.hcl", VARIABLES),
            ("resources.hcl", RESOURCES),
            ("outputs.hcl", OUTPUTS),
        ],
    )
    .path_context()
    .unwrap();
    let tokens = semantic_tokens(&ctx, &CancellationToken::new(), "outputs.hcl").unwrap();

    let references: Vec<_> = tokens
        .iter()
        .filter(|t| t.token_type == TokenType::Reference)
        .cloned()
        .collect();
    assert_eq!(
        references,
        vec![
            token_at(OUTPUTS, "var.region", TokenType::Reference),
            token_at(
                OUTPUTS,
                "aws_instance.web.ebs_block_device[0].volume_size",
                TokenType::Reference
            ),
        ]
    );
}

#[test]
fn test_definitions_are_deduplicated_and_sorted() {
    let ctx = context_from_source(config_schema(), VARIABLES);
    let tokens = semantic_tokens(&ctx, &CancellationToken::new(), "main.hcl").unwrap();
    assert_eq!(
        tokens,
        vec![
            token_at(VARIABLES, "variable \"region\"", TokenType::Definition),
            token_at(VARIABLES, "variable \"zones\"", TokenType::Definition),
        ]
    );
    assert_eq!(TokenType::Definition.to_lsp_index(), 1);
}
