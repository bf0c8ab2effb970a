//! Semantic tokens: references that resolve and the definitions they name.

use rustc_hash::FxHashSet;
use text_size::TextRange;
use tokio_util::sync::CancellationToken;

use super::{DecodeError, PathContext};

/// Token type for semantic highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Traversal that resolves to at least one target
    Reference,
    /// Name of a node that defines a target
    Definition,
}

impl TokenType {
    /// Convert to LSP token type index.
    pub fn to_lsp_index(self) -> u32 {
        match self {
            TokenType::Reference => 0,
            TokenType::Definition => 1,
        }
    }
}

/// A semantic token for syntax highlighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticToken {
    pub range: TextRange,
    pub token_type: TokenType,
}

/// Semantic tokens of `file`, sorted by offset.
///
/// Origins are resolved against the targets of every file in the snapshot;
/// origins with no matching target produce no token.
pub fn semantic_tokens(
    ctx: &PathContext,
    cancel: &CancellationToken,
    file: &str,
) -> Result<Vec<SemanticToken>, DecodeError> {
    let origins = ctx.collect_reference_origins(cancel, file)?;
    let all_targets = ctx.collect_all_targets(cancel)?;
    let file_targets = ctx.collect_reference_targets(cancel, file)?;

    let mut seen = FxHashSet::default();
    let mut tokens = Vec::new();

    for origin in origins.iter() {
        if all_targets.deep_iter().any(|target| target.matches(origin))
            && seen.insert((origin.range.range, TokenType::Reference))
        {
            tokens.push(SemanticToken {
                range: origin.range.range,
                token_type: TokenType::Reference,
            });
        }
    }
    for target in file_targets.deep_iter() {
        let Some(def_range) = &target.def_range else {
            continue;
        };
        if seen.insert((def_range.range, TokenType::Definition)) {
            tokens.push(SemanticToken {
                range: def_range.range,
                token_type: TokenType::Definition,
            });
        }
    }

    tokens.sort_by_key(|token| (token.range.start(), token.range.end()));
    Ok(tokens)
}
