//! IDE features: the document set and the queries a language server asks.
//!
//! The `Decoder` owns mutable state; a `PathContext` is an immutable
//! snapshot every query runs against. Positions are byte offsets and
//! results carry `hir` types, converted at the protocol boundary.
//!
//! ## Usage
//!
//! ```ignore
//! use hclref::ide::Decoder;
//!
//! let decoder = Decoder::new();
//! decoder.set_schema(schema);
//! decoder.set_file_content("main.hcl", "output = var.region\n");
//!
//! let ctx = decoder.path_context()?;
//! let targets = ctx.reference_targets_for_origin_at_pos(&cancel, "main.hcl", offset)?;
//! ```

mod decoder;
mod error;
mod path_context;
mod semantic_tokens;

pub use decoder::Decoder;
pub use error::DecodeError;
pub use path_context::PathContext;
pub use semantic_tokens::{SemanticToken, TokenType, semantic_tokens};
