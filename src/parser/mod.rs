//! Parsers for native configuration syntax and JSON
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with TokenKind
//!     ↓
//! Parser → syntax::Body (errors collected, never raised)
//!
//! JSON Text
//!     ↓
//! JSON lexer (logos) → JsonValue tree
//!     ↓
//! syntax::json lowering (needs a schema) → syntax::Body
//! ```

#[allow(clippy::module_inception)]
mod parser;

mod json;
mod lexer;

pub use json::{JsonKind, JsonProperty, JsonString, JsonValue, parse_json};
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use parser::{Parse, SyntaxError, parse, parse_expression, parse_template};
