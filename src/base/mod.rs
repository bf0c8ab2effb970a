//! Foundation types for hclref.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`FileRange`] - A byte range tagged with the file it belongs to
//! - [`Address`], [`Step`], [`Key`] - Symbolic addresses of reference targets
//! - [`ScopeId`] - Namespace tags for references
//!
//! This module has NO dependencies on other hclref modules.

mod address;
mod range;

pub use address::{Address, Key, ScopeId, Step, is_identifier};
pub use range::FileRange;
pub use text_size::{TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
