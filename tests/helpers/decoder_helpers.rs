//! Decoder setup and lookup helpers.

use hclref::TextSize;
use hclref::hir::{Origins, Targets};
use hclref::ide::{Decoder, PathContext};
use hclref::schema::BodySchema;

/// Creates a decoder with a schema and the given files, asserting that
/// every file parses cleanly.
pub fn decoder_from_sources(schema: BodySchema, files: &[(&str, &str)]) -> Decoder {
    let decoder = Decoder::new();
    decoder.set_schema(schema);
    for (name, content) in files {
        let errors = decoder.set_file_content(name, content);
        assert!(errors.is_empty(), "Parse errors in '{}': {:?}", name, errors);
    }
    decoder
}

/// Snapshot of a decoder holding a single `main.hcl`.
pub fn context_from_source(schema: BodySchema, source: &str) -> PathContext {
    decoder_from_sources(schema, &[("main.hcl", source)])
        .path_context()
        .expect("schema is set")
}

/// Byte offset of the first occurrence of `needle` in `source`.
pub fn offset_of(source: &str, needle: &str) -> TextSize {
    let offset = source
        .find(needle)
        .unwrap_or_else(|| panic!("'{}' not found in source", needle));
    TextSize::from(offset as u32)
}

/// Addresses of all targets, depth-first.
pub fn target_addresses(targets: &Targets) -> Vec<String> {
    targets.deep_iter().map(|t| t.address.to_string()).collect()
}

pub fn origin_addresses(origins: &Origins) -> Vec<String> {
    origins.iter().map(|o| o.address.to_string()).collect()
}
