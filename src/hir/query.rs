//! Position queries over a single body.

use text_size::TextSize;
use tracing::trace;

use super::body::resolve_block_body;
use super::expr::TypedExpr;
use crate::schema::BodySchema;
use crate::syntax::Body;
use crate::ty::Type;

/// Inferred type of the innermost attribute whose range contains `offset`.
pub fn type_at_pos(file: &str, body: &Body, schema: &BodySchema, offset: TextSize) -> Option<Type> {
    if let Some(block) = body.blocks().find(|b| b.range.contains_inclusive(offset)) {
        let block_schema = schema.blocks.get(block.ty.as_str())?;
        let resolved = resolve_block_body(block, block_schema);
        return type_at_pos(file, &block.body, &resolved.schema, offset);
    }

    let attr = body.attributes().find(|a| a.range.contains_inclusive(offset))?;
    let Some(attr_schema) = schema.attribute_schema(&attr.name) else {
        trace!("[SCHEMA] no schema for attribute {}", attr.name);
        return None;
    };
    Some(TypedExpr::new(file, &attr.expr, &attr_schema.constraint).infer_type())
}
