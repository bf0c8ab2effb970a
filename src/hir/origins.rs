//! Reference origin collection for a whole body.

use text_size::TextSize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::Cancelled;
use super::body::resolve_block_body;
use super::expr::TypedExpr;
use super::reference::{Origin, Origins};
use crate::schema::{BlockSchema, BodySchema};
use crate::syntax::{Attribute, Block, Body, BodyItem};

/// Collect all origins in `body` under `schema`, sorted by file and offset.
///
/// Cancellation is checked between top-level body items.
pub fn collect_reference_origins(
    file: &str,
    body: &Body,
    schema: &BodySchema,
    cancel: &CancellationToken,
) -> Result<Origins, Cancelled> {
    let collector = OriginCollector { file };
    let mut origins = Origins::default();

    for item in &body.items {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        collector.item(item, schema, false, &mut origins);
    }
    origins.sort();

    debug!("[ORIGINS] {}: {} origins", file, origins.len());
    Ok(origins)
}

/// The origin at `offset`, if any.
///
/// Descends to the innermost body containing `offset` and only looks at
/// that body's attributes.
pub fn reference_origin_at_pos(
    file: &str,
    body: &Body,
    schema: &BodySchema,
    offset: TextSize,
) -> Option<Origin> {
    OriginCollector { file }.origin_at_pos(body, schema, false, offset)
}

struct OriginCollector<'a> {
    file: &'a str,
}

impl OriginCollector<'_> {
    fn item(&self, item: &BodyItem, schema: &BodySchema, allow_self: bool, out: &mut Origins) {
        match item {
            BodyItem::Attribute(attr) => out.extend(self.attribute(attr, schema, allow_self)),
            BodyItem::Block(block) => {
                let Some(block_schema) = schema.blocks.get(block.ty.as_str()) else {
                    trace!("[ORIGINS] no schema for block {}", block.ty);
                    return;
                };
                let resolved = resolve_block_body(block, block_schema);
                let allow_self = allow_self || allows_self(block_schema);
                for item in &block.body.items {
                    self.item(item, &resolved.schema, allow_self, out);
                }
            }
        }
    }

    fn attribute(&self, attr: &Attribute, schema: &BodySchema, allow_self: bool) -> Origins {
        match schema.attribute_schema(&attr.name) {
            Some(attr_schema) if attr_schema.constraint.contains_reference() => {
                TypedExpr::new(self.file, &attr.expr, &attr_schema.constraint)
                    .reference_origins(allow_self)
            }
            _ => Origins::default(),
        }
    }

    fn origin_at_pos(
        &self,
        body: &Body,
        schema: &BodySchema,
        allow_self: bool,
        offset: TextSize,
    ) -> Option<Origin> {
        if let Some(block) = body
            .blocks()
            .find(|b| b.body.range.contains_inclusive(offset))
        {
            return self.origin_in_block(block, schema, allow_self, offset);
        }

        let mut origins = Origins::default();
        for attr in body
            .attributes()
            .filter(|a| a.range.contains_inclusive(offset))
        {
            origins.extend(self.attribute(attr, schema, allow_self));
        }
        origins.sort();
        origins.at_pos(self.file, offset).cloned()
    }

    fn origin_in_block(
        &self,
        block: &Block,
        schema: &BodySchema,
        allow_self: bool,
        offset: TextSize,
    ) -> Option<Origin> {
        let block_schema = schema.blocks.get(block.ty.as_str())?;
        let resolved = resolve_block_body(block, block_schema);
        let allow_self = allow_self || allows_self(block_schema);
        self.origin_at_pos(&block.body, &resolved.schema, allow_self, offset)
    }
}

fn allows_self(schema: &BlockSchema) -> bool {
    schema
        .address
        .as_ref()
        .is_some_and(|addr| addr.dependent_body_self_ref)
}
