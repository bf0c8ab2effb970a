//! Reference target collection for a whole body.
//!
//! Walks a body under its schema in source order and publishes every
//! addressable attribute and block as a [`Target`]. Nothing here fails on
//! bad input: a node whose address, type or dependent schema cannot be
//! resolved is skipped and the walk moves on to its siblings.
//!
//! ## Block targets
//!
//! An addressed block contributes, depending on its [`BlockAddrSchema`]:
//! - an untyped target (`as_reference`)
//! - a target typed from sibling attributes (`as_type_of`)
//! - a target typed as its body's data (`body_as_data`), whose nested
//!   targets mirror the body when the body is inferred
//!
//! Inferred bodies list attributes present in source first, then one
//! zero-width target per declared attribute that is absent, alphabetically.

use text_size::TextRange;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::Cancelled;
use super::body::{AddrNode, BlockBody, resolve_address, resolve_block_body};
use super::context::TargetContext;
use super::expr::TypedExpr;
use super::infer::{body_to_data_type, wrap_block_type};
use super::reference::{Target, Targets};
use super::typeexpr::type_from_expr;
use crate::base::{FileRange, Step};
use crate::schema::{
    BlockAddrSchema, BlockAsTypeOf, BlockSchema, BlockType, BodySchema, Targetable,
};
use crate::syntax::{Attribute, Block, Body, BodyItem, Expr};
use crate::ty::Type;

/// Collect all targets `body` defines under `schema`.
///
/// Cancellation is checked between top-level body items.
pub fn collect_reference_targets(
    file: &str,
    body: &Body,
    schema: &BodySchema,
    cancel: &CancellationToken,
) -> Result<Targets, Cancelled> {
    let collector = TargetCollector { file };
    let mut targets = Targets::default();

    for item in &body.items {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        collector.item(item, body, schema, None, &mut targets);
    }
    let range = collector.range(body.range);
    for targetable in &schema.targetable_as {
        targets.push(collector.targetable(targetable, &range, None, None));
    }

    debug!(
        "[TARGETS] {}: {} top-level targets, {} total",
        file,
        targets.len(),
        targets.deep_iter().count()
    );
    Ok(targets)
}

struct TargetCollector<'a> {
    file: &'a str,
}

impl TargetCollector<'_> {
    fn range(&self, range: TextRange) -> FileRange {
        FileRange::new(self.file, range)
    }

    fn item(
        &self,
        item: &BodyItem,
        body: &Body,
        schema: &BodySchema,
        root: Option<&FileRange>,
        out: &mut Targets,
    ) {
        match item {
            BodyItem::Attribute(attr) => self.attribute(attr, body, schema, root, out),
            BodyItem::Block(block) => {
                let block_range = self.range(block.range);
                self.block(block, schema, Some(root.unwrap_or(&block_range)), out);
            }
        }
    }

    fn attribute(
        &self,
        attr: &Attribute,
        body: &Body,
        schema: &BodySchema,
        root: Option<&FileRange>,
        out: &mut Targets,
    ) {
        let Some(attr_schema) = schema.attribute_schema(&attr.name) else {
            trace!("[TARGETS] no schema for attribute {}", attr.name);
            return;
        };
        let typed = TypedExpr::new(self.file, &attr.expr, &attr_schema.constraint);

        let typed_pass = attr_schema.address.as_ref().is_some_and(|a| a.as_expr_type);
        // traversals addressed by their own reference schema; the typed pass
        // below already yields them
        if !typed_pass {
            for mut target in typed.reference_targets(None) {
                target.root_block_range = root.cloned();
                out.push(target);
            }
        }

        let Some(addr) = &attr_schema.address else {
            return;
        };
        let Some(address) = resolve_address(&addr.steps, AddrNode::Attribute(attr, body)) else {
            trace!("[TARGETS] cannot resolve address of attribute {}", attr.name);
            return;
        };
        let ctx = TargetContext::new(address, self.range(attr.range))
            .with_def_range(self.range(attr.name_range))
            .with_scope(addr.scope_id.clone())
            .with_friendly_name(addr.friendly_name.clone())
            .with_root_block_range(root.cloned());

        if addr.as_reference {
            out.push(ctx.untyped_target());
        }
        if addr.as_expr_type {
            out.extend(typed.reference_targets(Some(&ctx)));
        }
    }

    fn block(
        &self,
        block: &Block,
        schema: &BodySchema,
        root: Option<&FileRange>,
        out: &mut Targets,
    ) {
        let Some(block_schema) = schema.blocks.get(block.ty.as_str()) else {
            trace!("[TARGETS] no schema for block {}", block.ty);
            return;
        };
        let resolved = resolve_block_body(block, block_schema);

        if let Some(addr) = &block_schema.address {
            self.block_targets(block, block_schema, addr, &resolved, root, out);
        }

        for item in &block.body.items {
            self.item(item, &block.body, &resolved.schema, root, out);
        }

        let range = self.range(block.range);
        let def_range = self.range(block.def_range());
        for targetable in &resolved.schema.targetable_as {
            out.push(self.targetable(targetable, &range, Some(&def_range), root));
        }
    }

    fn block_targets(
        &self,
        block: &Block,
        block_schema: &BlockSchema,
        addr: &BlockAddrSchema,
        resolved: &BlockBody<'_>,
        root: Option<&FileRange>,
        out: &mut Targets,
    ) {
        let Some(address) = resolve_address(&addr.steps, AddrNode::Block(block)) else {
            trace!("[TARGETS] cannot resolve address of block {}", block.ty);
            return;
        };
        let ctx = TargetContext::new(address, self.range(block.range))
            .with_def_range(self.range(block.def_range()))
            .with_scope(addr.scope_id.clone())
            .with_friendly_name(addr.friendly_name.clone())
            .with_root_block_range(root.cloned());

        if addr.as_reference {
            out.push(ctx.untyped_target());
        }

        if let Some(type_of) = &addr.as_type_of {
            out.push(ctx.target(type_of_block(block, type_of), Targets::default()));
        }

        if !addr.body_as_data && !addr.dependent_body_self_ref {
            return;
        }
        let dependency_missed =
            !block_schema.dependent_body.is_empty() && resolved.dependent.is_none();
        if dependency_missed && (addr.dependent_body_as_data || addr.infer_dependent_body) {
            trace!("[TARGETS] dependent body of {} unresolved", ctx.address);
            return;
        }

        let ctx = if addr.dependent_body_self_ref {
            ctx.with_self_address(self.range(block.body.range))
        } else {
            ctx
        };

        // which part of the schema the nested targets mirror
        let infer_declared = addr.infer_body || addr.dependent_body_self_ref;
        let infer_dependent = addr.infer_dependent_body || addr.dependent_body_self_ref;
        let infer_schema = match (infer_declared, infer_dependent) {
            (true, true) => Some(&*resolved.schema),
            (true, false) => Some(&block_schema.body),
            (false, true) => resolved.dependent,
            (false, false) => None,
        };
        let nested = infer_schema
            .map(|schema| self.infer_body(&block.body, schema, &ctx))
            .unwrap_or_default();

        if addr.body_as_data {
            let data_schema = if addr.dependent_body_as_data {
                &*resolved.schema
            } else {
                &block_schema.body
            };
            out.push(ctx.target(body_to_data_type(data_schema), nested));
        } else {
            out.extend(nested);
        }
    }

    /// Targets for the contents of an inferred body, nested under `ctx`.
    fn infer_body(&self, body: &Body, schema: &BodySchema, ctx: &TargetContext) -> Targets {
        let mut targets = Targets::default();
        let mut seen_blocks: Vec<&str> = Vec::new();

        for item in &body.items {
            match item {
                BodyItem::Attribute(attr) => {
                    let Some(attr_schema) = schema.attribute_schema(&attr.name) else {
                        continue;
                    };
                    let attr_ctx = ctx.child(
                        Step::attr(attr.name.clone()),
                        self.range(attr.range),
                        Some(self.range(attr.name_range)),
                    );
                    let typed = TypedExpr::new(self.file, &attr.expr, &attr_schema.constraint);
                    targets.extend(typed.reference_targets(Some(&attr_ctx)));
                }
                BodyItem::Block(block) => {
                    if seen_blocks.contains(&block.ty.as_str()) {
                        continue;
                    }
                    let Some(block_schema) = schema.blocks.get(block.ty.as_str()) else {
                        continue;
                    };
                    seen_blocks.push(&block.ty);
                    let instances: Vec<&Block> = body.blocks().filter(|b| b.ty == block.ty).collect();
                    targets.extend(self.infer_blocks(block_schema, &instances, ctx));
                }
            }
        }

        let mut absent: Vec<_> = schema
            .attributes
            .iter()
            .filter(|(name, _)| body.attribute(name).is_none())
            .collect();
        absent.sort_by(|a, b| a.0.cmp(b.0));

        let at = TextRange::empty(body.open_offset());
        let empty = Expr::Empty(at);
        for (name, attr_schema) in absent {
            let attr_ctx = ctx.child(Step::attr(name.clone()), self.range(at), None);
            let typed = TypedExpr::new(self.file, &empty, &attr_schema.constraint);
            targets.extend(typed.reference_targets(Some(&attr_ctx)));
        }

        targets
    }

    /// Targets for all instances of one block type inside an inferred body.
    ///
    /// Repeated block types accumulate into one target holding an element
    /// per instance.
    fn infer_blocks(
        &self,
        block_schema: &BlockSchema,
        instances: &[&Block],
        ctx: &TargetContext,
    ) -> Targets {
        let (Some(first), Some(last)) = (instances.first(), instances.last()) else {
            return Targets::default();
        };
        let step = Step::attr(first.ty.clone());

        let instance = |block: &Block, ctx: &TargetContext| {
            let resolved = resolve_block_body(block, block_schema);
            let nested = self.infer_body(&block.body, &resolved.schema, ctx);
            ctx.target(body_to_data_type(&resolved.schema), nested)
        };

        let block_type = block_schema.block_type;
        if block_type == BlockType::Object {
            return instances
                .iter()
                .map(|block| {
                    let block_ctx = ctx.child(
                        step.clone(),
                        self.range(block.range),
                        Some(self.range(block.def_range())),
                    );
                    instance(block, &block_ctx)
                })
                .collect();
        }

        let group_ctx = ctx.child(step, self.range(first.range.cover(last.range)), None);
        let mut nested = Targets::default();
        for (i, block) in instances.iter().enumerate() {
            let key = match block_type {
                BlockType::Map => match block.label(0) {
                    Some(label) => Step::key(label),
                    None => {
                        trace!("[TARGETS] map block {} without a label", block.ty);
                        continue;
                    }
                },
                _ => Step::index(i as i64),
            };
            let block_ctx = group_ctx.child(
                key,
                self.range(block.range),
                Some(self.range(block.def_range())),
            );
            nested.push(instance(block, &block_ctx));
        }
        // elements follow the first instance's body, dependent body included
        let elem = body_to_data_type(&resolve_block_body(first, block_schema).schema);
        Targets::new(vec![group_ctx.target(wrap_block_type(block_type, elem), nested)])
    }

    fn targetable(
        &self,
        targetable: &Targetable,
        range: &FileRange,
        def_range: Option<&FileRange>,
        root: Option<&FileRange>,
    ) -> Target {
        let mut target = Target::new(targetable.address.clone(), range.clone());
        target.scope_id = targetable.scope_id.clone();
        target.ty = targetable.as_type.clone();
        target.friendly_name = targetable.friendly_name.clone();
        target.def_range = def_range.cloned();
        target.root_block_range = root.cloned();
        target.nested = targetable
            .nested
            .iter()
            .map(|nested| self.targetable(nested, range, def_range, root))
            .collect();
        target
    }
}

/// Type of a block declared by a type attribute and/or a default value.
///
/// The declared type wins unless it is `any`, in which case the value's
/// type refines it.
fn type_of_block(block: &Block, type_of: &BlockAsTypeOf) -> Type {
    let declared = type_of
        .attribute_expr
        .as_ref()
        .and_then(|name| block.body.attribute(name))
        .and_then(|attr| match type_from_expr(&attr.expr) {
            Ok(ty) => Some(ty),
            Err(err) => {
                trace!("[TARGETS] invalid type declaration: {}", err);
                None
            }
        });
    let from_value = type_of
        .attribute_value
        .as_ref()
        .and_then(|name| block.body.attribute(name))
        .and_then(|attr| attr.expr.value().ok())
        .filter(|value| !value.is_null())
        .map(|value| value.ty());

    match (declared, from_value) {
        (Some(ty), Some(value_ty)) if ty.is_dynamic() => value_ty,
        (Some(ty), _) => ty,
        (None, Some(value_ty)) => value_ty,
        (None, None) => Type::Dynamic,
    }
}
