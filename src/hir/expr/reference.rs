use tracing::trace;

use super::TypedExpr;
use crate::hir::context::TargetContext;
use crate::hir::reference::{Origin, OriginConstraint, Origins, Target, Targets};
use crate::schema::Reference;
use crate::ty::Type;

impl TypedExpr<'_> {
    pub(super) fn reference_targets_of(
        &self,
        reference: &Reference,
        ctx: Option<&TargetContext>,
    ) -> Targets {
        // The traversal names a target of its own, independent of any context.
        if let Some(addr) = &reference.address {
            let Some(address) = self.expr.as_traversal().and_then(|t| t.address()) else {
                return Targets::default();
            };
            let range = self.file_range(self.expr.range());
            let mut target = Target::new(address, range.clone());
            target.def_range = Some(range);
            target.scope_id = addr.scope_id.clone();
            target.friendly_name = reference.name.clone();
            if let Some(ctx) = ctx {
                target.root_block_range = ctx.root_block_range.clone();
            }
            return Targets::new(vec![target]);
        }

        if self.expr.is_empty() || self.expr.as_traversal().is_some() {
            let ty = reference.of_type.clone().unwrap_or(Type::Dynamic);
            return Self::leaf_target(ctx, ty);
        }
        Targets::default()
    }

    /// One origin per convertible traversal in the expression.
    pub(super) fn traversal_origins(&self, reference: &Reference, allow_self: bool) -> Origins {
        let constraint = OriginConstraint {
            of_type: reference.of_type.clone(),
            of_scope_id: reference.of_scope_id.clone(),
        };
        let mut origins = Origins::default();
        for traversal in self.expr.variables() {
            if traversal.root == "self" && !allow_self {
                trace!("[ORIGINS] self reference outside self-addressable block");
                continue;
            }
            let Some(address) = traversal.address() else {
                trace!("[ORIGINS] skipping traversal at {:?}", traversal.range);
                continue;
            };
            origins.push(
                Origin::new(address, self.file_range(traversal.range))
                    .with_constraint(constraint.clone()),
            );
        }
        origins
    }
}
