use tracing::trace;

use super::{TypedExpr, static_type};
use crate::hir::context::TargetContext;
use crate::hir::reference::Targets;
use crate::schema::Constraint;
use crate::ty::{Type, Value};

impl TypedExpr<'_> {
    pub(super) fn literal_type_type(&self, ty: &Type) -> Type {
        if let Some(container) = Constraint::for_container_type(ty) {
            return self.with(self.expr, &container).infer_type();
        }
        if ty.is_dynamic() {
            return match self.expr.value() {
                Ok(value) => value.ty(),
                Err(_) => Type::Dynamic,
            };
        }
        ty.clone()
    }

    pub(super) fn literal_type_accepts(&self, ty: &Type) -> bool {
        if let Some(container) = Constraint::for_container_type(ty) {
            return self.with(self.expr, &container).accepts();
        }
        ty.is_dynamic() || static_type(self.expr).as_ref() == Some(ty)
    }

    pub(super) fn literal_type_targets(&self, ty: &Type, ctx: Option<&TargetContext>) -> Targets {
        // Containers share the target trees of the equivalent container constraint.
        if let Some(container) = Constraint::for_container_type(ty) {
            return self.with(self.expr, &container).reference_targets(ctx);
        }

        if ty.is_dynamic() {
            let value = match self.expr.value() {
                Ok(value) => value,
                Err(err) => {
                    trace!("[TARGETS] cannot refine dynamic type: {}", err);
                    return Targets::default();
                }
            };
            if value.is_null() {
                return Targets::default();
            }
            return self.literal_type_targets(&value.ty(), ctx);
        }

        if ctx.is_none() {
            return Targets::default();
        }
        if !self.expr.is_empty() && static_type(self.expr).as_ref() != Some(ty) {
            trace!(
                "[TARGETS] expression at {:?} is not of type {}",
                self.expr.range(),
                ty
            );
            return Targets::default();
        }
        Self::leaf_target(ctx, ty.clone())
    }

    pub(super) fn literal_value_targets(
        &self,
        value: &Value,
        ctx: Option<&TargetContext>,
    ) -> Targets {
        match self.expr.value() {
            Ok(v) if v == *value => Self::leaf_target(ctx, value.ty()),
            _ => Targets::default(),
        }
    }
}
