//! Lists, sets and tuples: element targets addressed by position.

use tracing::trace;

use super::TypedExpr;
use crate::base::Step;
use crate::hir::context::TargetContext;
use crate::hir::reference::{Origins, Targets};
use crate::schema::Constraint;
use crate::syntax::Expr;
use crate::ty::Type;

impl<'a> TypedExpr<'a> {
    pub(super) fn is_collection(&self) -> bool {
        match self.expr {
            Expr::Tuple { .. } => true,
            Expr::For(f) => !f.is_object,
            _ => false,
        }
    }

    pub(super) fn collection_type(&self) -> Type {
        match self.expr {
            Expr::For(_) => Type::Dynamic,
            _ => self.constraint.constraint_type().unwrap_or(Type::Dynamic),
        }
    }

    /// Targets of a sequence whose element constraint at position `i` is
    /// `elem_at(i)`. Positions without a constraint are skipped.
    pub(super) fn collection_targets(
        &self,
        ctx: Option<&TargetContext>,
        elem_at: impl Fn(usize) -> Option<&'a Constraint>,
    ) -> Targets {
        let elements = match self.expr {
            Expr::Tuple { elements, .. } => elements,
            Expr::Empty(_) => return Self::leaf_target(ctx, self.collection_type()),
            Expr::For(f) if !f.is_object => return Self::leaf_target(ctx, Type::Dynamic),
            other => {
                trace!("[TARGETS] expected a tuple at {:?}", other.range());
                return Targets::default();
            }
        };

        let mut nested = Targets::default();
        for (i, elem) in elements.iter().enumerate() {
            let Some(constraint) = elem_at(i) else {
                continue;
            };
            let typed = self.with(elem, constraint);
            match ctx {
                Some(ctx) => {
                    let elem_ctx = ctx.child(Step::index(i as i64), self.file_range(elem.range()), None);
                    nested.extend(typed.reference_targets(Some(&elem_ctx)));
                }
                None => nested.extend(typed.reference_targets(None)),
            }
        }

        match ctx {
            Some(ctx) => Targets::new(vec![ctx.target(self.collection_type(), nested)]),
            None => nested,
        }
    }

    pub(super) fn collection_origins(
        &self,
        allow_self: bool,
        elem_at: impl Fn(usize) -> Option<&'a Constraint>,
    ) -> Origins {
        let mut origins = Origins::default();
        if let Expr::Tuple { elements, .. } = self.expr {
            for (i, elem) in elements.iter().enumerate() {
                if let Some(constraint) = elem_at(i) {
                    origins.extend(self.with(elem, constraint).reference_origins(allow_self));
                }
            }
        }
        origins
    }
}
