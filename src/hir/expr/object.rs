//! Maps and objects: entry targets addressed by key.

use smol_str::SmolStr;
use tracing::trace;

use super::TypedExpr;
use crate::base::Step;
use crate::hir::context::TargetContext;
use crate::hir::reference::{Origins, Targets};
use crate::schema::{Constraint, ObjectConstraint};
use crate::syntax::{Expr, ObjectItem};
use crate::ty::Type;

impl<'a> TypedExpr<'a> {
    pub(super) fn is_object(&self) -> bool {
        match self.expr {
            Expr::Object { .. } => true,
            Expr::For(f) => f.is_object,
            _ => false,
        }
    }

    pub(super) fn object_type(&self) -> Type {
        match self.expr {
            Expr::For(_) => Type::Dynamic,
            _ => self.constraint.constraint_type().unwrap_or(Type::Dynamic),
        }
    }

    pub(super) fn map_targets(&self, elem: &'a Constraint, ctx: Option<&TargetContext>) -> Targets {
        self.entry_targets(ctx, |key| Some((Step::key(key.clone()), elem)))
    }

    /// Only keys declared by the object constraint produce targets.
    pub(super) fn object_targets(
        &self,
        obj: &'a ObjectConstraint,
        ctx: Option<&TargetContext>,
    ) -> Targets {
        self.entry_targets(ctx, |key| {
            let attr = obj.attributes.get(key)?;
            Some((Step::attr(key.clone()), &attr.constraint))
        })
    }

    fn entry_targets(
        &self,
        ctx: Option<&TargetContext>,
        entry: impl Fn(&SmolStr) -> Option<(Step, &'a Constraint)>,
    ) -> Targets {
        let items = match self.expr {
            Expr::Object { items, .. } => items,
            Expr::Empty(_) => return Self::leaf_target(ctx, self.object_type()),
            // a for-comprehension cannot be split into named entries
            Expr::For(f) if f.is_object => return Self::leaf_target(ctx, Type::Dynamic),
            other => {
                trace!("[TARGETS] expected an object at {:?}", other.range());
                return Targets::default();
            }
        };

        let mut nested = Targets::default();
        for item in items {
            let Some((step, constraint)) = item_key(item).and_then(|key| entry(&key)) else {
                continue;
            };
            let typed = self.with(&item.value, constraint);
            match ctx {
                Some(ctx) => {
                    let item_ctx = ctx.child(
                        step,
                        self.file_range(item.range()),
                        Some(self.file_range(item.key.range())),
                    );
                    nested.extend(typed.reference_targets(Some(&item_ctx)));
                }
                None => nested.extend(typed.reference_targets(None)),
            }
        }

        match ctx {
            Some(ctx) => Targets::new(vec![ctx.target(self.object_type(), nested)]),
            None => nested,
        }
    }

    pub(super) fn map_origins(&self, elem: &'a Constraint, allow_self: bool) -> Origins {
        self.entry_origins(allow_self, |_| Some(elem))
    }

    pub(super) fn object_origins(&self, obj: &'a ObjectConstraint, allow_self: bool) -> Origins {
        self.entry_origins(allow_self, |key| {
            obj.attributes.get(key).map(|attr| &attr.constraint)
        })
    }

    fn entry_origins(
        &self,
        allow_self: bool,
        constraint_for: impl Fn(&SmolStr) -> Option<&'a Constraint>,
    ) -> Origins {
        let mut origins = Origins::default();
        if let Expr::Object { items, .. } = self.expr {
            for item in items {
                if let Some(constraint) = item_key(item).and_then(|key| constraint_for(&key)) {
                    origins.extend(self.with(&item.value, constraint).reference_origins(allow_self));
                }
            }
        }
        origins
    }
}

fn item_key(item: &ObjectItem) -> Option<SmolStr> {
    let key = item.key.as_object_key();
    if key.is_none() {
        trace!("[EXPR] object key at {:?} is not a string", item.key.range());
    }
    key
}
