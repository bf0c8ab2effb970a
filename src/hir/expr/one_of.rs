use super::TypedExpr;
use crate::hir::context::TargetContext;
use crate::hir::reference::{Origins, Targets};
use crate::schema::Constraint;
use crate::ty::Type;

impl TypedExpr<'_> {
    /// Type of the first alternative accepting the expression.
    pub(super) fn one_of_type(&self, alternatives: &[Constraint]) -> Type {
        alternatives
            .iter()
            .map(|alt| self.with(self.expr, alt))
            .find(|typed| typed.accepts())
            .map(|typed| typed.infer_type())
            .or_else(|| self.constraint.constraint_type())
            .unwrap_or(Type::Dynamic)
    }

    /// Alternatives are tried in order; the first non-empty result wins.
    pub(super) fn one_of_targets(
        &self,
        alternatives: &[Constraint],
        ctx: Option<&TargetContext>,
    ) -> Targets {
        alternatives
            .iter()
            .map(|alt| self.with(self.expr, alt).reference_targets(ctx))
            .find(|targets| !targets.is_empty())
            .unwrap_or_default()
    }

    /// Union over all alternatives. The same traversal found by several
    /// alternatives becomes one origin carrying all their constraints.
    pub(super) fn one_of_origins(&self, alternatives: &[Constraint], allow_self: bool) -> Origins {
        let mut origins = Origins::default();
        for alt in alternatives {
            for origin in self.with(self.expr, alt).reference_origins(allow_self) {
                origins.push_merged(origin);
            }
        }
        origins
    }
}
