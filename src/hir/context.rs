//! Target context threaded through expression adapters.
//!
//! The context describes the target the current node would become: its
//! address, ranges and scope. Descending into a nested element never mutates
//! the parent context; [`TargetContext::child`] returns a new one.

use smol_str::SmolStr;

use super::reference::{Target, Targets};
use crate::base::{Address, FileRange, ScopeId, Step};
use crate::ty::Type;

#[derive(Debug, Clone, PartialEq)]
pub struct TargetContext {
    pub address: Address,
    pub local_address: Option<Address>,
    pub scope_id: Option<ScopeId>,
    pub friendly_name: Option<SmolStr>,
    /// Attach inferred types to emitted targets.
    pub as_expr_type: bool,
    pub range: FileRange,
    pub def_range: Option<FileRange>,
    pub targetable_from: Option<FileRange>,
    pub root_block_range: Option<FileRange>,
}

impl TargetContext {
    pub fn new(address: Address, range: FileRange) -> Self {
        Self {
            address,
            local_address: None,
            scope_id: None,
            friendly_name: None,
            as_expr_type: true,
            range,
            def_range: None,
            targetable_from: None,
            root_block_range: None,
        }
    }

    pub fn with_def_range(mut self, def_range: FileRange) -> Self {
        self.def_range = Some(def_range);
        self
    }

    pub fn with_scope(mut self, scope_id: Option<ScopeId>) -> Self {
        self.scope_id = scope_id;
        self
    }

    pub fn with_friendly_name(mut self, name: Option<SmolStr>) -> Self {
        self.friendly_name = name;
        self
    }

    pub fn with_root_block_range(mut self, range: Option<FileRange>) -> Self {
        self.root_block_range = range;
        self
    }

    /// Make nested targets reachable as `self.<path>` from within `window`.
    pub fn with_self_address(mut self, window: FileRange) -> Self {
        self.local_address = Some(Address::root("self"));
        self.targetable_from = Some(window);
        self
    }

    /// Context for a nested element one `step` below this one.
    pub fn child(&self, step: Step, range: FileRange, def_range: Option<FileRange>) -> Self {
        Self {
            address: self.address.join(step.clone()),
            local_address: self.local_address.as_ref().map(|local| local.join(step)),
            scope_id: self.scope_id.clone(),
            friendly_name: None,
            as_expr_type: self.as_expr_type,
            range,
            def_range,
            targetable_from: self.targetable_from.clone(),
            root_block_range: self.root_block_range.clone(),
        }
    }

    /// Target for the node this context describes.
    pub fn target(&self, ty: Type, nested: Targets) -> Target {
        let mut target = self.untyped_target();
        if self.as_expr_type {
            target.ty = Some(ty);
        }
        target.nested = nested;
        target
    }

    /// Target carrying only address, scope and ranges.
    pub fn untyped_target(&self) -> Target {
        Target {
            address: self.address.clone(),
            local_address: self.local_address.clone(),
            scope_id: self.scope_id.clone(),
            range: self.range.clone(),
            def_range: self.def_range.clone(),
            targetable_from: self.targetable_from.clone(),
            ty: None,
            friendly_name: self.friendly_name.clone(),
            nested: Targets::default(),
            root_block_range: self.root_block_range.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::TextRange;

    fn range(start: u32, end: u32) -> FileRange {
        FileRange::new("main.hcl", TextRange::new(start.into(), end.into()))
    }

    #[test]
    fn test_child_extends_both_addresses() {
        let ctx = TargetContext::new(Address::from_names(["blk"]), range(0, 30))
            .with_self_address(range(4, 30))
            .with_scope(Some(ScopeId::from("blk")));
        let child = ctx.child(Step::attr("a"), range(6, 12), Some(range(6, 7)));

        assert_eq!(child.address.to_string(), "blk.a");
        assert_eq!(child.local_address.map(|a| a.to_string()), Some("self.a".into()));
        assert_eq!(child.scope_id, ctx.scope_id);
        assert_eq!(child.targetable_from, Some(range(4, 30)));
        // the parent is left as it was
        assert_eq!(ctx.address.to_string(), "blk");
    }

    #[test]
    fn test_target_type_follows_flag() {
        let mut ctx = TargetContext::new(Address::root("a"), range(0, 5));
        assert_eq!(ctx.target(Type::Bool, Targets::default()).ty, Some(Type::Bool));
        ctx.as_expr_type = false;
        assert_eq!(ctx.target(Type::Bool, Targets::default()).ty, None);
    }
}
