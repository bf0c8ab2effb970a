//! Reference targets and origins.
//!
//! A [`Target`] is an addressed location a document defines; an [`Origin`]
//! is a traversal that consumes one. Both are plain data produced by the
//! collectors in [`super::targets`] and [`super::origins`]. Matching the two
//! is the only logic living here.

use smol_str::SmolStr;

use crate::base::{Address, FileRange, ScopeId, TextSize};
use crate::ty::Type;

// ============================================================================
// TARGETS
// ============================================================================

/// An addressed, optionally typed location defined by a document.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Target {
    pub address: Address,
    /// Address relative to the enclosing block (`self.foo`).
    pub local_address: Option<Address>,
    pub scope_id: Option<ScopeId>,
    /// Full range of the defining attribute, block or expression.
    pub range: FileRange,
    /// Range of the name that defines the target, e.g. an attribute name
    /// or a block header.
    pub def_range: Option<FileRange>,
    /// Window from which `local_address` is reachable.
    pub targetable_from: Option<FileRange>,
    /// Set only for type-aware targets.
    pub ty: Option<Type>,
    pub friendly_name: Option<SmolStr>,
    pub nested: Targets,
    /// Range of the top-level block the target was found in.
    pub root_block_range: Option<FileRange>,
}

impl Target {
    pub fn new(address: Address, range: FileRange) -> Self {
        Self {
            address,
            local_address: None,
            scope_id: None,
            range,
            def_range: None,
            targetable_from: None,
            ty: None,
            friendly_name: None,
            nested: Targets::default(),
            root_block_range: None,
        }
    }

    /// Check whether `origin` refers to this target (not to a nested one).
    pub fn matches(&self, origin: &Origin) -> bool {
        if !self.is_addressed_by(origin) {
            return false;
        }
        origin.constraints.is_empty()
            || origin.constraints.iter().any(|c| c.is_satisfied_by(self))
    }

    fn is_addressed_by(&self, origin: &Origin) -> bool {
        if self.address == origin.address {
            return true;
        }
        match (&self.local_address, &self.targetable_from) {
            (Some(local), Some(window)) => {
                *local == origin.address && window.contains_range(&origin.range)
            }
            _ => false,
        }
    }

    /// Check whether `offset` in `file` falls within the target.
    pub fn contains_pos(&self, file: &str, offset: TextSize) -> bool {
        self.range.contains_pos(file, offset)
    }
}

/// Ordered collection of targets.
///
/// Order is source order; nested targets follow the nesting of the source.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Targets(Vec<Target>);

impl Targets {
    pub fn new(targets: Vec<Target>) -> Self {
        Self(targets)
    }

    pub fn push(&mut self, target: Target) {
        self.0.push(target);
    }

    pub fn extend(&mut self, targets: Targets) {
        self.0.extend(targets.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Target> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Target> {
        self.0.get(index)
    }

    pub fn as_slice(&self) -> &[Target] {
        &self.0
    }

    /// Iterate over all targets, nested ones included, in pre-order.
    pub fn deep_iter(&self) -> DeepIter<'_> {
        DeepIter {
            stack: vec![self.0.iter()],
        }
    }

    /// All targets, at any depth, that `origin` refers to.
    pub fn match_origin(&self, origin: &Origin) -> Targets {
        self.deep_iter()
            .filter(|target| target.matches(origin))
            .cloned()
            .collect()
    }

    /// The narrowest target, at any depth, containing `offset`.
    ///
    /// Among targets with the same range a typed one is preferred, then the
    /// first in order.
    pub fn innermost_at_pos(&self, file: &str, offset: TextSize) -> Option<&Target> {
        self.deep_iter()
            .filter(|t| t.contains_pos(file, offset))
            .min_by_key(|t| (t.range.range.len(), t.ty.is_none()))
    }

    /// The top-level target containing `offset`.
    pub fn outermost_at_pos(&self, file: &str, offset: TextSize) -> Option<&Target> {
        self.iter().find(|t| t.contains_pos(file, offset))
    }
}

impl FromIterator<Target> for Targets {
    fn from_iter<T: IntoIterator<Item = Target>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Targets {
    type Item = Target;
    type IntoIter = std::vec::IntoIter<Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Targets {
    type Item = &'a Target;
    type IntoIter = std::slice::Iter<'a, Target>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Pre-order iterator returned by [`Targets::deep_iter`].
pub struct DeepIter<'a> {
    stack: Vec<std::slice::Iter<'a, Target>>,
}

impl<'a> Iterator for DeepIter<'a> {
    type Item = &'a Target;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(target) => {
                    self.stack.push(target.nested.iter());
                    return Some(target);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

// ============================================================================
// ORIGINS
// ============================================================================

/// Requirement an origin places on the target it refers to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OriginConstraint {
    pub of_type: Option<Type>,
    pub of_scope_id: Option<ScopeId>,
}

impl OriginConstraint {
    pub fn is_satisfied_by(&self, target: &Target) -> bool {
        let scope_ok = match &self.of_scope_id {
            Some(scope) => target.scope_id.as_ref() == Some(scope),
            None => true,
        };
        let type_ok = match (&self.of_type, &target.ty) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(want), Some(have)) => have.is_dynamic() || have.is_convertible_to(want),
        };
        scope_ok && type_ok
    }
}

/// A traversal expression referring to a target.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Origin {
    pub address: Address,
    pub range: FileRange,
    /// Any one of these must hold. Empty means "address only".
    pub constraints: Vec<OriginConstraint>,
}

impl Origin {
    pub fn new(address: Address, range: FileRange) -> Self {
        Self {
            address,
            range,
            constraints: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, constraint: OriginConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// Ordered collection of origins.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Origins(Vec<Origin>);

impl Origins {
    pub fn new(origins: Vec<Origin>) -> Self {
        Self(origins)
    }

    pub fn push(&mut self, origin: Origin) {
        self.0.push(origin);
    }

    /// Add `origin`, folding its constraints into an existing origin with the
    /// same address and range.
    pub fn push_merged(&mut self, origin: Origin) {
        let existing = self
            .0
            .iter_mut()
            .find(|o| o.address == origin.address && o.range == origin.range);
        match existing {
            Some(existing) => {
                for constraint in origin.constraints {
                    if !existing.constraints.contains(&constraint) {
                        existing.constraints.push(constraint);
                    }
                }
            }
            None => self.0.push(origin),
        }
    }

    pub fn extend(&mut self, origins: Origins) {
        self.0.extend(origins.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Origin> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Origin> {
        self.0.get(index)
    }

    pub fn as_slice(&self) -> &[Origin] {
        &self.0
    }

    /// Sort by file name, then start offset.
    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| a.range.sort_key().cmp(&b.range.sort_key()));
    }

    /// All origins referring to `target` itself.
    pub fn targeting(&self, target: &Target) -> Origins {
        self.iter()
            .filter(|origin| target.matches(origin))
            .cloned()
            .collect()
    }

    /// The origin whose range contains `offset`.
    pub fn at_pos(&self, file: &str, offset: TextSize) -> Option<&Origin> {
        self.iter().find(|o| o.range.contains_pos(file, offset))
    }
}

impl FromIterator<Origin> for Origins {
    fn from_iter<T: IntoIterator<Item = Origin>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Origins {
    type Item = Origin;
    type IntoIter = std::vec::IntoIter<Origin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Origins {
    type Item = &'a Origin;
    type IntoIter = std::slice::Iter<'a, Origin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
