//! Symbolic addresses and scope identifiers.
//!
//! An [`Address`] is the key under which a reference target is published and
//! under which an origin looks it up, e.g. `var.region` or
//! `local.tags["env"]`. Addresses are immutable values: descending into a
//! nested structure always produces a new address via [`Address::join`].

use std::fmt;

use smol_str::SmolStr;

/// Namespace tag keeping e.g. variable references and resource references
/// apart even when their addresses and types coincide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScopeId(SmolStr);

impl ScopeId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScopeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of an index step: `[0]` or `["name"]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Key {
    Int(i64),
    Str(SmolStr),
}

/// A single step of an [`Address`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Step {
    /// Bare name at the start of an address (`var`)
    Root(SmolStr),
    /// `.name`
    Attr(SmolStr),
    /// `[key]`
    Index(Key),
}

impl Step {
    pub fn root(name: impl Into<SmolStr>) -> Self {
        Step::Root(name.into())
    }

    pub fn attr(name: impl Into<SmolStr>) -> Self {
        Step::Attr(name.into())
    }

    pub fn index(i: i64) -> Self {
        Step::Index(Key::Int(i))
    }

    pub fn key(key: impl Into<SmolStr>) -> Self {
        Step::Index(Key::Str(key.into()))
    }

    /// The name carried by a root or attribute step.
    pub fn name(&self) -> Option<&str> {
        match self {
            Step::Root(name) | Step::Attr(name) => Some(name),
            Step::Index(_) => None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Root(name) => f.write_str(name),
            Step::Attr(name) if is_identifier(name) => write!(f, ".{}", name),
            Step::Attr(name) => write!(f, "[{:?}]", name.as_str()),
            Step::Index(Key::Int(i)) => write!(f, "[{}]", i),
            Step::Index(Key::Str(s)) => write!(f, "[{:?}]", s.as_str()),
        }
    }
}

/// Whether `name` can be written as a bare identifier (dashes allowed).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || unicode_ident::is_xid_start(c))
        && chars.all(|c| c == '-' || unicode_ident::is_xid_continue(c))
}

/// Ordered sequence of steps identifying a symbolic location.
///
/// Equality is structural and the derived ordering is lexicographic over
/// steps, which gives a deterministic order for sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Address(Vec<Step>);

impl Address {
    pub fn new(steps: Vec<Step>) -> Self {
        Self(steps)
    }

    /// Single-step address consisting of a root name.
    pub fn root(name: impl Into<SmolStr>) -> Self {
        Self(vec![Step::root(name)])
    }

    /// Build a dotted address like `var.foo.bar` from names.
    ///
    /// The first name becomes the root step, the rest attribute steps.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                if i == 0 {
                    Step::root(name)
                } else {
                    Step::attr(name)
                }
            })
            .collect()
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&Step> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Step> {
        self.0.last()
    }

    /// Return a new address with `step` appended.
    ///
    /// Joining an attribute step onto an empty address yields a root step,
    /// so addresses built step by step stay well formed.
    pub fn join(&self, step: Step) -> Address {
        let step = match step {
            Step::Attr(name) if self.0.is_empty() => Step::Root(name),
            other => other,
        };
        let mut steps = Vec::with_capacity(self.0.len() + 1);
        steps.extend(self.0.iter().cloned());
        steps.push(step);
        Address(steps)
    }

    /// Check if `prefix` is a (non-strict) prefix of this address.
    pub fn starts_with(&self, prefix: &Address) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl FromIterator<Step> for Address {
    fn from_iter<T: IntoIterator<Item = Step>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}
