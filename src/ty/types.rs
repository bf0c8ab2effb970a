use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use smol_str::SmolStr;

/// A structural type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Type {
    /// Any type; resolved from a concrete value where one is available
    Dynamic,
    Bool,
    Number,
    String,
    List(Box<Type>),
    Set(Box<Type>),
    Map(Box<Type>),
    Tuple(Vec<Type>),
    Object(ObjectType),
}

/// Attribute types of an object, some of which may be optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ObjectType {
    pub attributes: BTreeMap<SmolStr, Type>,
    pub optional: BTreeSet<SmolStr>,
}

impl ObjectType {
    pub fn new<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (S, Type)>,
        S: Into<SmolStr>,
    {
        Self {
            attributes: attributes
                .into_iter()
                .map(|(name, ty)| (name.into(), ty))
                .collect(),
            optional: BTreeSet::new(),
        }
    }

    /// Mark the given attributes as optional.
    pub fn with_optional<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.optional.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_optional(&self, name: &str) -> bool {
        self.optional.contains(name)
    }
}

impl Type {
    pub fn list(elem: Type) -> Self {
        Type::List(Box::new(elem))
    }

    pub fn set(elem: Type) -> Self {
        Type::Set(Box::new(elem))
    }

    pub fn map(elem: Type) -> Self {
        Type::Map(Box::new(elem))
    }

    pub fn object<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (S, Type)>,
        S: Into<SmolStr>,
    {
        Type::Object(ObjectType::new(attributes))
    }

    pub fn object_with_optional<I, S, O, N>(attributes: I, optional: O) -> Self
    where
        I: IntoIterator<Item = (S, Type)>,
        S: Into<SmolStr>,
        O: IntoIterator<Item = N>,
        N: Into<SmolStr>,
    {
        Type::Object(ObjectType::new(attributes).with_optional(optional))
    }

    pub fn empty_object() -> Self {
        Type::Object(ObjectType::default())
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Type::Dynamic)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Bool | Type::Number | Type::String)
    }

    /// Element type of a list, set or map.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::List(elem) | Type::Set(elem) | Type::Map(elem) => Some(elem),
            _ => None,
        }
    }

    /// Human-readable name in type-declaration syntax, e.g. `list(string)`.
    pub fn friendly_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Dynamic => f.write_str("any"),
            Type::Bool => f.write_str("bool"),
            Type::Number => f.write_str("number"),
            Type::String => f.write_str("string"),
            Type::List(elem) => write!(f, "list({})", elem),
            Type::Set(elem) => write!(f, "set({})", elem),
            Type::Map(elem) => write!(f, "map({})", elem),
            Type::Tuple(elems) => {
                f.write_str("tuple([")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", elem)?;
                }
                f.write_str("])")
            }
            Type::Object(obj) => {
                f.write_str("object({")?;
                for (i, (name, ty)) in obj.attributes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if obj.is_optional(name) {
                        write!(f, "{}=optional({})", name, ty)?;
                    } else {
                        write!(f, "{}={}", name, ty)?;
                    }
                }
                f.write_str("})")
            }
        }
    }
}
