use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::ScopeId;
use crate::ty::{ObjectType, Type, Value};

/// What an expression is allowed to be.
///
/// Constraint trees are finite and never self-referential; they mirror a
/// fixed schema and are read-only while a document is analysed.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Any expression whose value has this type
    LiteralType(Type),
    /// Exactly this value
    LiteralValue(Value),
    /// A bare identifier, e.g. `mode = strict`
    Keyword(SmolStr),
    /// A traversal pointing at some target
    Reference(Reference),
    /// Alternatives, tried in declared order
    OneOf(Vec<Constraint>),
    List(Box<Constraint>),
    Set(Box<Constraint>),
    /// Per-position element constraints
    Tuple(Vec<Constraint>),
    Map(Box<Constraint>),
    Object(ObjectConstraint),
    /// A type expression such as `list(string)`
    TypeDeclaration,
}

/// Requirements a referencing traversal places on its target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reference {
    pub of_type: Option<Type>,
    pub of_scope_id: Option<ScopeId>,
    /// When set, the traversal itself is a target.
    pub address: Option<ReferenceAddrSchema>,
    pub name: Option<SmolStr>,
}

/// Makes a referencing traversal addressable in its own right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceAddrSchema {
    pub scope_id: Option<ScopeId>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectConstraint {
    pub attributes: IndexMap<SmolStr, ObjectAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectAttribute {
    pub constraint: Constraint,
    pub is_optional: bool,
}

impl ObjectAttribute {
    pub fn required(constraint: Constraint) -> Self {
        Self {
            constraint,
            is_optional: false,
        }
    }

    pub fn optional(constraint: Constraint) -> Self {
        Self {
            constraint,
            is_optional: true,
        }
    }
}

impl ObjectConstraint {
    pub fn new<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (S, ObjectAttribute)>,
        S: Into<SmolStr>,
    {
        Self {
            attributes: attributes
                .into_iter()
                .map(|(name, attr)| (name.into(), attr))
                .collect(),
        }
    }

    /// The object type with optional attributes marked as such.
    pub fn object_type(&self) -> ObjectType {
        ObjectType::new(self.attributes.iter().map(|(name, attr)| {
            (
                name.clone(),
                attr.constraint.constraint_type().unwrap_or(Type::Dynamic),
            )
        }))
        .with_optional(
            self.attributes
                .iter()
                .filter(|(_, attr)| attr.is_optional)
                .map(|(name, _)| name.clone()),
        )
    }
}

impl Reference {
    pub fn of_type(ty: Type) -> Self {
        Self {
            of_type: Some(ty),
            ..Self::default()
        }
    }

    pub fn of_scope(scope_id: impl Into<ScopeId>) -> Self {
        Self {
            of_scope_id: Some(scope_id.into()),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope_id: impl Into<ScopeId>) -> Self {
        self.of_scope_id = Some(scope_id.into());
        self
    }

    /// Turn the referencing traversal into a target under `scope_id`.
    pub fn addressable(mut self, scope_id: Option<ScopeId>) -> Self {
        self.address = Some(ReferenceAddrSchema { scope_id });
        self
    }
}

impl Constraint {
    pub fn list(elem: Constraint) -> Self {
        Constraint::List(Box::new(elem))
    }

    pub fn set(elem: Constraint) -> Self {
        Constraint::Set(Box::new(elem))
    }

    pub fn map(elem: Constraint) -> Self {
        Constraint::Map(Box::new(elem))
    }

    pub fn object<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (S, ObjectAttribute)>,
        S: Into<SmolStr>,
    {
        Constraint::Object(ObjectConstraint::new(attributes))
    }

    pub fn keyword(keyword: impl Into<SmolStr>) -> Self {
        Constraint::Keyword(keyword.into())
    }

    /// Container constraint equivalent to a container literal type.
    ///
    /// Returns `None` for primitives and the dynamic type.
    pub fn for_container_type(ty: &Type) -> Option<Constraint> {
        let literal = |ty: &Type| Constraint::LiteralType(ty.clone());
        let constraint = match ty {
            Type::List(elem) => Constraint::list(literal(elem)),
            Type::Set(elem) => Constraint::set(literal(elem)),
            Type::Map(elem) => Constraint::map(literal(elem)),
            Type::Tuple(elems) => Constraint::Tuple(elems.iter().map(literal).collect()),
            Type::Object(obj) => Constraint::object(obj.attributes.iter().map(|(name, ty)| {
                let attr = if obj.is_optional(name) {
                    ObjectAttribute::optional(literal(ty))
                } else {
                    ObjectAttribute::required(literal(ty))
                };
                (name.clone(), attr)
            })),
            _ => return None,
        };
        Some(constraint)
    }

    /// The type any value satisfying this constraint has, if there is one.
    ///
    /// Keywords and type declarations have no value type.
    pub fn constraint_type(&self) -> Option<Type> {
        let elem = |c: &Constraint| c.constraint_type().unwrap_or(Type::Dynamic);
        match self {
            Constraint::LiteralType(ty) => Some(ty.clone()),
            Constraint::LiteralValue(value) => Some(value.ty()),
            Constraint::Keyword(_) | Constraint::TypeDeclaration => None,
            Constraint::Reference(reference) => {
                Some(reference.of_type.clone().unwrap_or(Type::Dynamic))
            }
            Constraint::List(c) => Some(Type::list(elem(c))),
            Constraint::Set(c) => Some(Type::set(elem(c))),
            Constraint::Map(c) => Some(Type::map(elem(c))),
            Constraint::Tuple(elems) => Some(Type::Tuple(elems.iter().map(elem).collect())),
            Constraint::Object(obj) => Some(Type::Object(obj.object_type())),
            Constraint::OneOf(alternatives) => {
                let mut types = alternatives.iter().filter_map(Constraint::constraint_type);
                let first = types.next()?;
                if types.all(|ty| ty == first) {
                    Some(first)
                } else {
                    Some(Type::Dynamic)
                }
            }
        }
    }

    /// Whether a reference leaf appears anywhere in the tree.
    pub fn contains_reference(&self) -> bool {
        match self {
            Constraint::Reference(_) => true,
            Constraint::OneOf(cs) | Constraint::Tuple(cs) => cs.iter().any(Self::contains_reference),
            Constraint::List(c) | Constraint::Set(c) | Constraint::Map(c) => c.contains_reference(),
            Constraint::Object(obj) => obj
                .attributes
                .values()
                .any(|attr| attr.constraint.contains_reference()),
            Constraint::LiteralType(_)
            | Constraint::LiteralValue(_)
            | Constraint::Keyword(_)
            | Constraint::TypeDeclaration => false,
        }
    }

    /// Short human-readable name, for hover and diagnostics.
    pub fn friendly_name(&self) -> String {
        match self {
            Constraint::Keyword(kw) => format!("keyword {}", kw),
            Constraint::Reference(r) => match (&r.name, &r.of_scope_id) {
                (Some(name), _) => name.to_string(),
                (None, Some(scope)) => format!("reference to {}", scope),
                (None, None) => "reference".to_string(),
            },
            Constraint::TypeDeclaration => "type".to_string(),
            Constraint::OneOf(alternatives) => alternatives
                .iter()
                .map(Constraint::friendly_name)
                .collect::<Vec<_>>()
                .join(" or "),
            other => other
                .constraint_type()
                .map(|ty| ty.friendly_name())
                .unwrap_or_default(),
        }
    }
}

impl From<Reference> for Constraint {
    fn from(reference: Reference) -> Self {
        Constraint::Reference(reference)
    }
}

impl From<Type> for Constraint {
    fn from(ty: Type) -> Self {
        Constraint::LiteralType(ty)
    }
}
