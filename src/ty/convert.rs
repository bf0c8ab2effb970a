//! Type conversion rules used when matching targets against origin
//! constraints.

use super::Type;

impl Type {
    /// Check if a value of this type (not yet known) could be converted to `want`.
    ///
    /// Mirrors the language's implicit conversions: primitives convert to and
    /// from strings (but not bool <-> number), sequences convert element-wise,
    /// and objects convert to objects with a subset of their attributes.
    pub fn is_convertible_to(&self, want: &Type) -> bool {
        if self == want {
            return true;
        }
        match (self, want) {
            (Type::Dynamic, _) | (_, Type::Dynamic) => true,
            (Type::Bool | Type::Number, Type::String) => true,
            (Type::String, Type::Bool | Type::Number) => true,
            (Type::List(have) | Type::Set(have), Type::List(elem) | Type::Set(elem)) => {
                have.is_convertible_to(elem)
            }
            (Type::Tuple(elems), Type::List(elem) | Type::Set(elem)) => {
                elems.iter().all(|e| e.is_convertible_to(elem))
            }
            (Type::Tuple(have), Type::Tuple(want)) => {
                have.len() == want.len()
                    && have.iter().zip(want).all(|(h, w)| h.is_convertible_to(w))
            }
            (Type::Map(have), Type::Map(elem)) => have.is_convertible_to(elem),
            (Type::Object(obj), Type::Map(elem)) => {
                obj.attributes.values().all(|t| t.is_convertible_to(elem))
            }
            (Type::Object(have), Type::Object(want)) => {
                want.attributes
                    .iter()
                    .all(|(name, want_ty)| match have.attributes.get(name) {
                        Some(have_ty) => have_ty.is_convertible_to(want_ty),
                        None => want.is_optional(name),
                    })
            }
            _ => false,
        }
    }
}
