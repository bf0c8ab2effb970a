use super::*;
use indexmap::IndexMap;
use rstest::rstest;

#[test]
fn test_value_types() {
    assert_eq!(Value::Bool(true).ty(), Type::Bool);
    assert_eq!(Value::Null.ty(), Type::Dynamic);
    let tuple = Value::Tuple(vec![Value::Number(1.0), Value::string("a")]);
    assert_eq!(tuple.ty(), Type::Tuple(vec![Type::Number, Type::String]));

    let mut attrs = IndexMap::new();
    attrs.insert("name".into(), Value::string("x"));
    assert_eq!(
        Value::Object(attrs).ty(),
        Type::object([("name", Type::String)])
    );
}

#[test]
fn test_as_integer() {
    assert_eq!(Value::Number(3.0).as_integer(), Some(3));
    assert_eq!(Value::Number(3.5).as_integer(), None);
    assert_eq!(Value::string("3").as_integer(), None);
}

#[test]
fn test_display_type_declaration_syntax() {
    let ty = Type::object_with_optional(
        [("bar", Type::Number), ("foo", Type::list(Type::String))],
        ["foo"],
    );
    assert_eq!(ty.to_string(), "object({bar=number,foo=optional(list(string))})");
    assert_eq!(
        Type::Tuple(vec![Type::Bool, Type::Dynamic]).to_string(),
        "tuple([bool,any])"
    );
}

#[rstest]
#[case(Type::String, Type::String, true)]
#[case(Type::Number, Type::String, true)]
#[case(Type::String, Type::Number, true)]
#[case(Type::Bool, Type::Number, false)]
#[case(Type::Dynamic, Type::list(Type::Bool), true)]
#[case(Type::list(Type::Number), Type::set(Type::String), true)]
#[case(Type::list(Type::Bool), Type::map(Type::Bool), false)]
#[case(Type::Tuple(vec![Type::Number, Type::Number]), Type::list(Type::Number), true)]
#[case(Type::Tuple(vec![Type::Bool, Type::Number]), Type::list(Type::Number), false)]
fn test_is_convertible_to(#[case] have: Type, #[case] want: Type, #[case] expected: bool) {
    assert_eq!(have.is_convertible_to(&want), expected, "{} -> {}", have, want);
}

#[test]
fn test_object_conversion_respects_optional_attributes() {
    let have = Type::object([("bar", Type::Number), ("extra", Type::Bool)]);
    let want = Type::object_with_optional(
        [("bar", Type::Number), ("foo", Type::String)],
        ["foo"],
    );
    assert!(have.is_convertible_to(&want));

    let strict = Type::object([("bar", Type::Number), ("foo", Type::String)]);
    assert!(!have.is_convertible_to(&strict));
}
