//! Data types of block bodies.

use crate::schema::{BlockType, BodySchema};
use crate::ty::{ObjectType, Type};

/// Object type a body has when its block is treated as data.
///
/// Attributes contribute their constraint's type, nested blocks the type of
/// their own body wrapped according to the block type.
pub fn body_to_data_type(schema: &BodySchema) -> Type {
    let mut obj = ObjectType::default();
    for (name, attr) in &schema.attributes {
        let ty = attr.constraint.constraint_type().unwrap_or(Type::Dynamic);
        obj.attributes.insert(name.clone(), ty);
        if attr.is_optional {
            obj.optional.insert(name.clone());
        }
    }
    for (name, block) in &schema.blocks {
        let ty = wrap_block_type(block.block_type, body_to_data_type(&block.body));
        obj.attributes.insert(name.clone(), ty);
    }
    Type::Object(obj)
}

/// Wrap the type of one block instance according to how the block repeats.
pub fn wrap_block_type(block_type: BlockType, ty: Type) -> Type {
    match block_type {
        BlockType::Object => ty,
        BlockType::List => Type::list(ty),
        BlockType::Set => Type::set(ty),
        BlockType::Map => Type::map(ty),
    }
}
