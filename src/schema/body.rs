use indexmap::IndexMap;
use smol_str::SmolStr;

use super::Constraint;
use crate::base::{Address, ScopeId};
use crate::ty::{Type, Value};

/// Attributes and blocks allowed in a body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodySchema {
    pub attributes: IndexMap<SmolStr, AttributeSchema>,
    pub blocks: IndexMap<SmolStr, BlockSchema>,
    /// Schema for attributes not declared by name
    pub any_attribute: Option<Box<AttributeSchema>>,
    /// Extra targets the body exposes regardless of its content
    pub targetable_as: Vec<Targetable>,
}

impl BodySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<SmolStr>, schema: AttributeSchema) -> Self {
        self.attributes.insert(name.into(), schema);
        self
    }

    pub fn with_block(mut self, name: impl Into<SmolStr>, schema: BlockSchema) -> Self {
        self.blocks.insert(name.into(), schema);
        self
    }

    pub fn with_any_attribute(mut self, schema: AttributeSchema) -> Self {
        self.any_attribute = Some(Box::new(schema));
        self
    }

    pub fn with_targetable(mut self, targetable: Targetable) -> Self {
        self.targetable_as.push(targetable);
        self
    }

    /// Schema for the attribute named `name`, falling back to `any_attribute`.
    pub fn attribute_schema(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes
            .get(name)
            .or_else(|| self.any_attribute.as_deref())
    }

    /// Overlay `other` on top of this schema. Declarations in `other` win.
    pub fn merged_with(&self, other: &BodySchema) -> BodySchema {
        let mut merged = self.clone();
        for (name, attr) in &other.attributes {
            merged.attributes.insert(name.clone(), attr.clone());
        }
        for (name, block) in &other.blocks {
            merged.blocks.insert(name.clone(), block.clone());
        }
        if other.any_attribute.is_some() {
            merged.any_attribute = other.any_attribute.clone();
        }
        merged.targetable_as.extend(other.targetable_as.iter().cloned());
        merged
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSchema {
    pub constraint: Constraint,
    pub is_optional: bool,
    pub address: Option<AttributeAddrSchema>,
    pub description: Option<SmolStr>,
}

impl AttributeSchema {
    pub fn new(constraint: impl Into<Constraint>) -> Self {
        Self {
            constraint: constraint.into(),
            is_optional: false,
            address: None,
            description: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn with_address(mut self, address: AttributeAddrSchema) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_description(mut self, description: impl Into<SmolStr>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One step of an address built from schema, syntax and values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddrStep {
    /// A constant name
    Static(SmolStr),
    /// The attribute's own name
    AttrName,
    /// The block label at this position
    Label(usize),
    /// The literal value of a sibling (or, for blocks, body) attribute
    AttrValue { name: SmolStr, is_optional: bool },
}

impl AddrStep {
    pub fn stat(name: impl Into<SmolStr>) -> Self {
        AddrStep::Static(name.into())
    }

    pub fn attr_value(name: impl Into<SmolStr>) -> Self {
        AddrStep::AttrValue {
            name: name.into(),
            is_optional: false,
        }
    }
}

/// How an attribute becomes a target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeAddrSchema {
    pub steps: Vec<AddrStep>,
    pub friendly_name: Option<SmolStr>,
    pub scope_id: Option<ScopeId>,
    /// Target carries the type (and nested targets) of the expression
    pub as_expr_type: bool,
    /// Target is addressable by name only
    pub as_reference: bool,
}

impl AttributeAddrSchema {
    pub fn new(steps: impl IntoIterator<Item = AddrStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn as_expr_type(mut self) -> Self {
        self.as_expr_type = true;
        self
    }

    pub fn as_reference(mut self) -> Self {
        self.as_reference = true;
        self
    }

    pub fn scope(mut self, scope_id: impl Into<ScopeId>) -> Self {
        self.scope_id = Some(scope_id.into());
        self
    }

    pub fn friendly_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }
}

/// How many instances of a block may appear and how they combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlockType {
    /// A single block, typed as an object
    #[default]
    Object,
    /// Repeated blocks, typed as a list of objects indexed by position
    List,
    /// Repeated blocks, typed as a set of objects indexed by position
    Set,
    /// Repeated blocks, typed as a map of objects keyed by the first label
    Map,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSchema {
    pub name: SmolStr,
    /// The label selects a dependent body
    pub is_dep_key: bool,
}

impl LabelSchema {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            is_dep_key: false,
        }
    }

    pub fn dep_key(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            is_dep_key: true,
        }
    }
}

/// Conditions selecting a dependent body. All of them must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyKeys {
    pub labels: Vec<LabelDependent>,
    pub attributes: Vec<AttributeDependent>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDependent {
    pub index: usize,
    pub value: SmolStr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDependent {
    pub name: SmolStr,
    pub value: Value,
}

impl DependencyKeys {
    pub fn label(index: usize, value: impl Into<SmolStr>) -> Self {
        Self::default().and_label(index, value)
    }

    pub fn and_label(mut self, index: usize, value: impl Into<SmolStr>) -> Self {
        self.labels.push(LabelDependent {
            index,
            value: value.into(),
        });
        self
    }

    pub fn and_attribute(mut self, name: impl Into<SmolStr>, value: Value) -> Self {
        self.attributes.push(AttributeDependent {
            name: name.into(),
            value,
        });
        self
    }

    /// Check the keys against a block's labels and a lookup of its
    /// attributes' static values.
    pub fn matches(&self, labels: &[&str], attribute_value: &dyn Fn(&str) -> Option<Value>) -> bool {
        self.labels
            .iter()
            .all(|dep| labels.get(dep.index).is_some_and(|l| *l == dep.value))
            && self
                .attributes
                .iter()
                .all(|dep| attribute_value(&dep.name).is_some_and(|v| v == dep.value))
    }
}

/// Makes a block body the type of the block's own target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockAsTypeOf {
    /// Attribute holding a type declaration
    pub attribute_expr: Option<SmolStr>,
    /// Attribute holding a value whose type refines the declaration
    pub attribute_value: Option<SmolStr>,
}

/// How a block becomes a target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockAddrSchema {
    pub steps: Vec<AddrStep>,
    pub friendly_name: Option<SmolStr>,
    pub scope_id: Option<ScopeId>,
    pub as_reference: bool,
    pub as_type_of: Option<BlockAsTypeOf>,
    /// Target typed as an object built from the declared body
    pub body_as_data: bool,
    /// Body attributes and blocks become nested targets
    pub infer_body: bool,
    pub dependent_body_as_data: bool,
    pub infer_dependent_body: bool,
    /// Dependent body attributes are addressable as `self.<name>` inside the block
    pub dependent_body_self_ref: bool,
}

impl BlockAddrSchema {
    pub fn new(steps: impl IntoIterator<Item = AddrStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn as_reference(mut self) -> Self {
        self.as_reference = true;
        self
    }

    pub fn scope(mut self, scope_id: impl Into<ScopeId>) -> Self {
        self.scope_id = Some(scope_id.into());
        self
    }

    pub fn friendly_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    pub fn as_type_of(mut self, as_type_of: BlockAsTypeOf) -> Self {
        self.as_type_of = Some(as_type_of);
        self
    }

    pub fn body_as_data(mut self) -> Self {
        self.body_as_data = true;
        self
    }

    pub fn infer_body(mut self) -> Self {
        self.infer_body = true;
        self
    }

    pub fn dependent_body_as_data(mut self) -> Self {
        self.dependent_body_as_data = true;
        self
    }

    pub fn infer_dependent_body(mut self) -> Self {
        self.infer_dependent_body = true;
        self
    }

    pub fn dependent_body_self_ref(mut self) -> Self {
        self.dependent_body_self_ref = true;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockSchema {
    pub labels: Vec<LabelSchema>,
    pub block_type: BlockType,
    pub body: BodySchema,
    /// Bodies selected by label or attribute values; the first match wins
    pub dependent_body: Vec<(DependencyKeys, BodySchema)>,
    pub address: Option<BlockAddrSchema>,
    pub description: Option<SmolStr>,
}

impl BlockSchema {
    pub fn new(body: BodySchema) -> Self {
        Self {
            body,
            ..Self::default()
        }
    }

    pub fn with_labels(mut self, labels: impl IntoIterator<Item = LabelSchema>) -> Self {
        self.labels = labels.into_iter().collect();
        self
    }

    pub fn with_type(mut self, block_type: BlockType) -> Self {
        self.block_type = block_type;
        self
    }

    pub fn with_address(mut self, address: BlockAddrSchema) -> Self {
        self.address = Some(address);
        self
    }

    pub fn with_dependent_body(mut self, keys: DependencyKeys, body: BodySchema) -> Self {
        self.dependent_body.push((keys, body));
        self
    }

    /// The dependent body selected by the given labels and attribute values.
    pub fn dependent_body_for(
        &self,
        labels: &[&str],
        attribute_value: &dyn Fn(&str) -> Option<Value>,
    ) -> Option<&BodySchema> {
        self.dependent_body
            .iter()
            .find(|(keys, _)| keys.matches(labels, attribute_value))
            .map(|(_, body)| body)
    }
}

/// An extra target declared by the schema rather than found in syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct Targetable {
    pub address: Address,
    pub scope_id: Option<ScopeId>,
    pub as_type: Option<Type>,
    pub friendly_name: Option<SmolStr>,
    pub nested: Vec<Targetable>,
}

impl Targetable {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            scope_id: None,
            as_type: None,
            friendly_name: None,
            nested: Vec::new(),
        }
    }

    pub fn scope(mut self, scope_id: impl Into<ScopeId>) -> Self {
        self.scope_id = Some(scope_id.into());
        self
    }

    pub fn typed(mut self, ty: Type) -> Self {
        self.as_type = Some(ty);
        self
    }

    pub fn with_nested(mut self, nested: Targetable) -> Self {
        self.nested.push(nested);
        self
    }
}
