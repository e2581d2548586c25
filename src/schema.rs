//! Schema description of a configuration block.
//!
//! Schemas are supplied by the caller and only read here. Attribute and block
//! declaration order is kept, and is the order fields are visited in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::Type;

/// Container shape of a nested block or nested attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestingMode {
    #[default]
    Single,
    List,
    Set,
    Map,
}

impl NestingMode {
    /// Wrap the type of one nested object in this container shape.
    pub fn wrap(self, object_type: Type) -> Type {
        match self {
            NestingMode::Single => object_type,
            NestingMode::List => Type::list(object_type),
            NestingMode::Set => Type::set(object_type),
            NestingMode::Map => Type::map(object_type),
        }
    }
}

/// A named set of attributes and nested blocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Attribute>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub block_types: IndexMap<String, NestedBlock>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &str, attribute: Attribute) -> Self {
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    pub fn with_block(mut self, name: &str, block: NestedBlock) -> Self {
        self.block_types.insert(name.to_string(), block);
        self
    }

    /// Object type of a value conforming to this block.
    pub fn implied_type(&self) -> Type {
        let attributes = self.attributes.iter().map(|(name, a)| (name.clone(), a.implied_type()));
        let blocks = self.block_types.iter().map(|(name, b)| (name.clone(), b.implied_type()));
        Type::Object(attributes.chain(blocks).collect())
    }
}

fn dynamic_type() -> Type {
    Type::Dynamic
}

/// A single attribute of a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Declared type; ignored when `nested_type` is set.
    #[serde(rename = "type", default = "dynamic_type")]
    pub ty: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_type: Option<Object>,
    #[serde(default)]
    pub computed: bool,
}

impl Attribute {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            nested_type: None,
            computed: false,
        }
    }

    pub fn computed(ty: Type) -> Self {
        Self {
            computed: true,
            ..Self::new(ty)
        }
    }

    /// Attribute holding nested objects rather than a plain typed value.
    pub fn nested(object: Object) -> Self {
        Self {
            nested_type: Some(object),
            ..Self::new(Type::Dynamic)
        }
    }
    pub fn implied_type(&self) -> Type {
        match &self.nested_type {
            Some(object) => object.implied_type(),
            None => self.ty.clone(),
        }
    }
}

/// Attribute-level nesting: a set of attributes and the container they sit in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Object {
    #[serde(default)]
    pub attributes: IndexMap<String, Attribute>,
    #[serde(default)]
    pub nesting: NestingMode,
}

impl Object {
    pub fn new(nesting: NestingMode) -> Self {
        Self {
            attributes: IndexMap::new(),
            nesting,
        }
    }

    pub fn with_attribute(mut self, name: &str, attribute: Attribute) -> Self {
        self.attributes.insert(name.to_string(), attribute);
        self
    }

    /// Type of a single nested object, before the nesting container is applied.
    pub fn object_type(&self) -> Type {
        Type::Object(
            self.attributes
                .iter()
                .map(|(name, a)| (name.clone(), a.implied_type()))
                .collect(),
        )
    }

    pub fn implied_type(&self) -> Type {
        self.nesting.wrap(self.object_type())
    }
}

/// Block-level nesting: a child block and the container it sits in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NestedBlock {
    pub block: Block,
    #[serde(default)]
    pub nesting: NestingMode,
}

impl NestedBlock {
    pub fn new(block: Block, nesting: NestingMode) -> Self {
        Self { block, nesting }
    }

    pub fn implied_type(&self) -> Type {
        self.nesting.wrap(self.block.implied_type())
    }
}
