//! Structured value model shared by targets, replacements and synthesized results.
//!
//! Every [`Value`] carries a static [`Type`]. Null and unknown values keep the
//! type they stand in for, so an empty or absent field can still be typed when
//! the merge engine fills it in.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;

/// Static type of a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    String,
    Number,
    Bool,
    /// Accepts a value of any type.
    Dynamic,
    List(Box<Type>),
    Set(Box<Type>),
    Map(Box<Type>),
    Object(IndexMap<String, Type>),
}

impl Type {
    pub fn list(element: Type) -> Self {
        Type::List(Box::new(element))
    }

    pub fn set(element: Type) -> Self {
        Type::Set(Box::new(element))
    }

    pub fn map(element: Type) -> Self {
        Type::Map(Box::new(element))
    }

    /// Build an object type from `(name, type)` pairs, keeping their order.
    pub fn object<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Type)>,
        K: Into<String>,
    {
        Type::Object(attributes.into_iter().map(|(k, t)| (k.into(), t)).collect())
    }

    pub fn empty_object() -> Self {
        Type::Object(IndexMap::new())
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Type::Object(_))
    }

    /// Human-readable name used in diagnostics, e.g. `list of string`.
    pub fn friendly_name(&self) -> String {
        match self {
            Type::String => "string".to_string(),
            Type::Number => "number".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Dynamic => "dynamic".to_string(),
            Type::List(e) => format!("list of {}", e.friendly_name()),
            Type::Set(e) => format!("set of {}", e.friendly_name()),
            Type::Map(e) => format!("map of {}", e.friendly_name()),
            Type::Object(_) => "object".to_string(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.friendly_name())
    }
}

/// A typed, possibly nested value.
///
/// Equality is structural: object and map comparisons ignore field order and
/// set comparisons ignore element order.
#[derive(Debug, Clone)]
pub enum Value {
    Null(Type),
    /// A value that will only be known later (after apply).
    Unknown(Type),
    String(String),
    Number(f64),
    Bool(bool),
    List {
        element_type: Type,
        elements: Vec<Value>,
    },
    Set {
        element_type: Type,
        elements: Vec<Value>,
    },
    Map {
        element_type: Type,
        entries: BTreeMap<String, Value>,
    },
    Object(IndexMap<String, Value>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    pub fn number(n: f64) -> Self {
        Value::Number(n)
    }

    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    pub fn null(ty: Type) -> Self {
        Value::Null(ty)
    }

    pub fn unknown(ty: Type) -> Self {
        Value::Unknown(ty)
    }

    /// List whose element type is taken from the first element (`dynamic` when empty).
    pub fn list(elements: Vec<Value>) -> Self {
        let element_type = first_type(&elements);
        Value::List {
            element_type,
            elements,
        }
    }

    pub fn list_of(element_type: Type, elements: Vec<Value>) -> Self {
        Value::List {
            element_type,
            elements,
        }
    }

    pub fn list_empty(element_type: Type) -> Self {
        Value::list_of(element_type, Vec::new())
    }

    /// Set whose element type is taken from the first element. Equal elements collapse.
    pub fn set(elements: Vec<Value>) -> Self {
        let element_type = first_type(&elements);
        Value::set_of(element_type, elements)
    }

    pub fn set_of(element_type: Type, elements: Vec<Value>) -> Self {
        let mut unique: Vec<Value> = Vec::with_capacity(elements.len());
        for element in elements {
            if !unique.contains(&element) {
                unique.push(element);
            }
        }
        Value::Set {
            element_type,
            elements: unique,
        }
    }

    pub fn set_empty(element_type: Type) -> Self {
        Value::Set {
            element_type,
            elements: Vec::new(),
        }
    }

    /// Map whose element type is taken from the first entry in key order.
    pub fn map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let entries: BTreeMap<String, Value> = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let element_type = entries.values().next().map(Value::ty).unwrap_or(Type::Dynamic);
        Value::Map {
            element_type,
            entries,
        }
    }

    pub fn map_of(element_type: Type, entries: BTreeMap<String, Value>) -> Self {
        Value::Map {
            element_type,
            entries,
        }
    }

    pub fn map_empty(element_type: Type) -> Self {
        Value::map_of(element_type, BTreeMap::new())
    }

    pub fn object<I, K>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Value::Object(attributes.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn empty_object() -> Self {
        Value::Object(IndexMap::new())
    }

    pub fn ty(&self) -> Type {
        match self {
            Value::Null(ty) | Value::Unknown(ty) => ty.clone(),
            Value::String(_) => Type::String,
            Value::Number(_) => Type::Number,
            Value::Bool(_) => Type::Bool,
            Value::List { element_type, .. } => Type::list(element_type.clone()),
            Value::Set { element_type, .. } => Type::set(element_type.clone()),
            Value::Map { element_type, .. } => Type::map(element_type.clone()),
            Value::Object(attributes) => Type::Object(attributes.iter().map(|(k, v)| (k.clone(), v.ty())).collect()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown(_))
    }

    /// True for object values, and for null/unknown placeholders of an object type.
    pub fn is_object(&self) -> bool {
        self.ty().is_object()
    }

    /// True when no unknown value appears anywhere in the tree.
    pub fn is_wholly_known(&self) -> bool {
        match self {
            Value::Unknown(_) => false,
            Value::List { elements, .. } | Value::Set { elements, .. } => elements.iter().all(Value::is_wholly_known),
            Value::Map { entries, .. } => entries.values().all(Value::is_wholly_known),
            Value::Object(attributes) => attributes.values().all(Value::is_wholly_known),
            _ => true,
        }
    }

    /// Attribute of an object value; `None` for anything else.
    pub fn get_attr(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(attributes) => attributes.get(name),
            _ => None,
        }
    }

    /// Elements of a list or set value.
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::List { elements, .. } | Value::Set { elements, .. } => Some(elements),
            _ => None,
        }
    }

    /// Entries of a map value.
    pub fn entries(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map { entries, .. } => Some(entries),
            _ => None,
        }
    }
}

fn first_type(elements: &[Value]) -> Type {
    elements.first().map(Value::ty).unwrap_or(Type::Dynamic)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null(a), Value::Null(b)) | (Value::Unknown(a), Value::Unknown(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (
                Value::List {
                    element_type: ta,
                    elements: a,
                },
                Value::List {
                    element_type: tb,
                    elements: b,
                },
            ) => ta == tb && a == b,
            (
                Value::Set {
                    element_type: ta,
                    elements: a,
                },
                Value::Set {
                    element_type: tb,
                    elements: b,
                },
            ) => ta == tb && a.len() == b.len() && a.iter().all(|x| b.contains(x)),
            (
                Value::Map {
                    element_type: ta,
                    entries: a,
                },
                Value::Map {
                    element_type: tb,
                    entries: b,
                },
            ) => ta == tb && a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friendly_names() {
        assert_eq!(Type::String.friendly_name(), "string");
        assert_eq!(Type::list(Type::String).friendly_name(), "list of string");
        assert_eq!(Type::map(Type::set(Type::Bool)).friendly_name(), "map of set of bool");
        assert_eq!(Type::empty_object().to_string(), "object");
    }

    #[test]
    fn test_object_type_follows_fields() {
        let value = Value::object([("id", Value::null(Type::String)), ("count", Value::number(2.0))]);
        assert_eq!(value.ty(), Type::object([("id", Type::String), ("count", Type::Number)]));
        assert!(value.is_object());
    }

    #[test]
    fn test_null_object_is_object_typed() {
        let value = Value::null(Type::object([("id", Type::String)]));
        assert!(value.is_object());
        assert!(value.is_null());
        assert!(!Value::string("x").is_object());
    }

    #[test]
    fn test_object_equality_ignores_order() {
        let a = Value::object([("a", Value::from("x")), ("b", Value::from(true))]);
        let b = Value::object([("b", Value::from(true)), ("a", Value::from("x"))]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_set_equality_ignores_order() {
        let a = Value::set(vec![Value::from("one"), Value::from("two")]);
        let b = Value::set(vec![Value::from("two"), Value::from("one")]);
        assert_eq!(a, b);
        assert_ne!(a, Value::list(vec![Value::from("one"), Value::from("two")]));
    }

    #[test]
    fn test_set_collapses_duplicates() {
        let set = Value::set(vec![Value::from("one"), Value::from("one")]);
        assert_eq!(set.elements().map(<[Value]>::len), Some(1));
    }

    #[test]
    fn test_null_values_compare_types() {
        assert_eq!(Value::null(Type::String), Value::null(Type::String));
        assert_ne!(Value::null(Type::String), Value::null(Type::Number));
        assert_ne!(Value::null(Type::String), Value::unknown(Type::String));
    }

    #[test]
    fn test_empty_list_keeps_element_type() {
        assert_eq!(Value::list_empty(Type::String).ty(), Type::list(Type::String));
        assert_eq!(Value::list(vec![]).ty(), Type::list(Type::Dynamic));
    }

    #[test]
    fn test_map_infers_element_type() {
        let map = Value::map([("a", Value::number(1.0))]);
        assert_eq!(map.ty(), Type::map(Type::Number));
        assert_eq!(map.entries().map(BTreeMap::len), Some(1));
    }

    #[test]
    fn test_wholly_known() {
        let known = Value::object([("a", Value::list(vec![Value::from("x")]))]);
        assert!(known.is_wholly_known());
        let unknown = Value::object([("a", Value::list(vec![Value::unknown(Type::String)]))]);
        assert!(!unknown.is_wholly_known());
    }

    #[test]
    fn test_get_attr_only_on_objects() {
        let value = Value::object([("id", Value::from("x"))]);
        assert_eq!(value.get_attr("id"), Some(&Value::from("x")));
        assert_eq!(value.get_attr("missing"), None);
        assert_eq!(Value::from("x").get_attr("id"), None);
    }
}
