//! JSON encoding of types and values.
//!
//! Types use the provider schema notation: primitives are plain strings
//! (`"string"`), collections are two-element arrays (`["list", "string"]`) and
//! objects carry their attribute types (`["object", {"id": "string"}]`).

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Number};
use thiserror::Error;

use crate::convert::convert;
use crate::path::Path;
use crate::value::{Type, Value};

/// Errors decoding types or values from JSON.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("invalid type specification: {0}")]
    InvalidType(String),

    #[error("{}{message}", location(.path))]
    Decode { path: Path, message: String },

    #[error(transparent)]
    Syntax(#[from] serde_json::Error),
}

fn location(path: &Path) -> String {
    if path.is_root() {
        String::new()
    } else {
        format!("at {}: ", path)
    }
}

fn decode_error(path: &Path, message: impl Into<String>) -> JsonError {
    JsonError::Decode {
        path: path.clone(),
        message: message.into(),
    }
}

impl Type {
    pub fn from_json(json: &serde_json::Value) -> Result<Type, JsonError> {
        match json {
            serde_json::Value::String(name) => match name.as_str() {
                "string" => Ok(Type::String),
                "number" => Ok(Type::Number),
                "bool" => Ok(Type::Bool),
                "dynamic" => Ok(Type::Dynamic),
                other => Err(JsonError::InvalidType(format!("unknown primitive type {:?}", other))),
            },
            serde_json::Value::Array(parts) if parts.len() == 2 => {
                let kind = parts[0]
                    .as_str()
                    .ok_or_else(|| JsonError::InvalidType(format!("type kind must be a string, got {}", parts[0])))?;
                match kind {
                    "list" => Ok(Type::list(Type::from_json(&parts[1])?)),
                    "set" => Ok(Type::set(Type::from_json(&parts[1])?)),
                    "map" => Ok(Type::map(Type::from_json(&parts[1])?)),
                    "object" => {
                        let attributes = parts[1].as_object().ok_or_else(|| {
                            JsonError::InvalidType("object attribute types must be a JSON object".to_string())
                        })?;
                        let mut types = IndexMap::with_capacity(attributes.len());
                        for (name, attribute) in attributes {
                            types.insert(name.clone(), Type::from_json(attribute)?);
                        }
                        Ok(Type::Object(types))
                    }
                    other => Err(JsonError::InvalidType(format!("unknown type kind {:?}", other))),
                }
            }
            other => Err(JsonError::InvalidType(other.to_string())),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Type::String => json!("string"),
            Type::Number => json!("number"),
            Type::Bool => json!("bool"),
            Type::Dynamic => json!("dynamic"),
            Type::List(e) => json!(["list", e.to_json()]),
            Type::Set(e) => json!(["set", e.to_json()]),
            Type::Map(e) => json!(["map", e.to_json()]),
            Type::Object(attributes) => {
                let types: Map<String, serde_json::Value> =
                    attributes.iter().map(|(name, t)| (name.clone(), t.to_json())).collect();
                json!(["object", types])
            }
        }
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Type {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Type::from_json(&raw).map_err(serde::de::Error::custom)
    }
}

impl Value {
    /// Decode JSON as a value of type `ty`.
    ///
    /// Object attributes missing from the JSON decode as nulls of their type.
    pub fn from_json_typed(json: &serde_json::Value, ty: &Type) -> Result<Value, JsonError> {
        decode_typed(json, ty, &Path::root())
    }

    /// Decode JSON without a type, inferring one from the data.
    ///
    /// Arrays become lists of their first non-null element's type; every
    /// other element must convert to it.
    pub fn infer_from_json(json: &serde_json::Value) -> Result<Value, JsonError> {
        infer(json, &Path::root())
    }

    /// Encode as JSON. Unknown values encode as `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null(_) | Value::Unknown(_) => serde_json::Value::Null,
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::List { elements, .. } | Value::Set { elements, .. } => {
                serde_json::Value::Array(elements.iter().map(Value::to_json).collect())
            }
            Value::Map { entries, .. } => {
                serde_json::Value::Object(entries.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            }
            Value::Object(attributes) => {
                serde_json::Value::Object(attributes.iter().map(|(k, v)| (k.clone(), v.to_json())).collect())
            }
        }
    }
}

fn decode_typed(json: &serde_json::Value, ty: &Type, path: &Path) -> Result<Value, JsonError> {
    if json.is_null() {
        return Ok(Value::Null(ty.clone()));
    }
    match ty {
        Type::Dynamic => infer(json, path),
        Type::String => json
            .as_str()
            .map(Value::string)
            .ok_or_else(|| decode_error(path, "string required")),
        Type::Number => json
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| decode_error(path, "number required")),
        Type::Bool => json
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| decode_error(path, "bool required")),
        Type::List(element_type) | Type::Set(element_type) => {
            let items = json.as_array().ok_or_else(|| {
                decode_error(path, format!("{} required", if matches!(ty, Type::Set(_)) { "set" } else { "list" }))
            })?;
            let elements = items
                .iter()
                .enumerate()
                .map(|(i, item)| decode_typed(item, element_type, &path.index(i)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(match ty {
                Type::Set(_) => Value::set_of((**element_type).clone(), elements),
                _ => Value::list_of((**element_type).clone(), elements),
            })
        }
        Type::Map(element_type) => {
            let object = json.as_object().ok_or_else(|| decode_error(path, "map required"))?;
            let mut entries = BTreeMap::new();
            for (key, item) in object {
                entries.insert(key.clone(), decode_typed(item, element_type, &path.key(key))?);
            }
            Ok(Value::map_of((**element_type).clone(), entries))
        }
        Type::Object(attribute_types) => {
            let object = json.as_object().ok_or_else(|| decode_error(path, "object required"))?;
            if let Some(extra) = object.keys().find(|name| !attribute_types.contains_key(name.as_str())) {
                return Err(decode_error(path, format!("unsupported attribute {:?}", extra)));
            }
            let mut attributes = IndexMap::with_capacity(attribute_types.len());
            for (name, attribute_type) in attribute_types {
                let value = match object.get(name) {
                    Some(item) => decode_typed(item, attribute_type, &path.attr(name))?,
                    None => Value::Null(attribute_type.clone()),
                };
                attributes.insert(name.clone(), value);
            }
            Ok(Value::Object(attributes))
        }
    }
}

fn infer(json: &serde_json::Value, path: &Path) -> Result<Value, JsonError> {
    match json {
        serde_json::Value::Null => Ok(Value::Null(Type::Dynamic)),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(Value::Number)
            .ok_or_else(|| decode_error(path, format!("number {} is out of range", n))),
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Array(items) => {
            let elements = items
                .iter()
                .enumerate()
                .map(|(i, item)| infer(item, &path.index(i)))
                .collect::<Result<Vec<_>, _>>()?;
            let element_type = elements
                .iter()
                .find(|e| !e.is_null())
                .map(Value::ty)
                .unwrap_or(Type::Dynamic);
            let elements = elements
                .iter()
                .enumerate()
                .map(|(i, element)| {
                    convert(element, &element_type).map_err(|_| {
                        decode_error(
                            &path.index(i),
                            format!("list elements must all be {}", element_type.friendly_name()),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::list_of(element_type, elements))
        }
        serde_json::Value::Object(object) => {
            let mut attributes = IndexMap::with_capacity(object.len());
            for (name, item) in object {
                attributes.insert(name.clone(), infer(item, &path.attr(name))?);
            }
            Ok(Value::Object(attributes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_types() {
        assert_eq!(Type::from_json(&json!("string")).unwrap(), Type::String);
        assert_eq!(Type::from_json(&json!("dynamic")).unwrap(), Type::Dynamic);
        assert!(Type::from_json(&json!("integer")).is_err());
    }

    #[test]
    fn test_composite_types() {
        let ty = Type::from_json(&json!(["list", ["object", {"id": "string", "n": "number"}]])).unwrap();
        assert_eq!(
            ty,
            Type::list(Type::object([("id", Type::String), ("n", Type::Number)]))
        );
        assert_eq!(Type::from_json(&ty.to_json()).unwrap(), ty);
    }

    #[test]
    fn test_invalid_type_kind() {
        let err = Type::from_json(&json!(["tuple", "string"])).unwrap_err();
        assert_eq!(err.to_string(), "invalid type specification: unknown type kind \"tuple\"");
    }

    #[test]
    fn test_type_serde() {
        let ty: Type = serde_json::from_str(r#"["map", "bool"]"#).unwrap();
        assert_eq!(ty, Type::map(Type::Bool));
        assert_eq!(serde_json::to_string(&ty).unwrap(), r#"["map","bool"]"#);
    }

    #[test]
    fn test_typed_decode_fills_missing_attributes() {
        let ty = Type::object([("id", Type::String), ("value", Type::String)]);
        let value = Value::from_json_typed(&json!({"value": "Hello, world!"}), &ty).unwrap();
        assert_eq!(
            value,
            Value::object([
                ("id", Value::null(Type::String)),
                ("value", Value::from("Hello, world!")),
            ])
        );
    }

    #[test]
    fn test_typed_decode_set() {
        let ty = Type::set(Type::String);
        let value = Value::from_json_typed(&json!(["b", "a"]), &ty).unwrap();
        assert_eq!(value, Value::set(vec![Value::from("a"), Value::from("b")]));
    }

    #[test]
    fn test_typed_decode_error_is_located() {
        let ty = Type::object([("tags", Type::map(Type::String))]);
        let err = Value::from_json_typed(&json!({"tags": {"env": 1}}), &ty).unwrap_err();
        assert_eq!(err.to_string(), "at tags[\"env\"]: string required");
    }

    #[test]
    fn test_typed_decode_rejects_unsupported_attribute() {
        let ty = Type::object([("id", Type::String)]);
        let err = Value::from_json_typed(&json!({"other": "x"}), &ty).unwrap_err();
        assert_eq!(err.to_string(), "unsupported attribute \"other\"");
    }

    #[test]
    fn test_infer_object() {
        let value = Value::infer_from_json(&json!({"id": "myvalue", "count": 2})).unwrap();
        assert_eq!(
            value,
            Value::object([("id", Value::from("myvalue")), ("count", Value::number(2.0))])
        );
    }

    #[test]
    fn test_infer_list() {
        let value = Value::infer_from_json(&json!(["a", null, "b"])).unwrap();
        assert_eq!(
            value,
            Value::list(vec![Value::from("a"), Value::null(Type::String), Value::from("b")])
        );
        assert_eq!(Value::infer_from_json(&json!([])).unwrap(), Value::list_empty(Type::Dynamic));
    }

    #[test]
    fn test_infer_inconsistent_list() {
        let err = Value::infer_from_json(&json!(["a", {"b": 1}])).unwrap_err();
        assert_eq!(err.to_string(), "at [1]: list elements must all be string");
    }

    #[test]
    fn test_to_json() {
        let value = Value::object([
            ("id", Value::unknown(Type::String)),
            ("tags", Value::map([("env", Value::from("test"))])),
            ("ports", Value::list(vec![Value::number(80.0)])),
        ]);
        assert_eq!(
            value.to_json(),
            json!({"id": null, "tags": {"env": "test"}, "ports": [80.0]})
        );
    }
}
