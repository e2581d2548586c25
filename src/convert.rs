//! Type-directed conversion of replacement values.
//!
//! A replacement either converts to the wanted type as a whole or fails with a
//! [`ConversionError`]; there is no partial conversion.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use thiserror::Error;

use crate::path::{Path, PathStep};
use crate::value::{Type, Value};

/// Failure to convert a value, located relative to the value being converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{}", location_prefix(.path), .message)]
pub struct ConversionError {
    pub path: Path,
    pub message: String,
}

impl ConversionError {
    fn new(path: &Path, message: impl Into<String>) -> Self {
        Self {
            path: path.clone(),
            message: message.into(),
        }
    }
}

fn location_prefix(path: &Path) -> String {
    if path.is_root() {
        return String::new();
    }
    let parts: Vec<String> = path
        .steps()
        .iter()
        .map(|step| match step {
            PathStep::Attr(name) => format!("attribute {:?}", name),
            PathStep::Index(index) => format!("element {}", index),
            PathStep::Key(key) => format!("element {:?}", key),
        })
        .collect();
    format!("{}: ", parts.join(", "))
}

/// Convert `value` to `want`.
pub fn convert(value: &Value, want: &Type) -> Result<Value, ConversionError> {
    convert_at(value, want, &Path::root())
}

fn convert_at(value: &Value, want: &Type, path: &Path) -> Result<Value, ConversionError> {
    if *want == Type::Dynamic {
        return Ok(value.clone());
    }
    match value {
        Value::Null(_) => return Ok(Value::Null(want.clone())),
        Value::Unknown(_) => return Ok(Value::Unknown(want.clone())),
        _ => {}
    }
    match want {
        Type::String => to_string(value, path),
        Type::Number => to_number(value, path),
        Type::Bool => to_bool(value, path),
        Type::List(element_type) => match value.elements() {
            Some(elements) => Ok(Value::list_of(
                (**element_type).clone(),
                convert_elements(elements, element_type, path)?,
            )),
            None => Err(ConversionError::new(path, "list required")),
        },
        Type::Set(element_type) => match value.elements() {
            Some(elements) => Ok(Value::set_of(
                (**element_type).clone(),
                convert_elements(elements, element_type, path)?,
            )),
            None => Err(ConversionError::new(path, "set required")),
        },
        Type::Map(element_type) => {
            let entries: Vec<(&String, &Value)> = match value {
                Value::Map { entries, .. } => entries.iter().collect(),
                Value::Object(attributes) => attributes.iter().collect(),
                _ => return Err(ConversionError::new(path, "map required")),
            };
            let mut converted = BTreeMap::new();
            for (key, entry) in entries {
                converted.insert(key.clone(), convert_at(entry, element_type, &path.key(key))?);
            }
            Ok(Value::map_of((**element_type).clone(), converted))
        }
        Type::Object(attribute_types) => {
            let have: IndexMap<&String, &Value> = match value {
                Value::Object(attributes) => attributes.iter().collect(),
                Value::Map { entries, .. } => entries.iter().collect(),
                _ => return Err(ConversionError::new(path, "object required")),
            };
            if let Some(extra) = have.keys().find(|name| !attribute_types.contains_key(name.as_str())) {
                return Err(ConversionError::new(path, format!("unsupported attribute {:?}", extra)));
            }
            let mut converted = IndexMap::with_capacity(attribute_types.len());
            for (name, attribute_type) in attribute_types {
                let attribute = have
                    .get(&name)
                    .ok_or_else(|| ConversionError::new(path, format!("attribute {:?} is required", name)))?;
                converted.insert(name.clone(), convert_at(attribute, attribute_type, &path.attr(name))?);
            }
            Ok(Value::Object(converted))
        }
        Type::Dynamic => Ok(value.clone()),
    }
}

fn convert_elements(elements: &[Value], element_type: &Type, path: &Path) -> Result<Vec<Value>, ConversionError> {
    elements
        .iter()
        .enumerate()
        .map(|(i, element)| convert_at(element, element_type, &path.index(i)))
        .collect()
}

fn to_string(value: &Value, path: &Path) -> Result<Value, ConversionError> {
    match value {
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        _ => Err(ConversionError::new(path, "string required")),
    }
}

fn to_number(value: &Value, path: &Path) -> Result<Value, ConversionError> {
    match value {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::String(s) => match s.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::Number(n)),
            _ => Err(ConversionError::new(path, "a number is required")),
        },
        _ => Err(ConversionError::new(path, "number required")),
    }
}

fn to_bool(value: &Value, path: &Path) -> Result<Value, ConversionError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::String(s) => match s.as_str() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" => Ok(Value::Bool(false)),
            _ => Err(ConversionError::new(path, "a bool is required")),
        },
        _ => Err(ConversionError::new(path, "bool required")),
    }
}
