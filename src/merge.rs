//! Schema-directed merge of a target value with an optional replacement.
//!
//! The schema is authoritative for shape: the merged object has exactly the
//! schema's fields. Non-computed attributes pass through from the target,
//! computed ones that are still unset are filled from the replacement or the
//! generator. A replacement inside a list, set or map nesting is not indexed;
//! the one replacement object applies to every element.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use tracing::{instrument, trace};

use crate::convert::convert;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::generator::ValueGenerator;
use crate::path::{Path, SourceRange};
use crate::schema::{Attribute, Block, NestedBlock, NestingMode};
use crate::value::{Type, Value};

/// Which computed values count as unset, and what fills them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Null computed values are filled with the replacement or a generated value.
    DataSource,
    /// Null computed values take the replacement, otherwise become unknown.
    PlanResource,
    /// Unknown computed values are filled with the replacement or a generated value.
    ApplyResource,
}

impl Mode {
    fn is_unset(self, target: &Value) -> bool {
        match self {
            Mode::DataSource | Mode::PlanResource => target.is_null(),
            Mode::ApplyResource => target.is_unknown(),
        }
    }
}

/// Attributes and nested blocks merged together into one object.
#[derive(Clone, Copy)]
struct Fields<'s> {
    attributes: &'s IndexMap<String, Attribute>,
    block_types: Option<&'s IndexMap<String, NestedBlock>>,
}

impl<'s> Fields<'s> {
    fn of_block(block: &'s Block) -> Self {
        Self {
            attributes: &block.attributes,
            block_types: Some(&block.block_types),
        }
    }

    fn of_attributes(attributes: &'s IndexMap<String, Attribute>) -> Self {
        Self {
            attributes,
            block_types: None,
        }
    }

    fn object_type(&self) -> Type {
        let attributes = self.attributes.iter().map(|(name, a)| (name.clone(), a.implied_type()));
        let blocks = self
            .block_types
            .into_iter()
            .flatten()
            .map(|(name, b)| (name.clone(), b.implied_type()));
        Type::Object(attributes.chain(blocks).collect())
    }
}

/// Walks a schema alongside target and replacement values.
pub struct Merger<'a> {
    mode: Mode,
    range: &'a SourceRange,
    generator: &'a mut ValueGenerator,
    diags: Diagnostics,
}

impl<'a> Merger<'a> {
    /// `range` is where the replacement value was defined, for diagnostics.
    pub fn new(mode: Mode, range: &'a SourceRange, generator: &'a mut ValueGenerator) -> Self {
        Self {
            mode,
            range,
            generator,
            diags: Diagnostics::new(),
        }
    }

    /// Merge `target` against `block`. `replacement` must be an object when present.
    #[instrument(level = "trace", name = "merge_block", skip_all, fields(path = %path))]
    pub fn merge_block(&mut self, target: &Value, replacement: Option<&Value>, block: &Block, path: &Path) -> Value {
        self.merge_fields(target, replacement, Fields::of_block(block), path)
    }

    /// Diagnostics raised so far, in visiting order.
    pub fn finish(self) -> Diagnostics {
        self.diags
    }

    fn merge_fields(&mut self, target: &Value, replacement: Option<&Value>, fields: Fields<'_>, path: &Path) -> Value {
        let mut merged = IndexMap::with_capacity(fields.attributes.len());

        for (name, attribute) in fields.attributes {
            let path = path.attr(name);
            let target = target_field(target, name, || attribute.implied_type());
            let replacement = replacement.and_then(|r| r.get_attr(name));

            let value = match &attribute.nested_type {
                Some(object) => self.merge_nested(
                    &target,
                    replacement,
                    Fields::of_attributes(&object.attributes),
                    object.nesting,
                    &path,
                ),
                None if attribute.computed => self.merge_computed(target, replacement, &attribute.ty, &path),
                None => target,
            };
            merged.insert(name.clone(), value);
        }

        for (name, nested) in fields.block_types.into_iter().flatten() {
            let path = path.attr(name);
            let target = target_field(target, name, || nested.implied_type());
            let replacement = replacement.and_then(|r| r.get_attr(name));
            let value = self.merge_nested(
                &target,
                replacement,
                Fields::of_block(&nested.block),
                nested.nesting,
                &path,
            );
            merged.insert(name.clone(), value);
        }

        Value::Object(merged)
    }

    fn merge_computed(&mut self, target: Value, replacement: Option<&Value>, ty: &Type, path: &Path) -> Value {
        if !self.mode.is_unset(&target) {
            trace!(%path, "keeping known computed value");
            return target;
        }

        if let Some(replacement) = replacement.filter(|r| !r.is_null()) {
            match convert(replacement, ty) {
                Ok(value) => {
                    trace!(%path, "using replacement value");
                    return value;
                }
                Err(err) => {
                    trace!(%path, error = %err, "replacement does not convert");
                    self.diags
                        .push(Diagnostic::replacement_type_mismatch(ty, path, self.range, &err));
                }
            }
        }

        match self.mode {
            Mode::PlanResource => {
                trace!(%path, "computed value unknown until apply");
                Value::Unknown(ty.clone())
            }
            Mode::DataSource | Mode::ApplyResource => {
                trace!(%path, "generating computed value");
                self.generator.generate(ty)
            }
        }
    }

    fn merge_nested(
        &mut self,
        target: &Value,
        replacement: Option<&Value>,
        fields: Fields<'_>,
        nesting: NestingMode,
        path: &Path,
    ) -> Value {
        let replacement = match replacement {
            Some(r) if r.is_null() => None,
            Some(r) if !r.is_object() => {
                self.diags
                    .push(Diagnostic::nested_shape_mismatch(path, self.range, &r.ty()));
                None
            }
            other => other,
        };

        match nesting {
            NestingMode::Single => self.merge_fields(target, replacement, fields, path),
            NestingMode::List => match target.elements() {
                Some(elements) => {
                    let merged = elements
                        .iter()
                        .enumerate()
                        .map(|(i, element)| self.merge_fields(element, replacement, fields, &path.index(i)))
                        .collect();
                    Value::list_of(fields.object_type(), merged)
                }
                None => self.absent_collection(target, Value::list_empty(fields.object_type()), path),
            },
            NestingMode::Set => match target.elements() {
                Some(elements) => {
                    let merged = elements
                        .iter()
                        .enumerate()
                        .map(|(i, element)| self.merge_fields(element, replacement, fields, &path.index(i)))
                        .collect();
                    Value::set_of(fields.object_type(), merged)
                }
                None => self.absent_collection(target, Value::set_empty(fields.object_type()), path),
            },
            NestingMode::Map => {
                // Untyped decoding yields objects where a map is declared.
                let entries: Vec<(&String, &Value)> = match target {
                    Value::Map { entries, .. } => entries.iter().collect(),
                    Value::Object(attributes) => attributes.iter().collect(),
                    _ => return self.absent_collection(target, Value::map_empty(fields.object_type()), path),
                };
                let mut merged = BTreeMap::new();
                for (key, element) in entries {
                    let value = self.merge_fields(element, replacement, fields, &path.key(key));
                    merged.insert(key.clone(), value);
                }
                Value::map_of(fields.object_type(), merged)
            }
        }
    }

    /// A null collection becomes empty. An unknown one stays unknown until
    /// apply. Anything else is not ours to reshape and is kept as is.
    fn absent_collection(&self, target: &Value, empty: Value, path: &Path) -> Value {
        match target {
            Value::Null(_) => empty,
            Value::Unknown(_) if self.mode == Mode::ApplyResource => empty,
            Value::Unknown(_) => target.clone(),
            _ => {
                trace!(%path, found = %target.ty(), "target is not a collection, keeping it");
                target.clone()
            }
        }
    }
}

fn target_field(target: &Value, name: &str, ty: impl FnOnce() -> Type) -> Value {
    match target {
        Value::Object(attributes) => attributes.get(name).cloned().unwrap_or_else(|| Value::Null(ty())),
        Value::Unknown(_) => Value::Unknown(ty()),
        _ => Value::Null(ty()),
    }
}
