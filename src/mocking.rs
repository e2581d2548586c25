//! Entry points for computing the values of mocked data sources and resources.
//!
//! Each entry point returns the synthesized value together with any
//! diagnostics. None of them fail: problems with a replacement value are
//! reported and that part of the replacement is ignored.

use tracing::debug;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::generator::{with_global_generator, ValueGenerator};
use crate::merge::{Merger, Mode};
use crate::path::{Path, SourceRange};
use crate::schema::Block;
use crate::value::Value;

/// Values supplied by a test author to override computed attributes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplacementValue {
    /// `None` means no overrides at all.
    pub value: Option<Value>,
    /// Where the replacement was defined, quoted in diagnostics.
    pub range: SourceRange,
}

impl ReplacementValue {
    pub fn new(value: Value) -> Self {
        Self {
            value: Some(value),
            range: SourceRange::default(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, range: SourceRange) -> Self {
        self.range = range;
        self
    }

    /// Absent, null and object replacements are valid.
    pub fn validate(&self) -> bool {
        match &self.value {
            None => true,
            Some(value) => value.is_null() || value.is_object(),
        }
    }
}

/// Fill the unset computed attributes of a data source read.
pub fn computed_values_for_data_source(target: &Value, with: &ReplacementValue, schema: &Block) -> (Value, Diagnostics) {
    with_global_generator(|generator| computed_values_for_data_source_with(target, with, schema, generator))
}

/// As [`computed_values_for_data_source`], drawing from `generator`.
pub fn computed_values_for_data_source_with(
    target: &Value,
    with: &ReplacementValue,
    schema: &Block,
    generator: &mut ValueGenerator,
) -> (Value, Diagnostics) {
    populate_computed_values(target, with, schema, Mode::DataSource, generator)
}

/// Plan a mocked resource: unset computed attributes take the replacement or
/// become unknown.
pub fn plan_computed_values_for_resource(target: &Value, with: &ReplacementValue, schema: &Block) -> (Value, Diagnostics) {
    with_global_generator(|generator| plan_computed_values_for_resource_with(target, with, schema, generator))
}

/// As [`plan_computed_values_for_resource`], drawing from `generator`.
pub fn plan_computed_values_for_resource_with(
    target: &Value,
    with: &ReplacementValue,
    schema: &Block,
    generator: &mut ValueGenerator,
) -> (Value, Diagnostics) {
    populate_computed_values(target, with, schema, Mode::PlanResource, generator)
}

/// Apply a mocked resource: unknown computed attributes take the replacement
/// or a generated value.
pub fn apply_computed_values_for_resource(target: &Value, with: &ReplacementValue, schema: &Block) -> (Value, Diagnostics) {
    with_global_generator(|generator| apply_computed_values_for_resource_with(target, with, schema, generator))
}

/// As [`apply_computed_values_for_resource`], drawing from `generator`.
pub fn apply_computed_values_for_resource_with(
    target: &Value,
    with: &ReplacementValue,
    schema: &Block,
    generator: &mut ValueGenerator,
) -> (Value, Diagnostics) {
    populate_computed_values(target, with, schema, Mode::ApplyResource, generator)
}

fn populate_computed_values(
    target: &Value,
    with: &ReplacementValue,
    schema: &Block,
    mode: Mode,
    generator: &mut ValueGenerator,
) -> (Value, Diagnostics) {
    debug!(?mode, has_replacement = with.value.is_some(), "populating computed values");

    let mut diags = Diagnostics::new();
    let replacement = match &with.value {
        Some(value) if !with.validate() => {
            diags.push(Diagnostic::non_object_replacement(&value.ty()));
            None
        }
        Some(value) if !value.is_null() => Some(value),
        _ => None,
    };

    let mut merger = Merger::new(mode, &with.range, generator);
    let value = merger.merge_block(target, replacement, schema, &Path::root());
    diags.extend(merger.finish());

    debug!(diagnostics = diags.len(), "computed values populated");
    (value, diags)
}
