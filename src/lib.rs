//! Computed value synthesis for mocked providers in infrastructure test runs.
//!
//! Given a block schema, the attribute values already known for a data source
//! or resource, and optional replacement values from the test author, fills
//! in every computed attribute that is still unset. Replacements win where
//! they convert to the attribute type; everything else is generated from a
//! seedable random source.

pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod generator;
pub mod json;
pub mod merge;
pub mod mocking;
pub mod path;
pub mod schema;
pub mod value;

pub use config::GeneratorConfig;
pub use convert::{convert, ConversionError};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use generator::{reset_global_generator, set_global_generator, ValueGenerator};
pub use json::JsonError;
pub use merge::{Merger, Mode};
pub use mocking::{
    apply_computed_values_for_resource, apply_computed_values_for_resource_with, computed_values_for_data_source,
    computed_values_for_data_source_with, plan_computed_values_for_resource, plan_computed_values_for_resource_with,
    ReplacementValue,
};
pub use path::{Path, PathStep, Pos, SourceRange};
pub use schema::{Attribute, Block, NestedBlock, NestingMode, Object};
pub use value::{Type, Value};
