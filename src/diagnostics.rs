//! Diagnostics raised while synthesizing values.
//!
//! Diagnostics are informational output: they never change the synthesized
//! value, and rendering them is left to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::convert::ConversionError;
use crate::path::{Path, SourceRange};
use crate::value::Type;

const INVALID_REPLACEMENT_SUMMARY: &str = "Invalid mock/override field";

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("Error"),
        }
    }
}

/// A single problem found in a replacement value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// Position in the synthesized value the problem was found at.
    pub path: Path,
}

/// Borrowed summary and detail of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Description<'a> {
    pub summary: &'a str,
    pub detail: &'a str,
}

impl Diagnostic {
    pub fn error(summary: &str, detail: String, path: Path) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.to_string(),
            detail,
            path,
        }
    }

    pub fn description(&self) -> Description<'_> {
        Description {
            summary: &self.summary,
            detail: &self.detail,
        }
    }

    /// The top-level replacement is neither absent, null nor an object.
    pub fn non_object_replacement(found: &Type) -> Self {
        Self::error(
            INVALID_REPLACEMENT_SUMMARY,
            format!(
                "The requested replacement value must be an object type, but was {}.",
                found.friendly_name()
            ),
            Path::root(),
        )
    }

    /// A nested replacement is not object-shaped where a nested object was expected.
    pub fn nested_shape_mismatch(path: &Path, range: &SourceRange, found: &Type) -> Self {
        Self::error(
            INVALID_REPLACEMENT_SUMMARY,
            format!(
                "Terraform expected an object type at {} within the replacement value defined at {}, but found {}.",
                path.replacement_display(),
                range,
                found.friendly_name()
            ),
            path.clone(),
        )
    }

    /// A replacement leaf could not be converted to the attribute's declared type.
    pub fn replacement_type_mismatch(want: &Type, path: &Path, range: &SourceRange, err: &ConversionError) -> Self {
        Self::error(
            INVALID_REPLACEMENT_SUMMARY,
            format!(
                "Terraform could not replace the target type {} with the replacement value defined at {} within {}: {}.",
                want.friendly_name(),
                path.replacement_display(),
                range,
                err
            ),
            path.clone(),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}; {}", self.severity, self.summary, self.detail)
    }
}

/// Ordered collection of diagnostics.
///
/// Exact repeats are dropped: a replacement shared by every element of a
/// collection fails the same way for each element but is reported once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        let repeated = self.items.iter().any(|existing| {
            existing.severity == diagnostic.severity
                && existing.summary == diagnostic.summary
                && existing.detail == diagnostic.detail
        });
        if !repeated {
            self.items.push(diagnostic);
        }
    }

    pub fn extend(&mut self, other: Diagnostics) {
        for diagnostic in other {
            self.push(diagnostic);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Detail strings in order, mostly useful for assertions.
    pub fn details(&self) -> Vec<&str> {
        self.items.iter().map(|d| d.detail.as_str()).collect()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::convert;
    use crate::value::Value;

    #[test]
    fn test_non_object_replacement_detail() {
        let diag = Diagnostic::non_object_replacement(&Type::String);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.description().summary, "Invalid mock/override field");
        assert_eq!(
            diag.description().detail,
            "The requested replacement value must be an object type, but was string."
        );
        assert!(diag.path.is_root());
    }

    #[test]
    fn test_nested_shape_detail() {
        let path = Path::root().attr("nested_object");
        let diag = Diagnostic::nested_shape_mismatch(&path, &SourceRange::default(), &Type::String);
        assert_eq!(
            diag.detail,
            "Terraform expected an object type at nested_object within the replacement value defined at :0,0-0, but found string."
        );
    }

    #[test]
    fn test_type_mismatch_detail_uses_replacement_path() {
        let path = Path::root().attr("block").index(0).attr("id");
        let err = convert(&Value::empty_object(), &Type::String).unwrap_err();
        let diag = Diagnostic::replacement_type_mismatch(&Type::String, &path, &SourceRange::default(), &err);
        assert_eq!(
            diag.detail,
            "Terraform could not replace the target type string with the replacement value defined at block.id within :0,0-0: string required."
        );
        assert_eq!(diag.path.to_string(), "block[0].id");
    }

    #[test]
    fn test_push_drops_exact_repeats() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::non_object_replacement(&Type::String));
        diags.push(Diagnostic::non_object_replacement(&Type::String));
        diags.push(Diagnostic::non_object_replacement(&Type::Number));
        assert_eq!(diags.len(), 2);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_extend_keeps_order() {
        let mut first = Diagnostics::new();
        first.push(Diagnostic::non_object_replacement(&Type::String));
        let mut second = Diagnostics::new();
        second.push(Diagnostic::non_object_replacement(&Type::Bool));
        first.extend(second);
        assert_eq!(
            first.details(),
            vec![
                "The requested replacement value must be an object type, but was string.",
                "The requested replacement value must be an object type, but was bool.",
            ]
        );
    }

    #[test]
    fn test_empty() {
        let diags = Diagnostics::new();
        assert!(diags.is_empty());
        assert!(!diags.has_errors());
    }
}
