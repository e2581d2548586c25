//! Traversal paths and source ranges used to attribute diagnostics.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step from a parent value into a child value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Attr(String),
    Index(usize),
    Key(String),
}

/// Immutable, append-only path from the root of a value.
///
/// Extending a path returns a new one, so recursive calls can each hold their
/// own copy without sharing state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    steps: Vec<PathStep>,
}

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn attr(&self, name: &str) -> Self {
        self.extended(PathStep::Attr(name.to_string()))
    }

    pub fn index(&self, index: usize) -> Self {
        self.extended(PathStep::Index(index))
    }

    pub fn key(&self, key: &str) -> Self {
        self.extended(PathStep::Key(key.to_string()))
    }

    fn extended(&self, step: PathStep) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(step);
        Self { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Attribute names only, joined with `.`.
    ///
    /// Replacement values are applied to every element of a collection, so
    /// their location is described without indexes or keys.
    pub fn replacement_display(&self) -> String {
        self.steps
            .iter()
            .filter_map(|step| match step {
                PathStep::Attr(name) => Some(name.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                PathStep::Attr(name) if i == 0 => write!(f, "{}", name)?,
                PathStep::Attr(name) => write!(f, ".{}", name)?,
                PathStep::Index(index) => write!(f, "[{}]", index)?,
                PathStep::Key(key) => write!(f, "[{:?}]", key)?,
            }
        }
        Ok(())
    }
}

/// A position within a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
    pub byte: usize,
}

impl Pos {
    pub fn new(line: usize, column: usize, byte: usize) -> Self {
        Self { line, column, byte }
    }
}

/// The span of configuration a replacement value was read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    pub filename: String,
    pub start: Pos,
    pub end: Pos,
}

impl SourceRange {
    pub fn new(filename: &str, start: Pos, end: Pos) -> Self {
        Self {
            filename: filename.to_string(),
            start,
            end,
        }
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{},{}-{}",
                self.filename, self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(
                f,
                "{}:{},{}-{},{}",
                self.filename, self.start.line, self.start.column, self.end.line, self.end.column
            )
        }
    }
}
