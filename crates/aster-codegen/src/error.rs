//! Error types for the lowering core
//!
//! Analysis errors are accumulated in an [`ErrorSink`] rather than raised
//! as control flow, so one traversal can surface every problem in a unit.
//! Generation never runs for a unit with recorded errors.

use std::fmt;

use aster_ast::Line;
use thiserror::Error;

/// What went wrong, independent of where.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("case label must be an integer literal")]
    NonConstantCaseLabel,

    #[error("duplicate case label {0}")]
    DuplicateCaseLabel(i32),

    #[error("switch may have at most one default label")]
    DuplicateDefaultLabel,

    #[error("break outside of a loop or switch")]
    UnboundBreak,

    #[error("continue outside of a loop")]
    UnboundContinue,

    #[error("cannot resolve exception type {0}")]
    UnresolvedCatchType(String),

    #[error("undefined variable {0}")]
    UndefinedVariable(String),

    #[error("variable {0} is already defined in this scope")]
    DuplicateVariable(String),
}

/// One recorded analysis error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: Line,
    pub kind: ErrorKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

/// Accumulating error sink. Recording an error never aborts the traversal.
#[derive(Debug, Default)]
pub struct ErrorSink {
    diagnostics: Vec<Diagnostic>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, line: Line, kind: ErrorKind) {
        log::debug!("analysis error at line {}: {}", line, kind);
        self.diagnostics.push(Diagnostic { line, kind });
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
