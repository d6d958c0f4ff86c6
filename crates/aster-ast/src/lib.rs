//! Statement and expression tree for the Aster compiler
//!
//! This crate owns the tree that the code generator consumes. Nodes are
//! built once (by a parser, out of scope here), decorated exactly once by
//! the analysis pass in `aster-codegen`, and then read back during code
//! generation.
//!
//! # Modules
//!
//! - `ast`: statement and expression node definitions
//! - `types`: source-level types for conditions and catch parameters
//! - `json`: deterministic structural dump of a tree

pub mod ast;
mod json;
pub mod types;

pub use ast::{
    BinaryOp, CaseLabel, CatchClause, Expr, FrameId, Line, LoopMarks, Stmt, SwitchGroup,
    SwitchMarks,
};
pub use types::Type;
