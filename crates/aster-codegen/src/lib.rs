//! Aster statement lowering
//!
//! This crate is the statement-level semantic-analysis and code-generation
//! core of the Aster compiler: it turns the structured, block-scoped
//! statement tree from `aster-ast` into a flat instruction stream for a
//! stack-based virtual machine, plus out-of-band exception-handler ranges.
//!
//! Compilation of one unit is strictly two-phase. The analysis traversal
//! resolves types, binds break/continue to their enclosing constructs via
//! a per-unit frame stack, and accumulates diagnostics; the generation
//! traversal then consumes the decorated tree read-only and emits labeled
//! instructions. Generation never runs for a unit with recorded errors.
//!
//! # Modules
//!
//! - `analysis`: the Built -> Analyzed traversal
//! - `context`: per-unit analysis state (frame stack, scopes, error sink)
//! - `gen`: the Analyzed -> Lowered traversal (loops, switch, try/catch)
//! - `emitter`: labels, instruction stream, exception-handler ranges
//! - `error`: diagnostic taxonomy and accumulating sink
//! - `unit`: the two-phase driver
//! - `disasm`: textual disassembly for debugging

pub mod analysis;
pub mod context;
pub mod disasm;
pub mod emitter;
pub mod error;
pub mod gen;
pub mod unit;

// Re-export main types
pub use context::{AnalysisContext, ControlFrame, ExceptionRegistry, FrameKind};
pub use disasm::disassemble;
pub use emitter::{CodeUnit, Emitter, HandlerRange, Instr, Label, ResolvedHandler};
pub use error::{Diagnostic, ErrorKind, ErrorSink};
pub use gen::switch::{select_dispatch, DispatchKind};
pub use gen::Generator;
pub use unit::{AnalyzedUnit, CompilationUnit};

#[cfg(test)]
mod tests;
