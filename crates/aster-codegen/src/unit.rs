//! Two-phase compilation driver
//!
//! One compilation unit moves through Built -> Analyzed -> Lowered. The
//! transitions are encoded in types: [`CompilationUnit::analyze`] consumes
//! the unit and only yields an [`AnalyzedUnit`] when zero errors were
//! recorded, and [`AnalyzedUnit::generate`] consumes the analyzed unit, so
//! neither phase can run twice and generation can never observe a unit
//! with errors.

use aster_ast::Stmt;
use log::debug;

use crate::analysis::Analyzer;
use crate::context::ExceptionRegistry;
use crate::emitter::CodeUnit;
use crate::error::Diagnostic;
use crate::gen::Generator;

/// A freshly built statement tree, not yet analyzed.
pub struct CompilationUnit {
    stmts: Vec<Stmt>,
}

impl CompilationUnit {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    /// Run the analysis traversal. Returns the decorated unit, or every
    /// diagnostic recorded during the pass.
    pub fn analyze(
        mut self,
        registry: &ExceptionRegistry,
    ) -> Result<AnalyzedUnit, Vec<Diagnostic>> {
        let mut analyzer = Analyzer::new(registry);
        for stmt in &mut self.stmts {
            analyzer.analyze_stmt(stmt);
        }

        let ctx = analyzer.into_context();
        debug!(
            "analysis finished: {} diagnostics, {} locals",
            ctx.errors.len(),
            ctx.local_count()
        );
        if ctx.errors.has_errors() {
            return Err(ctx.errors.into_diagnostics());
        }
        Ok(AnalyzedUnit {
            stmts: self.stmts,
            local_count: ctx.local_count(),
        })
    }
}

/// An analyzed, error-free unit, ready for one generation pass.
pub struct AnalyzedUnit {
    stmts: Vec<Stmt>,
    local_count: u16,
}

impl AnalyzedUnit {
    pub fn statements(&self) -> &[Stmt] {
        &self.stmts
    }

    pub fn local_count(&self) -> u16 {
        self.local_count
    }

    /// Run the generation traversal and resolve labels.
    pub fn generate(self) -> CodeUnit {
        let mut generator = Generator::new();
        for stmt in &self.stmts {
            generator.gen_stmt(stmt);
        }
        let unit = generator.finish(self.local_count);
        debug!(
            "generation finished: {} instructions, {} handler ranges",
            unit.code.len(),
            unit.handlers.len()
        );
        unit
    }
}
