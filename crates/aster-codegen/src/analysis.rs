//! Analysis traversal (Built -> Analyzed)
//!
//! One pass over the statement tree: resolves expression types, validates
//! loop/switch/try invariants, binds break and continue to their enclosing
//! constructs through the context's frame stack, and allocates local slots
//! for declarations, catch parameters and the finally temporary. Each node
//! is decorated exactly once; errors accumulate in the context's sink and
//! never abort the traversal.

use aster_ast::{BinaryOp, CaseLabel, CatchClause, Expr, Line, Stmt, SwitchGroup, Type};
use std::collections::HashSet;

use crate::context::{AnalysisContext, ExceptionRegistry, FrameKind};
use crate::error::ErrorKind;

pub struct Analyzer<'r> {
    ctx: AnalysisContext,
    registry: &'r ExceptionRegistry,
}

impl<'r> Analyzer<'r> {
    pub fn new(registry: &'r ExceptionRegistry) -> Self {
        Self {
            ctx: AnalysisContext::new(),
            registry,
        }
    }

    pub fn into_context(self) -> AnalysisContext {
        self.ctx
    }

    pub fn analyze_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Block { body, .. } => {
                self.ctx.push_scope();
                self.analyze_block(body);
                self.ctx.pop_scope();
            }

            Stmt::VarDecl {
                line,
                name,
                ty,
                init,
                slot,
            } => {
                let found = self.type_of(init);
                self.check(*line, &found, ty);
                *slot = self.ctx.declare(*line, name, ty.clone());
            }

            Stmt::Assign {
                line,
                name,
                value,
                slot,
            } => {
                let found = self.type_of(value);
                match self.ctx.lookup(name) {
                    Some((resolved, ty)) => {
                        self.check(*line, &found, &ty);
                        *slot = Some(resolved);
                    }
                    None => {
                        self.ctx
                            .errors
                            .report(*line, ErrorKind::UndefinedVariable(name.clone()));
                    }
                }
            }

            Stmt::DoWhile {
                line,
                body,
                condition,
                marks,
            } => {
                let id = self.ctx.push_frame(FrameKind::Loop);
                marks.frame = Some(id);

                let found = self.type_of(condition);
                self.check(*line, &found, &Type::Boolean);
                self.analyze_stmt(body);

                let frame = self.ctx.pop_frame();
                marks.has_break = frame.break_used();
                marks.has_continue = frame.continue_used();
            }

            Stmt::While {
                line,
                condition,
                body,
                marks,
            } => {
                let id = self.ctx.push_frame(FrameKind::Loop);
                marks.frame = Some(id);

                let found = self.type_of(condition);
                self.check(*line, &found, &Type::Boolean);
                self.analyze_stmt(body);

                let frame = self.ctx.pop_frame();
                marks.has_break = frame.break_used();
                marks.has_continue = frame.continue_used();
            }

            Stmt::For {
                line,
                init,
                condition,
                update,
                body,
                marks,
            } => {
                let id = self.ctx.push_frame(FrameKind::Loop);
                marks.frame = Some(id);

                // Fresh scope encloses init/condition/update/body so
                // loop-scoped variables do not leak.
                self.ctx.push_scope();
                self.analyze_block(init);
                if let Some(condition) = condition {
                    let found = self.type_of(condition);
                    self.check(*line, &found, &Type::Boolean);
                }
                self.analyze_block(update);
                self.analyze_stmt(body);
                self.ctx.pop_scope();

                let frame = self.ctx.pop_frame();
                marks.has_break = frame.break_used();
                marks.has_continue = frame.continue_used();
            }

            Stmt::Switch {
                line,
                condition,
                groups,
                marks,
            } => {
                let id = self.ctx.push_frame(FrameKind::Switch);
                marks.frame = Some(id);

                let found = self.type_of(condition);
                self.check(*line, &found, &Type::Int);
                self.analyze_groups(groups);

                let frame = self.ctx.pop_frame();
                marks.has_break = frame.break_used();
            }

            Stmt::Break { line, target } => match self.ctx.innermost_breakable() {
                Some(frame) => {
                    frame.mark_break_used();
                    *target = Some(frame.id);
                }
                None => self.ctx.errors.report(*line, ErrorKind::UnboundBreak),
            },

            Stmt::Continue { line, target } => match self.ctx.innermost_loop() {
                Some(frame) => {
                    frame.mark_continue_used();
                    *target = Some(frame.id);
                }
                None => self.ctx.errors.report(*line, ErrorKind::UnboundContinue),
            },

            Stmt::Try {
                try_block,
                catches,
                finally,
                finally_slot,
                ..
            } => {
                self.ctx.push_scope();
                self.analyze_block(try_block);
                self.ctx.pop_scope();

                for clause in catches.iter_mut() {
                    self.analyze_catch(clause);
                }

                if let Some(finally) = finally {
                    self.ctx.push_scope();
                    self.analyze_block(finally);
                    self.ctx.pop_scope();
                    // Temporary holding the in-flight exception while the
                    // synthetic finally path runs.
                    *finally_slot = Some(self.ctx.alloc_slot());
                }
            }

            Stmt::Throw { line, class, .. } => {
                if self.registry.resolve(class).is_none() {
                    self.ctx
                        .errors
                        .report(*line, ErrorKind::UnresolvedCatchType(class.clone()));
                }
            }
        }
    }

    fn analyze_block(&mut self, stmts: &mut [Stmt]) {
        for stmt in stmts {
            self.analyze_stmt(stmt);
        }
    }

    fn analyze_groups(&mut self, groups: &mut [SwitchGroup]) {
        let mut seen = HashSet::new();
        let mut seen_default = false;

        for group in groups {
            // Each group gets a fresh scope derived from the switch's
            // enclosing scope.
            self.ctx.push_scope();

            for label in &mut group.labels {
                match label {
                    CaseLabel::Case { expr, value } => match expr {
                        Expr::IntLit { line, value: v } => {
                            let v = *v;
                            *value = Some(v);
                            if !seen.insert(v) {
                                self.ctx
                                    .errors
                                    .report(*line, ErrorKind::DuplicateCaseLabel(v));
                            }
                        }
                        _ => {
                            self.ctx
                                .errors
                                .report(expr.line(), ErrorKind::NonConstantCaseLabel);
                        }
                    },
                    CaseLabel::Default { line } => {
                        if seen_default {
                            self.ctx
                                .errors
                                .report(*line, ErrorKind::DuplicateDefaultLabel);
                        }
                        seen_default = true;
                    }
                }
            }

            self.analyze_block(&mut group.block);
            self.ctx.pop_scope();
        }
    }

    fn analyze_catch(&mut self, clause: &mut CatchClause) {
        self.ctx.push_scope();

        let ty = match self.registry.resolve(&clause.param_type) {
            Some(ty) => ty,
            None => {
                self.ctx.errors.report(
                    clause.line,
                    ErrorKind::UnresolvedCatchType(clause.param_type.clone()),
                );
                Type::Any
            }
        };
        clause.slot = self.ctx.declare(clause.line, &clause.param_name, ty);

        self.analyze_block(&mut clause.body);
        self.ctx.pop_scope();
    }

    // ===== Expressions =====

    fn type_of(&mut self, expr: &mut Expr) -> Type {
        match expr {
            Expr::IntLit { .. } => Type::Int,
            Expr::BoolLit { .. } => Type::Boolean,
            Expr::Var { line, name, slot } => match self.ctx.lookup(name) {
                Some((resolved, ty)) => {
                    *slot = Some(resolved);
                    ty
                }
                None => {
                    self.ctx
                        .errors
                        .report(*line, ErrorKind::UndefinedVariable(name.clone()));
                    Type::Any
                }
            },
            Expr::Binary { line, op, lhs, rhs } => {
                let lt = self.type_of(lhs);
                let rt = self.type_of(rhs);
                if op.is_arithmetic() {
                    self.check(*line, &lt, &Type::Int);
                    self.check(*line, &rt, &Type::Int);
                    Type::Int
                } else if matches!(op, BinaryOp::Eq | BinaryOp::Ne) {
                    if !lt.matches(&rt) {
                        self.ctx.errors.report(
                            *line,
                            ErrorKind::TypeMismatch {
                                expected: lt.to_string(),
                                found: rt.to_string(),
                            },
                        );
                    }
                    Type::Boolean
                } else {
                    self.check(*line, &lt, &Type::Int);
                    self.check(*line, &rt, &Type::Int);
                    Type::Boolean
                }
            }
        }
    }

    fn check(&mut self, line: Line, found: &Type, expected: &Type) {
        if !found.matches(expected) {
            self.ctx.errors.report(
                line,
                ErrorKind::TypeMismatch {
                    expected: expected.to_string(),
                    found: found.to_string(),
                },
            );
        }
    }
}
