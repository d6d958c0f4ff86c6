//! Code generation traversal (Analyzed -> Lowered)
//!
//! Consumes the decorated tree read-only and emits the flat instruction
//! stream through the [`Emitter`]. Break/continue labels are created here,
//! never during analysis: each loop or switch pushes a [`GenFrame`] mapping
//! its analysis-time frame id to freshly created labels for the duration of
//! its body, and jump statements look their target frame up by id.

mod loops;
pub mod switch;
mod try_catch;

use aster_ast::{BinaryOp, Expr, FrameId, Stmt};

use crate::emitter::{CodeUnit, Emitter, Instr, Label};

pub(crate) struct GenFrame {
    pub(crate) id: FrameId,
    pub(crate) break_label: Label,
    /// `None` for switch frames; a switch is not a continue target.
    pub(crate) continue_label: Option<Label>,
}

pub struct Generator {
    pub(crate) em: Emitter,
    pub(crate) frames: Vec<GenFrame>,
}

impl Generator {
    pub fn new() -> Self {
        Self {
            em: Emitter::new(),
            frames: Vec::new(),
        }
    }

    pub fn finish(self, local_count: u16) -> CodeUnit {
        self.em.finish(local_count)
    }

    pub fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block { body, .. } => self.gen_block(body),

            Stmt::VarDecl { init, slot, .. } => {
                self.gen_expr(init);
                self.em
                    .emit(Instr::StoreLocal(slot.expect("slot assigned during analysis")));
            }

            Stmt::Assign { value, slot, .. } => {
                self.gen_expr(value);
                self.em
                    .emit(Instr::StoreLocal(slot.expect("slot assigned during analysis")));
            }

            Stmt::DoWhile {
                body,
                condition,
                marks,
                ..
            } => self.gen_do_while(body, condition, marks),

            Stmt::While {
                condition,
                body,
                marks,
                ..
            } => self.gen_while(condition, body, marks),

            Stmt::For {
                init,
                condition,
                update,
                body,
                marks,
                ..
            } => self.gen_for(init, condition.as_ref(), update, body, marks),

            Stmt::Switch {
                condition,
                groups,
                marks,
                ..
            } => self.gen_switch(condition, groups, marks),

            Stmt::Break { target, .. } => {
                let frame = self.frame(target.expect("break bound during analysis"));
                self.em.add_goto(frame.break_label);
            }

            Stmt::Continue { target, .. } => {
                let frame = self.frame(target.expect("continue bound during analysis"));
                match frame.continue_label {
                    Some(label) => self.em.add_goto(label),
                    None => unreachable!("continue resolved to a non-loop frame"),
                }
            }

            Stmt::Try {
                try_block,
                catches,
                finally,
                finally_slot,
                ..
            } => self.gen_try(try_block, catches, finally.as_deref(), *finally_slot),

            Stmt::Throw { class, message, .. } => {
                self.em.emit(Instr::NewException {
                    class: class.clone(),
                    message: message.clone(),
                });
                self.em.emit(Instr::Throw);
            }
        }
    }

    pub(crate) fn gen_block(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.gen_stmt(stmt);
        }
    }

    /// Evaluate an expression onto the operand stack.
    pub(crate) fn gen_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::IntLit { value, .. } => {
                self.em.emit(Instr::PushInt(*value));
            }
            Expr::BoolLit { value, .. } => {
                self.em.emit(Instr::PushBool(*value));
            }
            Expr::Var { slot, .. } => {
                self.em
                    .emit(Instr::LoadLocal(slot.expect("slot resolved during analysis")));
            }
            Expr::Binary { op, lhs, rhs, .. } => {
                self.gen_expr(lhs);
                self.gen_expr(rhs);
                self.em.emit(match op {
                    BinaryOp::Add => Instr::Add,
                    BinaryOp::Sub => Instr::Sub,
                    BinaryOp::Mul => Instr::Mul,
                    BinaryOp::Lt => Instr::CmpLt,
                    BinaryOp::Le => Instr::CmpLe,
                    BinaryOp::Gt => Instr::CmpGt,
                    BinaryOp::Ge => Instr::CmpGe,
                    BinaryOp::Eq => Instr::CmpEq,
                    BinaryOp::Ne => Instr::CmpNe,
                });
            }
        }
    }

    /// Evaluate a condition and branch to `target` when it evaluates to
    /// `on_true`.
    pub(crate) fn gen_branch(&mut self, condition: &Expr, target: Label, on_true: bool) {
        self.gen_expr(condition);
        self.em.add_branch(target, on_true);
    }

    fn frame(&self, id: FrameId) -> &GenFrame {
        self.frames
            .iter()
            .rev()
            .find(|frame| frame.id == id)
            .expect("target frame live during generation")
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}
