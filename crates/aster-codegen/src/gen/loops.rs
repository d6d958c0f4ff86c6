//! Loop lowering
//!
//! Labeled control-flow skeletons for do-while, while and for. Break and
//! continue labels are placed only when the analysis marks say they are
//! used; continue in a for-loop lands before the update statements so the
//! update always runs before the condition is re-tested.

use aster_ast::{Expr, LoopMarks, Stmt};

use super::{GenFrame, Generator};

impl Generator {
    /// Body first, then the test; the body always executes at least once.
    pub(crate) fn gen_do_while(&mut self, body: &Stmt, condition: &Expr, marks: &LoopMarks) {
        let start = self.em.create_label();
        let break_label = self.em.create_label();
        let continue_label = self.em.create_label();
        let id = marks.frame.expect("loop frame bound during analysis");

        self.frames.push(GenFrame {
            id,
            break_label,
            continue_label: Some(continue_label),
        });

        self.em.place_label(start);
        self.gen_stmt(body);
        if marks.has_continue {
            // Continue jumps here, past the remainder of the body, and
            // falls into the test.
            self.em.place_label(continue_label);
        }
        self.gen_branch(condition, start, true);
        if marks.has_break {
            self.em.place_label(break_label);
        }

        self.frames.pop();
    }

    pub(crate) fn gen_while(&mut self, condition: &Expr, body: &Stmt, marks: &LoopMarks) {
        let start = self.em.create_label();
        let exit = self.em.create_label();
        let break_label = self.em.create_label();
        let continue_label = self.em.create_label();
        let id = marks.frame.expect("loop frame bound during analysis");

        self.frames.push(GenFrame {
            id,
            break_label,
            continue_label: Some(continue_label),
        });

        self.em.place_label(start);
        self.gen_branch(condition, exit, false);
        self.gen_stmt(body);
        if marks.has_continue {
            self.em.place_label(continue_label);
        }
        self.em.add_goto(start);
        self.em.place_label(exit);
        if marks.has_break {
            self.em.place_label(break_label);
        }

        self.frames.pop();
    }

    pub(crate) fn gen_for(
        &mut self,
        init: &[Stmt],
        condition: Option<&Expr>,
        update: &[Stmt],
        body: &Stmt,
        marks: &LoopMarks,
    ) {
        let start = self.em.create_label();
        let exit = self.em.create_label();
        let break_label = self.em.create_label();
        let continue_label = self.em.create_label();
        let id = marks.frame.expect("loop frame bound during analysis");

        // Init runs once, outside the loop skeleton.
        self.gen_block(init);

        self.frames.push(GenFrame {
            id,
            break_label,
            continue_label: Some(continue_label),
        });

        self.em.place_label(start);
        if let Some(condition) = condition {
            // No condition means an infinite loop; the exit label is then
            // unreachable via this path.
            self.gen_branch(condition, exit, false);
        }
        self.gen_stmt(body);
        if marks.has_continue {
            self.em.place_label(continue_label);
        }
        self.gen_block(update);
        self.em.add_goto(start);
        self.em.place_label(exit);
        if marks.has_break {
            self.em.place_label(break_label);
        }

        self.frames.pop();
    }
}
