//! Try/catch/finally lowering
//!
//! Finally replication: the target model has only forward jumps and
//! exception-range handlers, so the finally body is inlined once per exit
//! path: after the try body, after each catch body, and once more inside
//! a synthetic catch-all handler that stores the in-flight exception,
//! runs the copy, reloads and re-raises. Protected ranges end before the
//! inline copies so a copy that itself raises is not re-entered through
//! its own range.

use aster_ast::{CatchClause, Stmt};

use super::Generator;
use crate::emitter::{Instr, Label};

impl Generator {
    pub(crate) fn gen_try(
        &mut self,
        try_block: &[Stmt],
        catches: &[CatchClause],
        finally: Option<&[Stmt]>,
        finally_slot: Option<u16>,
    ) {
        let start_try = self.em.create_label();
        let end_try = self.em.create_label();
        let exit = self.em.create_label();

        self.em.place_label(start_try);
        self.gen_block(try_block);
        self.em.place_label(end_try);
        if let Some(finally) = finally {
            self.gen_block(finally);
        }
        self.em.add_goto(exit);

        let mut catch_ranges: Vec<(Label, Label)> = Vec::with_capacity(catches.len());
        for clause in catches {
            let start_catch = self.em.create_label();
            let end_catch = self.em.create_label();

            self.em.place_label(start_catch);
            // The runtime delivers the exception on the operand stack.
            self.em.emit(Instr::StoreLocal(
                clause.slot.expect("catch slot assigned during analysis"),
            ));
            self.gen_block(&clause.body);
            self.em.place_label(end_catch);

            self.em.add_exception_handler(
                start_try,
                end_try,
                start_catch,
                Some(clause.param_type.clone()),
            );

            if let Some(finally) = finally {
                self.gen_block(finally);
            }
            self.em.add_goto(exit);

            catch_ranges.push((start_catch, end_catch));
        }

        if let Some(finally) = finally {
            let start_finally = self.em.create_label();
            let start_finally_plus_one = self.em.create_label();
            let slot = finally_slot.expect("finally slot assigned during analysis");

            self.em.place_label(start_finally);
            self.em.emit(Instr::StoreLocal(slot));
            self.em.place_label(start_finally_plus_one);
            self.gen_block(finally);
            self.em.emit(Instr::LoadLocal(slot));
            self.em.emit(Instr::Throw);

            // Catch-all over the try body, registered after the typed
            // handlers so declaration order still wins first-match.
            self.em
                .add_exception_handler(start_try, end_try, start_finally, None);
            for (start_catch, end_catch) in catch_ranges {
                self.em
                    .add_exception_handler(start_catch, end_catch, start_finally, None);
            }
            self.em.add_exception_handler(
                start_finally,
                start_finally_plus_one,
                start_finally,
                None,
            );
        }

        self.em.place_label(exit);
    }
}
