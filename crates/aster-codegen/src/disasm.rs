//! Instruction-stream debugging utilities

use std::fmt::Write;

use crate::emitter::{CodeUnit, Instr, Label};

fn fmt_label(unit: &CodeUnit, label: Label) -> String {
    match unit.offset_of(label) {
        Some(offset) => format!("{:04}", offset),
        None => "????".to_string(),
    }
}

/// Render a finished unit as text: one instruction per line with jump
/// targets resolved to offsets, followed by the exception table.
pub fn disassemble(unit: &CodeUnit) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "locals: {}", unit.local_count);

    for (pos, instr) in unit.code.iter().enumerate() {
        let _ = write!(out, "{:04}  ", pos);
        let _ = match instr {
            Instr::PushInt(v) => writeln!(out, "PUSHINT     {}", v),
            Instr::PushBool(v) => writeln!(out, "PUSHBOOL    {}", v),
            Instr::LoadLocal(slot) => writeln!(out, "LOADLOCAL   L{}", slot),
            Instr::StoreLocal(slot) => writeln!(out, "STORELOCAL  L{}", slot),
            Instr::Add => writeln!(out, "ADD"),
            Instr::Sub => writeln!(out, "SUB"),
            Instr::Mul => writeln!(out, "MUL"),
            Instr::CmpLt => writeln!(out, "CMPLT"),
            Instr::CmpLe => writeln!(out, "CMPLE"),
            Instr::CmpGt => writeln!(out, "CMPGT"),
            Instr::CmpGe => writeln!(out, "CMPGE"),
            Instr::CmpEq => writeln!(out, "CMPEQ"),
            Instr::CmpNe => writeln!(out, "CMPNE"),
            Instr::Goto(target) => writeln!(out, "GOTO        {}", fmt_label(unit, *target)),
            Instr::Branch { target, on_true } => writeln!(
                out,
                "BRANCH      {} if {}",
                fmt_label(unit, *target),
                on_true
            ),
            Instr::TableSwitch { default, lo, targets } => {
                let entries: Vec<String> = targets
                    .iter()
                    .enumerate()
                    .map(|(i, l)| format!("{}->{}", *lo as i64 + i as i64, fmt_label(unit, *l)))
                    .collect();
                writeln!(
                    out,
                    "TABLESWITCH default={} [{}]",
                    fmt_label(unit, *default),
                    entries.join(" ")
                )
            }
            Instr::LookupSwitch { default, pairs } => {
                let entries: Vec<String> = pairs
                    .iter()
                    .map(|(v, l)| format!("{}->{}", v, fmt_label(unit, *l)))
                    .collect();
                writeln!(
                    out,
                    "LOOKUPSWITCH default={} [{}]",
                    fmt_label(unit, *default),
                    entries.join(" ")
                )
            }
            Instr::NewException { class, message } => {
                writeln!(out, "NEWEXC      {} \"{}\"", class, message)
            }
            Instr::Throw => writeln!(out, "THROW"),
        };
    }

    if !unit.handlers.is_empty() {
        let _ = writeln!(out, "exception table:");
        for handler in unit.resolved_handlers() {
            let _ = writeln!(
                out,
                "  [{:04}, {:04}) -> {:04}  {}",
                handler.start,
                handler.end,
                handler.handler,
                handler.catch_type.as_deref().unwrap_or("<any>")
            );
        }
    }

    out
}
