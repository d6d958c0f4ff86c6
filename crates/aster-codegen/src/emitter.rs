//! Label allocation and instruction emission
//!
//! The emitter records a symbolic instruction stream for a stack-based
//! target: operands live on an operand stack, locals in fixed slots. Jump
//! targets are opaque [`Label`]s placed at instruction positions and
//! resolved to offsets when the stream is finished. Exception-handler
//! ranges are collected out of band, in registration order; the runtime is
//! expected to scan them first-match-wins.

use std::collections::HashMap;

/// Opaque jump-target identifier. Only meaningful inside the emitter that
/// created it, and only for one generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(u32);

/// One instruction of the target stack machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    PushInt(i32),
    PushBool(bool),
    LoadLocal(u16),
    StoreLocal(u16),
    Add,
    Sub,
    Mul,
    CmpLt,
    CmpLe,
    CmpGt,
    CmpGe,
    CmpEq,
    CmpNe,
    Goto(Label),
    /// Pops a boolean; jumps when it equals `on_true`.
    Branch { target: Label, on_true: bool },
    /// Direct-index dispatch: pops an int `v`; jumps to `targets[v - lo]`
    /// when `v` is in range, to `default` otherwise.
    TableSwitch {
        default: Label,
        lo: i32,
        targets: Vec<Label>,
    },
    /// Binary-searchable dispatch over a sorted value/target table; pops an
    /// int and jumps to the matching target, or to `default`.
    LookupSwitch {
        default: Label,
        pairs: Vec<(i32, Label)>,
    },
    NewException { class: String, message: String },
    /// Pops an exception value and raises it.
    Throw,
}

/// An exception-handler range: control transfers to `handler` when an
/// exception of the matching class (or any class, for `None`) escapes
/// `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerRange {
    pub start: Label,
    pub end: Label,
    pub handler: Label,
    pub catch_type: Option<String>,
}

/// [`HandlerRange`] with labels resolved to instruction offsets.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedHandler {
    pub start: usize,
    pub end: usize,
    pub handler: usize,
    pub catch_type: Option<String>,
}

/// Collects instructions, label placements and handler ranges for one
/// generation pass.
#[derive(Debug, Default)]
pub struct Emitter {
    code: Vec<Instr>,
    handlers: Vec<HandlerRange>,
    offsets: HashMap<Label, usize>,
    next_label: u32,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh, unplaced label.
    pub fn create_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    /// Place a label at the current position. A label may be placed once.
    pub fn place_label(&mut self, label: Label) {
        let prev = self.offsets.insert(label, self.code.len());
        debug_assert!(prev.is_none(), "label {:?} placed twice", label);
    }

    /// Append an instruction and return its position.
    pub fn emit(&mut self, instr: Instr) -> usize {
        self.code.push(instr);
        self.code.len() - 1
    }

    pub fn add_goto(&mut self, target: Label) {
        self.emit(Instr::Goto(target));
    }

    pub fn add_branch(&mut self, target: Label, on_true: bool) {
        self.emit(Instr::Branch { target, on_true });
    }

    pub fn add_exception_handler(
        &mut self,
        start: Label,
        end: Label,
        handler: Label,
        catch_type: Option<String>,
    ) {
        self.handlers.push(HandlerRange {
            start,
            end,
            handler,
            catch_type,
        });
    }

    pub fn position(&self) -> usize {
        self.code.len()
    }

    /// Resolve labels and close the stream.
    pub fn finish(self, local_count: u16) -> CodeUnit {
        #[cfg(debug_assertions)]
        for instr in &self.code {
            let referenced: Vec<Label> = match instr {
                Instr::Goto(l) | Instr::Branch { target: l, .. } => vec![*l],
                Instr::TableSwitch { default, targets, .. } => {
                    let mut ls = vec![*default];
                    ls.extend_from_slice(targets);
                    ls
                }
                Instr::LookupSwitch { default, pairs } => {
                    let mut ls = vec![*default];
                    ls.extend(pairs.iter().map(|(_, l)| *l));
                    ls
                }
                _ => vec![],
            };
            for l in referenced {
                debug_assert!(self.offsets.contains_key(&l), "unplaced label {:?}", l);
            }
        }

        CodeUnit {
            code: self.code,
            handlers: self.handlers,
            offsets: self.offsets,
            local_count,
        }
    }
}

/// Finished output of one generation pass: instruction stream, resolved
/// labels and exception-handler metadata.
#[derive(Debug)]
pub struct CodeUnit {
    pub code: Vec<Instr>,
    pub handlers: Vec<HandlerRange>,
    pub local_count: u16,
    offsets: HashMap<Label, usize>,
}

impl CodeUnit {
    pub fn offset_of(&self, label: Label) -> Option<usize> {
        self.offsets.get(&label).copied()
    }

    /// Handler ranges with labels resolved to offsets, in registration
    /// order.
    pub fn resolved_handlers(&self) -> Vec<ResolvedHandler> {
        self.handlers
            .iter()
            .filter_map(|h| {
                Some(ResolvedHandler {
                    start: self.offset_of(h.start)?,
                    end: self.offset_of(h.end)?,
                    handler: self.offset_of(h.handler)?,
                    catch_type: h.catch_type.clone(),
                })
            })
            .collect()
    }
}
