//! Per-unit analysis context
//!
//! The enclosing-construct stack, the lexical scope chain and the error
//! sink are owned by one [`AnalysisContext`], created fresh per compilation
//! unit. Nothing here is shared or global, so units can be analyzed
//! concurrently by an outer driver, each with its own context.

use std::collections::{HashMap, HashSet};

use aster_ast::{FrameId, Line, Type};

use crate::error::{ErrorKind, ErrorSink};

/// Kind of an in-progress breakable construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Loop,
    Switch,
}

/// One entry of the enclosing-construct stack. Break and continue bind to
/// a frame through [`ControlFrame::mark_break_used`] /
/// [`ControlFrame::mark_continue_used`] rather than by inspecting the
/// concrete statement kind.
#[derive(Debug)]
pub struct ControlFrame {
    pub id: FrameId,
    pub kind: FrameKind,
    break_used: bool,
    continue_used: bool,
}

impl ControlFrame {
    fn new(id: FrameId, kind: FrameKind) -> Self {
        Self {
            id,
            kind,
            break_used: false,
            continue_used: false,
        }
    }

    pub fn mark_break_used(&mut self) {
        self.break_used = true;
    }

    pub fn mark_continue_used(&mut self) {
        self.continue_used = true;
    }

    pub fn break_used(&self) -> bool {
        self.break_used
    }

    pub fn continue_used(&self) -> bool {
        self.continue_used
    }
}

/// Resolution for catch-parameter and throw types.
#[derive(Debug, Default)]
pub struct ExceptionRegistry {
    classes: HashSet<String>,
}

impl ExceptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>) {
        self.classes.insert(name.into());
    }

    pub fn resolve(&self, name: &str) -> Option<Type> {
        self.classes.contains(name).then(|| Type::object(name))
    }
}

#[derive(Debug, Default)]
struct Scope {
    vars: HashMap<String, (u16, Type)>,
}

/// Analysis-phase state for one compilation unit.
#[derive(Debug)]
pub struct AnalysisContext {
    frames: Vec<ControlFrame>,
    scopes: Vec<Scope>,
    next_slot: u16,
    next_frame: u32,
    pub errors: ErrorSink,
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            // Unit-level scope is always present.
            scopes: vec![Scope::default()],
            next_slot: 0,
            next_frame: 0,
            errors: ErrorSink::new(),
        }
    }

    // ===== Enclosing-construct stack =====

    pub fn push_frame(&mut self, kind: FrameKind) -> FrameId {
        let id = FrameId(self.next_frame);
        self.next_frame += 1;
        self.frames.push(ControlFrame::new(id, kind));
        id
    }

    pub fn pop_frame(&mut self) -> ControlFrame {
        // Pushes and pops bracket each loop/switch analysis exactly.
        self.frames.pop().expect("enclosing-construct stack underflow")
    }

    /// Nearest enclosing breakable construct of any kind.
    pub fn innermost_breakable(&mut self) -> Option<&mut ControlFrame> {
        self.frames.last_mut()
    }

    /// Nearest enclosing loop, skipping switch frames. A switch is not a
    /// valid continue target.
    pub fn innermost_loop(&mut self) -> Option<&mut ControlFrame> {
        self.frames
            .iter_mut()
            .rev()
            .find(|frame| frame.kind == FrameKind::Loop)
    }

    // ===== Scopes and local slots =====

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop().expect("scope stack underflow");
    }

    /// Allocate a fresh local slot. Slots are never reused within a unit.
    pub fn alloc_slot(&mut self) -> u16 {
        let slot = self.next_slot;
        self.next_slot += 1;
        slot
    }

    /// Declare a variable in the innermost scope, allocating its slot.
    /// Reports `DuplicateVariable` and returns `None` when the name is
    /// already bound in that scope.
    pub fn declare(&mut self, line: Line, name: &str, ty: Type) -> Option<u16> {
        let already_bound = self
            .scopes
            .last()
            .expect("scope stack underflow")
            .vars
            .contains_key(name);
        if already_bound {
            self.errors
                .report(line, ErrorKind::DuplicateVariable(name.to_string()));
            return None;
        }
        let slot = self.alloc_slot();
        self.scopes
            .last_mut()
            .expect("scope stack underflow")
            .vars
            .insert(name.to_string(), (slot, ty));
        Some(slot)
    }

    /// Innermost-out lookup.
    pub fn lookup(&self, name: &str) -> Option<(u16, Type)> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.vars.get(name).cloned())
    }

    pub fn local_count(&self) -> u16 {
        self.next_slot
    }
}

impl Default for AnalysisContext {
    fn default() -> Self {
        Self::new()
    }
}
