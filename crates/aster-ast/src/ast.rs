//! Statement and expression nodes
//!
//! Nodes carry their source line plus mutable decoration fields that the
//! analysis pass fills in exactly once: resolved local slots, case-label
//! values, and the break/continue marks on loops and switches. Jump labels
//! are deliberately *not* stored on nodes; they only exist inside one
//! generation pass.

use crate::types::Type;

/// Source line number.
pub type Line = u32;

/// Identity of a breakable/continuable construct, assigned during analysis
/// when the construct's frame is pushed onto the enclosing-construct stack.
/// Break and continue nodes bind to their target through this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl BinaryOp {
    /// True for operators that take `Int` operands and produce `Int`.
    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul)
    }
}

/// An expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    IntLit {
        line: Line,
        value: i32,
    },
    BoolLit {
        line: Line,
        value: bool,
    },
    Var {
        line: Line,
        name: String,
        /// Resolved local slot; set by analysis.
        slot: Option<u16>,
    },
    Binary {
        line: Line,
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn int(line: Line, value: i32) -> Expr {
        Expr::IntLit { line, value }
    }

    pub fn boolean(line: Line, value: bool) -> Expr {
        Expr::BoolLit { line, value }
    }

    pub fn var(line: Line, name: impl Into<String>) -> Expr {
        Expr::Var {
            line,
            name: name.into(),
            slot: None,
        }
    }

    pub fn binary(line: Line, op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            line,
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn line(&self) -> Line {
        match self {
            Expr::IntLit { line, .. }
            | Expr::BoolLit { line, .. }
            | Expr::Var { line, .. }
            | Expr::Binary { line, .. } => *line,
        }
    }
}

/// Break/continue marks on a loop, set during analysis. The generator only
/// places a break or continue label when the matching flag is set.
#[derive(Debug, Clone, Default)]
pub struct LoopMarks {
    pub frame: Option<FrameId>,
    pub has_break: bool,
    pub has_continue: bool,
}

/// Break mark on a switch. A switch is breakable but not continuable.
#[derive(Debug, Clone, Default)]
pub struct SwitchMarks {
    pub frame: Option<FrameId>,
    pub has_break: bool,
}

/// One case label of a switch group. `Default` may appear at most once per
/// switch; `Case` values must be pairwise distinct across the whole switch.
#[derive(Debug, Clone)]
pub enum CaseLabel {
    Case {
        expr: Expr,
        /// Resolved constant; set by analysis.
        value: Option<i32>,
    },
    Default {
        line: Line,
    },
}

impl CaseLabel {
    pub fn case(expr: Expr) -> CaseLabel {
        CaseLabel::Case { expr, value: None }
    }

    pub fn default_label(line: Line) -> CaseLabel {
        CaseLabel::Default { line }
    }
}

/// A switch group: one or more case labels sharing a block of statements.
/// Fallthrough between groups is implicit.
#[derive(Debug, Clone)]
pub struct SwitchGroup {
    pub labels: Vec<CaseLabel>,
    pub block: Vec<Stmt>,
}

impl SwitchGroup {
    pub fn new(labels: Vec<CaseLabel>, block: Vec<Stmt>) -> SwitchGroup {
        SwitchGroup { labels, block }
    }
}

/// A catch clause: a fresh parameter binding scoped to this clause's block.
#[derive(Debug, Clone)]
pub struct CatchClause {
    pub line: Line,
    pub param_name: String,
    /// Declared exception type name, resolved during analysis.
    pub param_type: String,
    pub body: Vec<Stmt>,
    /// Local slot holding the caught exception; set by analysis.
    pub slot: Option<u16>,
}

impl CatchClause {
    pub fn new(
        line: Line,
        param_name: impl Into<String>,
        param_type: impl Into<String>,
        body: Vec<Stmt>,
    ) -> CatchClause {
        CatchClause {
            line,
            param_name: param_name.into(),
            param_type: param_type.into(),
            body,
            slot: None,
        }
    }
}

/// A statement node.
#[derive(Debug, Clone)]
pub enum Stmt {
    Block {
        line: Line,
        body: Vec<Stmt>,
    },
    VarDecl {
        line: Line,
        name: String,
        ty: Type,
        init: Expr,
        /// Allocated local slot; set by analysis.
        slot: Option<u16>,
    },
    Assign {
        line: Line,
        name: String,
        value: Expr,
        /// Resolved local slot; set by analysis.
        slot: Option<u16>,
    },
    DoWhile {
        line: Line,
        body: Box<Stmt>,
        condition: Expr,
        marks: LoopMarks,
    },
    While {
        line: Line,
        condition: Expr,
        body: Box<Stmt>,
        marks: LoopMarks,
    },
    For {
        line: Line,
        init: Vec<Stmt>,
        condition: Option<Expr>,
        update: Vec<Stmt>,
        body: Box<Stmt>,
        marks: LoopMarks,
    },
    Switch {
        line: Line,
        condition: Expr,
        groups: Vec<SwitchGroup>,
        marks: SwitchMarks,
    },
    Break {
        line: Line,
        /// Enclosing breakable construct; bound by analysis.
        target: Option<FrameId>,
    },
    Continue {
        line: Line,
        /// Enclosing loop; bound by analysis.
        target: Option<FrameId>,
    },
    Try {
        line: Line,
        try_block: Vec<Stmt>,
        catches: Vec<CatchClause>,
        finally: Option<Vec<Stmt>>,
        /// Temporary slot for the in-flight exception on the synthetic
        /// finally path; set by analysis when a finally block is present.
        finally_slot: Option<u16>,
    },
    Throw {
        line: Line,
        class: String,
        message: String,
    },
}

impl Stmt {
    pub fn block(line: Line, body: Vec<Stmt>) -> Stmt {
        Stmt::Block { line, body }
    }

    pub fn var_decl(line: Line, name: impl Into<String>, ty: Type, init: Expr) -> Stmt {
        Stmt::VarDecl {
            line,
            name: name.into(),
            ty,
            init,
            slot: None,
        }
    }

    pub fn assign(line: Line, name: impl Into<String>, value: Expr) -> Stmt {
        Stmt::Assign {
            line,
            name: name.into(),
            value,
            slot: None,
        }
    }

    pub fn do_while(line: Line, body: Stmt, condition: Expr) -> Stmt {
        Stmt::DoWhile {
            line,
            body: Box::new(body),
            condition,
            marks: LoopMarks::default(),
        }
    }

    pub fn while_loop(line: Line, condition: Expr, body: Stmt) -> Stmt {
        Stmt::While {
            line,
            condition,
            body: Box::new(body),
            marks: LoopMarks::default(),
        }
    }

    pub fn for_loop(
        line: Line,
        init: Vec<Stmt>,
        condition: Option<Expr>,
        update: Vec<Stmt>,
        body: Stmt,
    ) -> Stmt {
        Stmt::For {
            line,
            init,
            condition,
            update,
            body: Box::new(body),
            marks: LoopMarks::default(),
        }
    }

    pub fn switch(line: Line, condition: Expr, groups: Vec<SwitchGroup>) -> Stmt {
        Stmt::Switch {
            line,
            condition,
            groups,
            marks: SwitchMarks::default(),
        }
    }

    pub fn break_stmt(line: Line) -> Stmt {
        Stmt::Break { line, target: None }
    }

    pub fn continue_stmt(line: Line) -> Stmt {
        Stmt::Continue { line, target: None }
    }

    pub fn try_stmt(
        line: Line,
        try_block: Vec<Stmt>,
        catches: Vec<CatchClause>,
        finally: Option<Vec<Stmt>>,
    ) -> Stmt {
        Stmt::Try {
            line,
            try_block,
            catches,
            finally,
            finally_slot: None,
        }
    }

    pub fn throw(line: Line, class: impl Into<String>, message: impl Into<String>) -> Stmt {
        Stmt::Throw {
            line,
            class: class.into(),
            message: message.into(),
        }
    }

    pub fn line(&self) -> Line {
        match self {
            Stmt::Block { line, .. }
            | Stmt::VarDecl { line, .. }
            | Stmt::Assign { line, .. }
            | Stmt::DoWhile { line, .. }
            | Stmt::While { line, .. }
            | Stmt::For { line, .. }
            | Stmt::Switch { line, .. }
            | Stmt::Break { line, .. }
            | Stmt::Continue { line, .. }
            | Stmt::Try { line, .. }
            | Stmt::Throw { line, .. } => *line,
        }
    }
}
