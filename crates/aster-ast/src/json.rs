//! Structural tree dump
//!
//! Produces a deterministic `serde_json::Value` per node: node kind, source
//! line, and named child subtrees. The dump never mutates the tree and is
//! stable across repeated calls, so it can back snapshot tests.

use serde_json::{json, Map, Value};

use crate::ast::{CaseLabel, CatchClause, Expr, Stmt, SwitchGroup};

impl Expr {
    pub fn to_json(&self) -> Value {
        match self {
            Expr::IntLit { line, value } => json!({
                "kind": "IntLiteral",
                "line": line,
                "value": value,
            }),
            Expr::BoolLit { line, value } => json!({
                "kind": "BooleanLiteral",
                "line": line,
                "value": value,
            }),
            Expr::Var { line, name, .. } => json!({
                "kind": "Variable",
                "line": line,
                "name": name,
            }),
            Expr::Binary { line, op, lhs, rhs } => json!({
                "kind": "BinaryOp",
                "line": line,
                "op": format!("{:?}", op),
                "Lhs": lhs.to_json(),
                "Rhs": rhs.to_json(),
            }),
        }
    }
}

fn block_json(stmts: &[Stmt]) -> Value {
    Value::Array(stmts.iter().map(Stmt::to_json).collect())
}

impl SwitchGroup {
    fn to_json(&self) -> Value {
        let labels: Vec<Value> = self
            .labels
            .iter()
            .map(|label| match label {
                CaseLabel::Case { expr, .. } => json!({ "Case": expr.to_json() }),
                CaseLabel::Default { .. } => json!("Default"),
            })
            .collect();
        json!({
            "kind": "SwitchGroup",
            "Labels": labels,
            "Block": block_json(&self.block),
        })
    }
}

impl CatchClause {
    fn to_json(&self) -> Value {
        json!({
            "kind": "CatchBlock",
            "line": self.line,
            "parameter": [self.param_name, self.param_type],
            "Block": block_json(&self.body),
        })
    }
}

impl Stmt {
    pub fn to_json(&self) -> Value {
        match self {
            Stmt::Block { line, body } => json!({
                "kind": "Block",
                "line": line,
                "Body": block_json(body),
            }),
            Stmt::VarDecl {
                line,
                name,
                ty,
                init,
                ..
            } => json!({
                "kind": "VarDecl",
                "line": line,
                "name": name,
                "type": ty.to_string(),
                "Init": init.to_json(),
            }),
            Stmt::Assign { line, name, value, .. } => json!({
                "kind": "Assign",
                "line": line,
                "name": name,
                "Value": value.to_json(),
            }),
            Stmt::DoWhile {
                line,
                body,
                condition,
                ..
            } => json!({
                "kind": "DoStatement",
                "line": line,
                "Body": body.to_json(),
                "Condition": condition.to_json(),
            }),
            Stmt::While {
                line,
                condition,
                body,
                ..
            } => json!({
                "kind": "WhileStatement",
                "line": line,
                "Condition": condition.to_json(),
                "Body": body.to_json(),
            }),
            Stmt::For {
                line,
                init,
                condition,
                update,
                body,
                ..
            } => {
                // Absent clauses are omitted rather than dumped as null.
                let mut map = Map::new();
                map.insert("kind".into(), json!("ForStatement"));
                map.insert("line".into(), json!(line));
                if !init.is_empty() {
                    map.insert("Init".into(), block_json(init));
                }
                if let Some(condition) = condition {
                    map.insert("Condition".into(), condition.to_json());
                }
                if !update.is_empty() {
                    map.insert("Update".into(), block_json(update));
                }
                map.insert("Body".into(), body.to_json());
                Value::Object(map)
            }
            Stmt::Switch {
                line,
                condition,
                groups,
                ..
            } => json!({
                "kind": "SwitchStatement",
                "line": line,
                "Condition": condition.to_json(),
                "Groups": groups.iter().map(SwitchGroup::to_json).collect::<Vec<_>>(),
            }),
            Stmt::Break { line, .. } => json!({
                "kind": "BreakStatement",
                "line": line,
            }),
            Stmt::Continue { line, .. } => json!({
                "kind": "ContinueStatement",
                "line": line,
            }),
            Stmt::Try {
                line,
                try_block,
                catches,
                finally,
                ..
            } => {
                let mut map = Map::new();
                map.insert("kind".into(), json!("TryStatement"));
                map.insert("line".into(), json!(line));
                map.insert("TryBlock".into(), block_json(try_block));
                map.insert(
                    "CatchBlocks".into(),
                    Value::Array(catches.iter().map(CatchClause::to_json).collect()),
                );
                if let Some(finally) = finally {
                    map.insert("FinallyBlock".into(), block_json(finally));
                }
                Value::Object(map)
            }
            Stmt::Throw {
                line,
                class,
                message,
            } => json!({
                "kind": "ThrowStatement",
                "line": line,
                "class": class,
                "message": message,
            }),
        }
    }
}
