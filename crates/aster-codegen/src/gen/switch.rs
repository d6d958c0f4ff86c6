//! Switch lowering
//!
//! Evaluates the condition, selects a dispatch form from the case-value
//! shape, emits the dispatch instruction and then each group's labels and
//! block in source order. Fallthrough between groups is implicit; only an
//! explicit break leaves the switch early.

use std::collections::BTreeMap;

use aster_ast::{CaseLabel, Expr, SwitchGroup, SwitchMarks};
use log::trace;

use super::{GenFrame, Generator};
use crate::emitter::Instr;

/// Chosen dispatch instruction shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    /// Array-like jump table over the value range `[lo, hi]`.
    TableSwitch,
    /// Sorted value/target table over exactly the present values.
    LookupSwitch,
}

/// Dispatch-strategy cost model. A pure function of the case-value shape:
/// direct-index dispatch costs `5 + hi - lo` slots and constant time
/// (weight 3), binary-search dispatch costs `3 + 2n` slots and time
/// weight `n`. Ties go to the table form.
pub fn select_dispatch(lo: i64, hi: i64, n_labels: usize) -> DispatchKind {
    let n = n_labels as i64;
    let table_space_cost = 5 + hi - lo;
    let table_time_cost = 3;
    let lookup_space_cost = 3 + 2 * n;
    let lookup_time_cost = n;

    let kind = if n_labels > 0
        && table_space_cost + 3 * table_time_cost <= lookup_space_cost + 3 * lookup_time_cost
    {
        DispatchKind::TableSwitch
    } else {
        DispatchKind::LookupSwitch
    };
    trace!(
        "dispatch selection: lo={} hi={} n={} -> {:?}",
        lo,
        hi,
        n_labels,
        kind
    );
    kind
}

impl Generator {
    pub(crate) fn gen_switch(
        &mut self,
        condition: &Expr,
        groups: &[SwitchGroup],
        marks: &SwitchMarks,
    ) {
        self.gen_expr(condition);

        let default_label = self.em.create_label();
        let exit_label = self.em.create_label();
        let break_label = self.em.create_label();
        let id = marks.frame.expect("switch frame bound during analysis");

        // Every occurrence of a case value maps to its group-start label;
        // values are distinct after analysis.
        let mut pairs: BTreeMap<i32, _> = BTreeMap::new();
        let mut has_default = false;
        for group in groups {
            for label in &group.labels {
                match label {
                    CaseLabel::Case { value, .. } => {
                        let value = value.expect("case value resolved during analysis");
                        pairs.insert(value, self.em.create_label());
                    }
                    CaseLabel::Default { .. } => has_default = true,
                }
            }
        }

        let no_match = if has_default { default_label } else { exit_label };
        let n_labels = pairs.len();

        if n_labels == 0 {
            // Only a default clause, or no clauses at all.
            self.em.emit(Instr::LookupSwitch {
                default: no_match,
                pairs: Vec::new(),
            });
        } else {
            let lo = *pairs.keys().next().expect("non-empty");
            let hi = *pairs.keys().next_back().expect("non-empty");
            match select_dispatch(lo as i64, hi as i64, n_labels) {
                DispatchKind::TableSwitch => {
                    // Value-ordered table; holes route to the no-match
                    // target.
                    let targets = (lo as i64..=hi as i64)
                        .map(|v| pairs.get(&(v as i32)).copied().unwrap_or(no_match))
                        .collect();
                    self.em.emit(Instr::TableSwitch {
                        default: no_match,
                        lo,
                        targets,
                    });
                }
                DispatchKind::LookupSwitch => {
                    let sorted = pairs.iter().map(|(&v, &l)| (v, l)).collect();
                    self.em.emit(Instr::LookupSwitch {
                        default: no_match,
                        pairs: sorted,
                    });
                }
            }
        }

        self.frames.push(GenFrame {
            id,
            break_label,
            continue_label: None,
        });

        for group in groups {
            for label in &group.labels {
                match label {
                    CaseLabel::Case { value, .. } => {
                        let value = value.expect("case value resolved during analysis");
                        self.em.place_label(pairs[&value]);
                    }
                    CaseLabel::Default { .. } => self.em.place_label(default_label),
                }
            }
            self.gen_block(&group.block);
        }

        self.frames.pop();

        if marks.has_break {
            self.em.place_label(break_label);
        }
        self.em.place_label(exit_label);
    }
}
