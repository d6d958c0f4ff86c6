//! End-to-end tests: build a statement tree, run both phases, then either
//! execute the instruction stream on the reference interpreter or inspect
//! its shape directly.


use aster_ast::{BinaryOp, CaseLabel, CatchClause, Expr, Stmt, SwitchGroup, Type};
use proptest::prelude::*;

use crate::context::ExceptionRegistry;
use crate::emitter::{CodeUnit, Instr};
use crate::error::{Diagnostic, ErrorKind};
use crate::gen::switch::{select_dispatch, DispatchKind};
use crate::unit::CompilationUnit;

use interp::{run, ExcValue, Outcome};

fn registry() -> ExceptionRegistry {
    let mut registry = ExceptionRegistry::new();
    registry.define("Error");
    registry.define("IoError");
    registry.define("ParseError");
    registry
}

fn compile(stmts: Vec<Stmt>) -> CodeUnit {
    CompilationUnit::new(stmts)
        .analyze(&registry())
        .expect("unit analyzes cleanly")
        .generate()
}

fn exec(stmts: Vec<Stmt>) -> Outcome {
    run(&compile(stmts))
}

fn analysis_errors(stmts: Vec<Stmt>) -> Vec<Diagnostic> {
    CompilationUnit::new(stmts)
        .analyze(&registry())
        .err()
        .expect("analysis reports errors")
}

fn var(name: &str) -> Expr {
    Expr::var(1, name)
}

fn add(lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(1, BinaryOp::Add, lhs, rhs)
}

fn lt(lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(1, BinaryOp::Lt, lhs, rhs)
}

fn int_decl(name: &str, value: i32) -> Stmt {
    Stmt::var_decl(1, name, Type::Int, Expr::int(1, value))
}

fn incr(name: &str) -> Stmt {
    Stmt::assign(1, name, add(var(name), Expr::int(1, 1)))
}

fn case(value: i32) -> CaseLabel {
    CaseLabel::case(Expr::int(1, value))
}

// ===== Loops =====

#[test]
fn do_while_body_runs_at_least_once() {
    let out = exec(vec![
        int_decl("n", 0),
        Stmt::do_while(
            2,
            Stmt::block(2, vec![incr("n")]),
            Expr::boolean(2, false),
        ),
    ]);
    assert_eq!(out.int_local(0), 1);
    assert!(out.unhandled.is_none());
}

#[test]
fn do_while_repeats_until_condition_fails() {
    let out = exec(vec![
        int_decl("n", 0),
        Stmt::do_while(
            2,
            Stmt::block(2, vec![incr("n")]),
            lt(var("n"), Expr::int(2, 5)),
        ),
    ]);
    assert_eq!(out.int_local(0), 5);
}

#[test]
fn while_with_false_condition_skips_body() {
    let out = exec(vec![
        int_decl("n", 0),
        Stmt::while_loop(
            2,
            Expr::boolean(2, false),
            Stmt::block(2, vec![incr("n")]),
        ),
    ]);
    assert_eq!(out.int_local(0), 0);
}

#[test]
fn while_counts_up_to_bound() {
    let out = exec(vec![
        int_decl("n", 0),
        Stmt::while_loop(
            2,
            lt(var("n"), Expr::int(2, 4)),
            Stmt::block(2, vec![incr("n")]),
        ),
    ]);
    assert_eq!(out.int_local(0), 4);
}

#[test]
fn for_loop_runs_init_condition_and_update() {
    // total accumulates 0 + 1 + 2 over three iterations.
    let out = exec(vec![
        int_decl("total", 0),
        Stmt::for_loop(
            2,
            vec![int_decl("i", 0)],
            Some(lt(var("i"), Expr::int(2, 3))),
            vec![incr("i")],
            Stmt::block(
                2,
                vec![Stmt::assign(3, "total", add(var("total"), var("i")))],
            ),
        ),
    ]);
    assert_eq!(out.int_local(0), 3);
}

#[test]
fn for_without_condition_exits_through_break() {
    let out = exec(vec![
        int_decl("n", 0),
        Stmt::for_loop(
            2,
            vec![int_decl("i", 0)],
            None,
            vec![incr("i")],
            Stmt::block(
                2,
                vec![
                    Stmt::assign(3, "n", Expr::int(3, 7)),
                    Stmt::break_stmt(4),
                ],
            ),
        ),
    ]);
    assert_eq!(out.int_local(0), 7);
}

// ===== Break and continue binding =====

#[test]
fn break_binds_to_innermost_loop() {
    // The do-while breaks out of itself on every outer iteration; the for
    // loop keeps going.
    let out = exec(vec![
        int_decl("outer", 0),
        int_decl("inner", 0),
        Stmt::for_loop(
            2,
            vec![int_decl("i", 0)],
            Some(lt(var("i"), Expr::int(2, 2))),
            vec![incr("i")],
            Stmt::block(
                2,
                vec![
                    Stmt::do_while(
                        3,
                        Stmt::block(3, vec![incr("inner"), Stmt::break_stmt(4)]),
                        Expr::boolean(3, true),
                    ),
                    incr("outer"),
                ],
            ),
        ),
    ]);
    assert_eq!(out.int_local(0), 2);
    assert_eq!(out.int_local(1), 2);
}

#[test]
fn break_in_switch_leaves_switch_not_loop() {
    let out = exec(vec![
        int_decl("done", 0),
        Stmt::for_loop(
            2,
            vec![int_decl("i", 0)],
            Some(lt(var("i"), Expr::int(2, 3))),
            vec![incr("i")],
            Stmt::block(
                2,
                vec![Stmt::switch(
                    3,
                    var("i"),
                    vec![
                        SwitchGroup::new(
                            vec![case(0)],
                            vec![incr("done"), Stmt::break_stmt(4)],
                        ),
                        SwitchGroup::new(vec![CaseLabel::default_label(1)], vec![incr("done")]),
                    ],
                )],
            ),
        ),
    ]);
    // One increment per iteration: the break only ends the switch.
    assert_eq!(out.int_local(0), 3);
}

#[test]
fn break_in_loop_inside_switch_leaves_loop_not_switch() {
    let out = exec(vec![
        int_decl("loops", 0),
        int_decl("after", 0),
        int_decl("x", 0),
        Stmt::switch(
            2,
            var("x"),
            vec![
                SwitchGroup::new(
                    vec![case(0)],
                    vec![
                        Stmt::while_loop(
                            3,
                            Expr::boolean(3, true),
                            Stmt::block(3, vec![incr("loops"), Stmt::break_stmt(4)]),
                        ),
                        incr("after"),
                        Stmt::break_stmt(5),
                    ],
                ),
                SwitchGroup::new(
                    vec![CaseLabel::default_label(1)],
                    vec![Stmt::assign(6, "after", Expr::int(6, 100))],
                ),
            ],
        ),
    ]);
    assert_eq!(out.int_local(0), 1);
    assert_eq!(out.int_local(1), 1);
}

#[test]
fn continue_inside_switch_targets_enclosing_loop() {
    // The continue in the case-2 group must resolve past the switch frame
    // to the for loop, reach the update and keep iterating; it skips the
    // hits increment for that iteration only.
    let out = exec(vec![
        int_decl("hits", 0),
        Stmt::for_loop(
            2,
            vec![int_decl("i", 0)],
            Some(lt(var("i"), Expr::int(2, 5))),
            vec![incr("i")],
            Stmt::block(
                2,
                vec![
                    Stmt::switch(
                        3,
                        var("i"),
                        vec![
                            SwitchGroup::new(vec![case(2)], vec![Stmt::continue_stmt(4)]),
                            SwitchGroup::new(vec![CaseLabel::default_label(1)], vec![]),
                        ],
                    ),
                    incr("hits"),
                ],
            ),
        ),
    ]);
    assert_eq!(out.int_local(0), 4);
    assert!(out.unhandled.is_none());
}

#[test]
fn continue_in_do_while_skips_rest_and_falls_into_test() {
    let out = exec(vec![
        int_decl("n", 0),
        int_decl("rest", 0),
        Stmt::do_while(
            2,
            Stmt::block(
                2,
                vec![
                    incr("n"),
                    Stmt::switch(
                        3,
                        var("n"),
                        vec![
                            SwitchGroup::new(vec![case(1)], vec![Stmt::continue_stmt(4)]),
                            SwitchGroup::new(vec![CaseLabel::default_label(1)], vec![]),
                        ],
                    ),
                    incr("rest"),
                ],
            ),
            lt(var("n"), Expr::int(2, 3)),
        ),
    ]);
    assert_eq!(out.int_local(0), 3);
    // The first iteration continued before reaching the tail.
    assert_eq!(out.int_local(1), 2);
}

// ===== Switch dispatch =====

#[test]
fn switch_falls_through_between_groups() {
    let out = exec(vec![
        int_decl("n", 0),
        int_decl("x", 1),
        Stmt::switch(
            2,
            var("x"),
            vec![
                SwitchGroup::new(
                    vec![case(1)],
                    vec![Stmt::assign(3, "n", add(var("n"), Expr::int(3, 1)))],
                ),
                SwitchGroup::new(
                    vec![case(2)],
                    vec![
                        Stmt::assign(4, "n", add(var("n"), Expr::int(4, 10))),
                        Stmt::break_stmt(4),
                    ],
                ),
                SwitchGroup::new(
                    vec![CaseLabel::default_label(1)],
                    vec![Stmt::assign(5, "n", add(var("n"), Expr::int(5, 100)))],
                ),
            ],
        ),
    ]);
    assert_eq!(out.int_local(0), 11);
}

#[test]
fn switch_group_shared_by_multiple_labels() {
    let out = exec(vec![
        int_decl("n", 0),
        int_decl("x", 2),
        Stmt::switch(
            2,
            var("x"),
            vec![
                SwitchGroup::new(
                    vec![case(1), case(2)],
                    vec![Stmt::assign(3, "n", Expr::int(3, 9)), Stmt::break_stmt(3)],
                ),
                SwitchGroup::new(
                    vec![CaseLabel::default_label(1)],
                    vec![Stmt::assign(4, "n", Expr::int(4, 1))],
                ),
            ],
        ),
    ]);
    assert_eq!(out.int_local(0), 9);
}

#[test]
fn switch_without_match_or_default_falls_to_exit() {
    let out = exec(vec![
        int_decl("n", 0),
        int_decl("x", 7),
        Stmt::switch(
            2,
            var("x"),
            vec![
                SwitchGroup::new(vec![case(1)], vec![Stmt::assign(3, "n", Expr::int(3, 1))]),
                SwitchGroup::new(vec![case(2)], vec![Stmt::assign(4, "n", Expr::int(4, 2))]),
            ],
        ),
        // Execution resumes after the switch.
        Stmt::assign(5, "n", add(var("n"), Expr::int(5, 5))),
    ]);
    assert_eq!(out.int_local(0), 5);
}

#[test]
fn switch_with_only_default_runs_default() {
    let out = exec(vec![
        int_decl("n", 0),
        Stmt::switch(
            2,
            Expr::int(2, 5),
            vec![SwitchGroup::new(
                vec![CaseLabel::default_label(1)],
                vec![Stmt::assign(3, "n", Expr::int(3, 42))],
            )],
        ),
    ]);
    assert_eq!(out.int_local(0), 42);
}

#[test]
fn table_switch_holes_route_to_exit_without_default() {
    let stmts = vec![
        int_decl("n", 0),
        int_decl("x", 1),
        Stmt::switch(
            2,
            var("x"),
            vec![
                SwitchGroup::new(
                    vec![case(0)],
                    vec![Stmt::assign(3, "n", Expr::int(3, 10)), Stmt::break_stmt(3)],
                ),
                SwitchGroup::new(
                    vec![case(2)],
                    vec![Stmt::assign(4, "n", Expr::int(4, 20)), Stmt::break_stmt(4)],
                ),
                SwitchGroup::new(
                    vec![case(3)],
                    vec![Stmt::assign(5, "n", Expr::int(5, 30)), Stmt::break_stmt(5)],
                ),
            ],
        ),
    ];
    let unit = compile(stmts);
    let table = unit
        .code
        .iter()
        .find(|instr| matches!(instr, Instr::TableSwitch { .. }))
        .expect("dense labels lower to a table");
    if let Instr::TableSwitch { lo, targets, .. } = table {
        assert_eq!(*lo, 0);
        assert_eq!(targets.len(), 4);
    }
    // Value 1 is a hole; nothing runs.
    let out = run(&unit);
    assert_eq!(out.int_local(0), 0);
}

#[test]
fn table_targets_are_value_ordered_not_source_ordered() {
    let out = exec(vec![
        int_decl("n", 0),
        int_decl("x", 0),
        Stmt::switch(
            2,
            var("x"),
            vec![
                SwitchGroup::new(
                    vec![case(2)],
                    vec![Stmt::assign(3, "n", Expr::int(3, 20)), Stmt::break_stmt(3)],
                ),
                SwitchGroup::new(
                    vec![case(0)],
                    vec![Stmt::assign(4, "n", Expr::int(4, 10)), Stmt::break_stmt(4)],
                ),
                SwitchGroup::new(
                    vec![case(1)],
                    vec![Stmt::assign(5, "n", Expr::int(5, 30)), Stmt::break_stmt(5)],
                ),
            ],
        ),
    ]);
    assert_eq!(out.int_local(0), 10);
}

#[test]
fn sparse_labels_lower_to_lookup_switch() {
    let stmts = vec![
        int_decl("n", 0),
        int_decl("x", 1000),
        Stmt::switch(
            2,
            var("x"),
            vec![
                SwitchGroup::new(
                    vec![case(0)],
                    vec![Stmt::assign(3, "n", Expr::int(3, 1)), Stmt::break_stmt(3)],
                ),
                SwitchGroup::new(
                    vec![case(1000)],
                    vec![Stmt::assign(4, "n", Expr::int(4, 2)), Stmt::break_stmt(4)],
                ),
                SwitchGroup::new(
                    vec![case(2_000_000)],
                    vec![Stmt::assign(5, "n", Expr::int(5, 3)), Stmt::break_stmt(5)],
                ),
            ],
        ),
    ];
    let unit = compile(stmts);
    let lookup = unit
        .code
        .iter()
        .find(|instr| matches!(instr, Instr::LookupSwitch { .. }))
        .expect("sparse labels lower to a lookup");
    if let Instr::LookupSwitch { pairs, .. } = lookup {
        let values: Vec<i32> = pairs.iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![0, 1000, 2_000_000]);
    }
    let out = run(&unit);
    assert_eq!(out.int_local(0), 2);
}

proptest! {
    #[test]
    fn emitted_dispatch_agrees_with_cost_model(
        values in prop::collection::btree_set(-500i32..500, 1..10usize),
    ) {
        let groups = values
            .iter()
            .map(|&v| SwitchGroup::new(vec![case(v)], vec![Stmt::break_stmt(1)]))
            .collect();
        let unit = compile(vec![int_decl("x", 0), Stmt::switch(1, var("x"), groups)]);

        let lo = *values.iter().next().unwrap() as i64;
        let hi = *values.iter().next_back().unwrap() as i64;
        let expected = select_dispatch(lo, hi, values.len());
        let dispatch = unit
            .code
            .iter()
            .find(|instr| {
                matches!(instr, Instr::TableSwitch { .. } | Instr::LookupSwitch { .. })
            })
            .expect("switch lowers to one dispatch instruction");
        let agrees = match expected {
            DispatchKind::TableSwitch => matches!(dispatch, Instr::TableSwitch { .. }),
            DispatchKind::LookupSwitch => matches!(dispatch, Instr::LookupSwitch { .. }),
        };
        prop_assert!(agrees, "emitted {:?}, cost model chose {:?}", dispatch, expected);
    }
}

// ===== Try / catch / finally =====

#[test]
fn finally_runs_on_normal_exit() {
    let out = exec(vec![
        int_decl("fin", 0),
        Stmt::try_stmt(
            2,
            vec![int_decl("x", 1)],
            vec![],
            Some(vec![incr("fin")]),
        ),
    ]);
    assert_eq!(out.int_local(0), 1);
    assert!(out.unhandled.is_none());
}

fn two_catch_program() -> Vec<Stmt> {
    vec![
        int_decl("c1", 0),
        int_decl("c2", 0),
        int_decl("fin", 0),
        Stmt::try_stmt(
            2,
            vec![Stmt::throw(3, "IoError", "boom")],
            vec![
                CatchClause::new(4, "e", "ParseError", vec![incr("c1")]),
                CatchClause::new(5, "e", "IoError", vec![incr("c2")]),
            ],
            Some(vec![incr("fin")]),
        ),
    ]
}

#[test]
fn matching_catch_selected_in_declaration_order() {
    let out = exec(two_catch_program());
    assert_eq!(out.int_local(0), 0);
    assert_eq!(out.int_local(1), 1);
    assert_eq!(out.int_local(2), 1);
    assert!(out.unhandled.is_none());
}

#[test]
fn finally_body_replicated_once_per_exit_path() {
    // Slot 2 is fin: one store for the declaration, then one per inline
    // copy (after the try body, after each of the two catch bodies) and
    // one in the synthetic catch-all handler.
    let unit = compile(two_catch_program());
    let fin_stores = unit
        .code
        .iter()
        .filter(|instr| **instr == Instr::StoreLocal(2))
        .count();
    assert_eq!(fin_stores, 5);
}

#[test]
fn handler_table_lists_typed_then_catch_all_ranges() {
    let unit = compile(two_catch_program());
    let types: Vec<Option<&str>> = unit
        .handlers
        .iter()
        .map(|h| h.catch_type.as_deref())
        .collect();
    assert_eq!(
        types,
        vec![Some("ParseError"), Some("IoError"), None, None, None, None]
    );
}

#[test]
fn unmatched_exception_runs_finally_and_propagates() {
    let out = exec(vec![
        int_decl("fin", 0),
        Stmt::try_stmt(
            2,
            vec![Stmt::throw(3, "Error", "kaboom")],
            vec![CatchClause::new(4, "e", "IoError", vec![])],
            Some(vec![incr("fin")]),
        ),
    ]);
    assert_eq!(out.int_local(0), 1);
    assert_eq!(
        out.unhandled,
        Some(ExcValue {
            class: "Error".to_string(),
            message: "kaboom".to_string(),
        })
    );
}

#[test]
fn exception_in_catch_body_runs_finally_once() {
    let out = exec(vec![
        int_decl("fin", 0),
        Stmt::try_stmt(
            2,
            vec![Stmt::throw(3, "IoError", "first")],
            vec![CatchClause::new(
                4,
                "e",
                "IoError",
                vec![Stmt::throw(5, "ParseError", "second")],
            )],
            Some(vec![incr("fin")]),
        ),
    ]);
    assert_eq!(out.int_local(0), 1);
    assert_eq!(
        out.unhandled,
        Some(ExcValue {
            class: "ParseError".to_string(),
            message: "second".to_string(),
        })
    );
}

#[test]
fn try_without_finally_continues_after_exit() {
    let out = exec(vec![
        int_decl("after", 0),
        Stmt::try_stmt(
            2,
            vec![int_decl("x", 1)],
            vec![CatchClause::new(3, "e", "IoError", vec![])],
            None,
        ),
        Stmt::assign(4, "after", Expr::int(4, 7)),
    ]);
    assert_eq!(out.int_local(0), 7);
    assert!(out.unhandled.is_none());
}

#[test]
fn inner_handler_wins_over_outer() {
    let out = exec(vec![
        int_decl("which", 0),
        Stmt::try_stmt(
            2,
            vec![Stmt::try_stmt(
                3,
                vec![Stmt::throw(4, "IoError", "x")],
                vec![CatchClause::new(
                    5,
                    "e",
                    "IoError",
                    vec![Stmt::assign(5, "which", Expr::int(5, 1))],
                )],
                None,
            )],
            vec![CatchClause::new(
                6,
                "e",
                "IoError",
                vec![Stmt::assign(6, "which", Expr::int(6, 2))],
            )],
            None,
        ),
    ]);
    assert_eq!(out.int_local(0), 1);
    assert!(out.unhandled.is_none());
}

// ===== Analysis errors =====

fn assert_has_error(diagnostics: &[Diagnostic], pred: impl Fn(&ErrorKind) -> bool) {
    assert!(
        diagnostics.iter().any(|d| pred(&d.kind)),
        "missing expected diagnostic in {:?}",
        diagnostics
    );
}

#[test]
fn duplicate_case_label_is_rejected() {
    let errors = analysis_errors(vec![
        int_decl("x", 0),
        Stmt::switch(
            2,
            var("x"),
            vec![
                SwitchGroup::new(vec![case(1)], vec![]),
                SwitchGroup::new(vec![CaseLabel::case(Expr::int(5, 1))], vec![]),
                SwitchGroup::new(vec![case(2)], vec![]),
            ],
        ),
    ]);
    // Reported at the second occurrence.
    let dup = errors
        .iter()
        .find(|d| d.kind == ErrorKind::DuplicateCaseLabel(1))
        .expect("repeated case value is rejected");
    assert_eq!(dup.line, 5);
}

#[test]
fn duplicate_default_label_is_rejected() {
    let errors = analysis_errors(vec![
        int_decl("x", 0),
        Stmt::switch(
            2,
            var("x"),
            vec![
                SwitchGroup::new(vec![CaseLabel::default_label(3)], vec![]),
                SwitchGroup::new(vec![CaseLabel::default_label(5)], vec![]),
            ],
        ),
    ]);
    // Reported at the second default clause.
    let dup = errors
        .iter()
        .find(|d| d.kind == ErrorKind::DuplicateDefaultLabel)
        .expect("second default is rejected");
    assert_eq!(dup.line, 5);
}

#[test]
fn non_constant_case_label_is_rejected() {
    let errors = analysis_errors(vec![
        int_decl("x", 0),
        Stmt::switch(
            2,
            var("x"),
            vec![SwitchGroup::new(
                vec![CaseLabel::case(var("x"))],
                vec![],
            )],
        ),
    ]);
    assert_has_error(&errors, |kind| *kind == ErrorKind::NonConstantCaseLabel);
}

#[test]
fn boolean_switch_condition_is_rejected() {
    let errors = analysis_errors(vec![Stmt::switch(
        1,
        Expr::boolean(1, true),
        vec![SwitchGroup::new(vec![CaseLabel::default_label(1)], vec![])],
    )]);
    assert_has_error(&errors, |kind| {
        matches!(kind, ErrorKind::TypeMismatch { .. })
    });
}

#[test]
fn non_boolean_loop_condition_is_rejected() {
    let errors = analysis_errors(vec![Stmt::do_while(
        1,
        Stmt::block(1, vec![]),
        Expr::int(1, 1),
    )]);
    assert_has_error(&errors, |kind| {
        matches!(kind, ErrorKind::TypeMismatch { .. })
    });
}

#[test]
fn break_outside_breakable_is_rejected() {
    let errors = analysis_errors(vec![Stmt::break_stmt(1)]);
    assert_has_error(&errors, |kind| *kind == ErrorKind::UnboundBreak);
}

#[test]
fn continue_in_switch_without_loop_is_rejected() {
    // The switch frame is breakable but not continuable; with no loop
    // around it the continue has no target.
    let errors = analysis_errors(vec![
        int_decl("x", 0),
        Stmt::switch(
            2,
            var("x"),
            vec![SwitchGroup::new(
                vec![CaseLabel::default_label(1)],
                vec![Stmt::continue_stmt(3)],
            )],
        ),
    ]);
    assert_has_error(&errors, |kind| *kind == ErrorKind::UnboundContinue);
}

#[test]
fn unresolved_catch_type_is_rejected() {
    let errors = analysis_errors(vec![Stmt::try_stmt(
        1,
        vec![],
        vec![CatchClause::new(2, "e", "NoSuchError", vec![])],
        None,
    )]);
    assert_has_error(&errors, |kind| {
        *kind == ErrorKind::UnresolvedCatchType("NoSuchError".to_string())
    });
}

#[test]
fn throw_of_unknown_class_is_rejected() {
    let errors = analysis_errors(vec![Stmt::throw(1, "NoSuchError", "m")]);
    assert_has_error(&errors, |kind| {
        *kind == ErrorKind::UnresolvedCatchType("NoSuchError".to_string())
    });
}

#[test]
fn assignment_to_undefined_variable_is_rejected() {
    let errors = analysis_errors(vec![Stmt::assign(1, "ghost", Expr::int(1, 1))]);
    assert_has_error(&errors, |kind| {
        *kind == ErrorKind::UndefinedVariable("ghost".to_string())
    });
}

#[test]
fn for_scoped_variable_does_not_leak() {
    let errors = analysis_errors(vec![
        Stmt::for_loop(
            1,
            vec![int_decl("i", 0)],
            Some(lt(var("i"), Expr::int(1, 1))),
            vec![incr("i")],
            Stmt::block(1, vec![]),
        ),
        Stmt::assign(9, "i", Expr::int(9, 0)),
    ]);
    let leak = errors
        .iter()
        .find(|d| d.kind == ErrorKind::UndefinedVariable("i".to_string()))
        .expect("use after the loop is undefined");
    assert_eq!(leak.line, 9);
}

#[test]
fn duplicate_declaration_in_same_scope_is_rejected() {
    let errors = analysis_errors(vec![int_decl("n", 0), int_decl("n", 1)]);
    assert_has_error(&errors, |kind| {
        *kind == ErrorKind::DuplicateVariable("n".to_string())
    });
}

// ===== Structural dump and disassembly =====

#[test]
fn json_dump_unchanged_by_analysis() {
    let stmts = vec![
        int_decl("fin", 0),
        Stmt::for_loop(
            2,
            vec![int_decl("i", 0)],
            Some(lt(var("i"), Expr::int(2, 2))),
            vec![incr("i")],
            Stmt::block(
                2,
                vec![Stmt::try_stmt(
                    3,
                    vec![Stmt::throw(4, "IoError", "x")],
                    vec![CatchClause::new(5, "e", "IoError", vec![])],
                    Some(vec![incr("fin")]),
                )],
            ),
        ),
    ];
    let before: Vec<serde_json::Value> = stmts.iter().map(Stmt::to_json).collect();

    let analyzed = CompilationUnit::new(stmts)
        .analyze(&registry())
        .expect("unit analyzes cleanly");
    let after: Vec<serde_json::Value> =
        analyzed.statements().iter().map(Stmt::to_json).collect();

    assert_eq!(before, after);
}

#[test]
fn disassembly_lists_instructions_and_handlers() {
    let unit = compile(two_catch_program());
    let text = crate::disasm::disassemble(&unit);
    assert!(text.starts_with("locals:"));
    assert!(text.contains("THROW"));
    assert!(text.contains("exception table:"));
    assert!(text.contains("ParseError"));
    assert!(text.contains("<any>"));
}
