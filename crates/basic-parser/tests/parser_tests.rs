//! Statement parsing for every statement form, plus program-level error
//! collection.

use basic_parser::{parse_source, PrintItem, Program, Stmt, Target};
use basic_types::{ErrorCode, Value, MAX_ERRORS};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Parse a single line `10 <text>` and return its statements.
fn stmts(text: &str) -> Vec<Stmt> {
    let program = parse_source(&format!("10 {text}")).unwrap();
    program.lines.into_iter().next().unwrap().stmts
}

fn one(text: &str) -> Stmt {
    let mut all = stmts(text);
    assert_eq!(all.len(), 1, "{text}: expected one statement, got {all:?}");
    all.remove(0)
}

fn first_error_code(src: &str) -> ErrorCode {
    parse_source(src).unwrap_err().errors[0].code
}

// ─────────────────────────────────────────────────────────────────────
// Statement forms
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_data() {
    assert_eq!(
        one("DATA 1, \"TWO, 2\", THREE"),
        Stmt::Data {
            values: vec![
                Value::Number(1.0),
                Value::Text("TWO, 2".into()),
                Value::Text("THREE".into()),
            ]
        }
    );
}

#[test]
fn test_def() {
    match one("DEF FNA(X)=SIN(X/57.3)") {
        Stmt::Def { name, params, body } => {
            assert_eq!(name, "FNA");
            assert_eq!(params, vec!["X".to_string()]);
            assert_eq!(body.raw, "SIN(X/57.3)");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_dim() {
    match one("DIM A(10), B$(3,4)") {
        Stmt::Dim { arrays } => {
            assert_eq!(arrays.len(), 2);
            assert_eq!(arrays[0].name, "A");
            assert_eq!(arrays[1].name, "B$");
            assert_eq!(arrays[1].dims.len(), 2);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_for_with_and_without_step() {
    match one("FOR I = 1 TO 10 STEP 2") {
        Stmt::For { var, step, .. } => {
            assert_eq!(var, "I");
            assert_eq!(step.raw, "2");
        }
        other => panic!("unexpected {other:?}"),
    }
    match one("FOR J=N TO 1") {
        Stmt::For {
            var, limit, step, ..
        } => {
            assert_eq!(var, "J");
            assert_eq!(limit.raw, "1");
            assert_eq!(step.raw, "1");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_jumps() {
    assert_eq!(one("GOTO 100"), Stmt::Goto { line: 100 });
    assert_eq!(one("GOSUB 200"), Stmt::Gosub { line: 200 });
    assert_eq!(one("RETURN"), Stmt::Return);
    assert_eq!(one("END"), Stmt::End);
    assert_eq!(one("STOP"), Stmt::Stop);
    assert_eq!(one("RESTORE"), Stmt::Restore);
}

#[test]
fn test_if_forms() {
    assert!(matches!(one("IF X>1 THEN 50"), Stmt::IfLine { line: 50, .. }));
    assert!(matches!(one("IF X>1 GOTO 50"), Stmt::IfLine { line: 50, .. }));
    assert!(matches!(
        one("IF X THEN 10 ELSE 20"),
        Stmt::IfElseLine {
            line: 10,
            else_line: 20,
            ..
        }
    ));
    match one("IF A$=\"Y\" THEN PRINT \"YES\" ELSE PRINT \"NO\"") {
        Stmt::IfElseStmts {
            cond,
            stmts,
            else_stmts,
        } => {
            assert_eq!(cond.raw, "A$=\"Y\"");
            assert_eq!(stmts.len(), 1);
            assert_eq!(else_stmts.len(), 1);
        }
        other => panic!("unexpected {other:?}"),
    }
    match one("IF X THEN A=1:GOTO 40") {
        Stmt::IfStmts { stmts, .. } => {
            assert_eq!(stmts.len(), 2);
            assert_eq!(stmts[1], Stmt::Goto { line: 40 });
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_input() {
    match one("INPUT \"AGE\"; A") {
        Stmt::Input { prompt, targets } => {
            assert_eq!(prompt.as_deref(), Some("AGE"));
            assert_eq!(targets, vec![Target::Scalar("A".into())]);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(
        one("INPUT X, Y$"),
        Stmt::Input { prompt: None, ref targets } if targets.len() == 2
    ));
}

#[test]
fn test_let_and_assign() {
    assert!(matches!(
        one("LET A = 5"),
        Stmt::Let {
            target: Target::Scalar(_),
            ..
        }
    ));
    assert!(matches!(
        one("LET M(1,2) = 5"),
        Stmt::Let {
            target: Target::Element(_),
            ..
        }
    ));
    assert!(matches!(one("A=5"), Stmt::Assign { ref var, .. } if var == "A"));
    assert!(matches!(
        one("W(1,2)=3"),
        Stmt::AssignArray { ref target, .. } if target.name == "W" && target.subscripts.len() == 2
    ));
}

#[test]
fn test_next() {
    assert_eq!(
        one("NEXT J, I"),
        Stmt::Next {
            vars: vec!["J".into(), "I".into()]
        }
    );
    assert_eq!(one("NEXT"), Stmt::Next { vars: vec![] });
}

#[test]
fn test_on() {
    assert!(matches!(
        one("ON K GOSUB 100, 200, 300"),
        Stmt::OnGosub { ref lines, .. } if lines == &[100, 200, 300]
    ));
    assert!(matches!(
        one("ON K+1 GOTO 10,20"),
        Stmt::OnGoto { ref lines, .. } if lines == &[10, 20]
    ));
}

#[test]
fn test_print() {
    match one("PRINT \"A\";X,Y;") {
        Stmt::Print { items } => {
            assert_eq!(items.len(), 6);
            assert_eq!(items[1], PrintItem::Semicolon);
            assert_eq!(items[3], PrintItem::Comma);
            assert_eq!(items[5], PrintItem::Semicolon);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(one("PRINT"), Stmt::Print { items: vec![] });
    assert!(matches!(one("PRINT\"HI\""), Stmt::Print { ref items } if items.len() == 1));
}

#[test]
fn test_read() {
    match one("READ A, B$, C(2)") {
        Stmt::Read { targets } => {
            assert_eq!(targets.len(), 3);
            assert!(matches!(targets[2], Target::Element(_)));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_rem() {
    assert_eq!(
        one("REM HELLO: THERE"),
        Stmt::Rem {
            text: "HELLO: THERE".into()
        }
    );
    assert_eq!(one("REM"), Stmt::Rem { text: "".into() });
}

#[test]
fn test_two_statements_on_a_line() {
    let all = stmts("W(1,2)=3:PRINT W(1,2)");
    assert_eq!(all.len(), 2);
}

// ─────────────────────────────────────────────────────────────────────
// Program-level behavior
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_program_lines_and_lookup() {
    let program: Program = parse_source("20 PRINT 2\n10 PRINT 1\n\n30 END\n").unwrap();
    assert_eq!(program.len(), 3);
    assert_eq!(program.find_line(10), Some(1));
    assert_eq!(program.find_line(99), None);
    assert_eq!(program.lines[2].source_line, 4);
}

#[test]
fn test_data_collected_in_order() {
    let program =
        parse_source("10 DATA 1,2\n20 IF X THEN DATA 3\n30 DATA \"A\"\n").unwrap();
    assert_eq!(
        program.data_values(),
        vec![
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Number(3.0),
            Value::Text("A".into()),
        ]
    );
}

#[test]
fn test_errors_carry_line_context() {
    let err = parse_source("10 PRINT 1\n20 FROB X\n").unwrap_err();
    assert_eq!(err.total_errors, 1);
    let first = &err.errors[0];
    assert_eq!(first.code, ErrorCode::UNKNOWN_STATEMENT);
    let location = first.location.unwrap();
    assert_eq!(location.line, 20);
    assert_eq!(location.source_line, 2);
    assert_eq!(first.source_text, "FROB X");
}

#[test]
fn test_error_codes() {
    assert_eq!(first_error_code("10PRINT"), ErrorCode::MISSING_SEPARATOR);
    assert_eq!(first_error_code("10 LET 1X=2"), ErrorCode::INVALID_TARGET);
    assert_eq!(first_error_code("10 PRINT (1"), ErrorCode::EXPRESSION_INVALID);
}

#[test]
fn test_error_collection_is_capped() {
    let src: String = (1..=30).map(|n| format!("{n} FROB\n")).collect();
    let err = parse_source(&src).unwrap_err();
    assert_eq!(err.errors.len(), MAX_ERRORS);
    assert_eq!(err.total_errors, 30);
}

#[test]
fn test_determinism_100_iterations() {
    let src = "10 FOR I=1 TO 3\n20 PRINT I;\n30 NEXT I\n";
    let first = parse_source(src).unwrap();
    for i in 0..100 {
        let again = parse_source(src).unwrap();
        assert_eq!(first, again, "Determinism failure at iteration {i}");
    }
}
