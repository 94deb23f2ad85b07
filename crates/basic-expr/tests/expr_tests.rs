//! Expression parsing and evaluation through the public API.

use basic_expr::{Args, Expr, ExprError, FuncError, Funcs, Vars};
use basic_types::Value;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn eval_with(src: &str, vars: &Vars) -> Result<Value, ExprError> {
    let mut funcs = Funcs::new();
    funcs.add_number("SQR", |args| {
        let args = Args::new(args);
        args.expect(1)?;
        Ok(args.number(0)?.sqrt())
    });
    funcs.add_value("LEFT$", |args| {
        let args = Args::new(args);
        args.expect(2)?;
        let n = args.int(1)?.max(0) as usize;
        Ok(Value::Text(args.text(0)?.chars().take(n).collect()))
    });
    Expr::parse(src)?.eval(vars, &funcs)
}

fn eval(src: &str) -> Result<Value, ExprError> {
    eval_with(src, &Vars::new())
}

fn number(src: &str) -> f64 {
    match eval(src) {
        Ok(Value::Number(n)) => n,
        other => panic!("{src}: expected a number, got {other:?}"),
    }
}

fn text(src: &str) -> String {
    match eval(src) {
        Ok(Value::Text(s)) => s,
        other => panic!("{src}: expected text, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Precedence through the rank stack
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_precedence_basics() {
    assert_eq!(number("1+2*3"), 7.0);
    assert_eq!(number("(1+1)*4+2*3"), 14.0);
    assert_eq!(number("2^3*2"), 16.0);
    assert_eq!(number("2*3^2"), 18.0);
}

#[test]
fn test_reciprocal_binds_to_following_operand() {
    let n = number("1+2*3/3^(1+(2+5))");
    assert!((n - 1.000914).abs() < 1e-6, "got {n}");
}

#[test]
fn test_parenthesis_not_flattened() {
    assert_eq!(number("(2+1)*4"), 12.0);
    assert_eq!(number("4*(2+1)"), 12.0);
}

#[test]
fn test_group_then_tighter_operators() {
    assert_eq!(number("1+(2^3)*4^5"), 8193.0);
}

#[test]
fn test_nested_groups() {
    assert_eq!(number("((1+2)*(3+4))"), 21.0);
    assert_eq!(number("(((5)))"), 5.0);
}

#[test]
fn test_subtraction_and_division() {
    assert_eq!(number("10-4-3"), 3.0);
    assert_eq!(number("64/4/2"), 8.0);
    assert_eq!(number("7-2*3"), 1.0);
}

#[test]
fn test_division_by_zero_is_infinite() {
    assert_eq!(number("1/0"), f64::INFINITY);
}

#[test]
fn test_unary_minus() {
    assert_eq!(number("-5+2"), -3.0);
    assert_eq!(number("2*-3"), -6.0);
    assert_eq!(number("4--1"), 5.0);
    assert_eq!(number("+7"), 7.0);
}

// ─────────────────────────────────────────────────────────────────────
// Relational and logical operators
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_relational_and_logical() {
    assert_eq!(number("13<17 AND 432>399"), 1.0);
    assert_eq!(number("2>=(1.3+0.8)"), 0.0);
    assert_eq!(number("13.44445 = 13.44446"), 0.0);
    assert_eq!(number("3<>4"), 1.0);
    assert_eq!(number("1<0 OR 2>1"), 1.0);
    assert_eq!(number("1>0 AND 0>1 OR 1>0"), 1.0);
}

#[test]
fn test_text_comparison_and_concat() {
    assert_eq!(number("\"ABC\" = \"ABC\""), 1.0);
    assert_eq!(number("\"A\" < \"B\""), 1.0);
    assert_eq!(text("\"AB\" + \"CD\""), "ABCD");
}

#[test]
fn test_quoted_operators_are_text() {
    assert_eq!(text("\"1+2\""), "1+2");
    assert_eq!(text("\"(\""), "(");
}

// ─────────────────────────────────────────────────────────────────────
// Variables and calls
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_variables() {
    let mut vars = Vars::new();
    vars.set("X", Value::Number(4.0));
    vars.set("N$", Value::Text("WORLD".into()));
    assert_eq!(eval_with("X*X-1", &vars), Ok(Value::Number(15.0)));
    assert_eq!(
        eval_with("\"HELLO \" + N$", &vars),
        Ok(Value::Text("HELLO WORLD".into()))
    );
}

#[test]
fn test_function_calls() {
    assert_eq!(number("SQR(16)+1"), 5.0);
    assert_eq!(number("SQR(SQR(16))"), 2.0);
    assert_eq!(text("LEFT$(\"HELLO, WORLD\", 5)"), "HELLO");
}

#[test]
fn test_can_eval_numeric() {
    let vars = Vars::new();
    let funcs = Funcs::new();
    assert!(Expr::parse("1+X").unwrap().can_eval_numeric(&vars, &funcs));
    assert!(!Expr::parse("A$+\"X\"").unwrap().can_eval_numeric(&vars, &funcs));
    assert!(Expr::parse("A$=\"X\"").unwrap().can_eval_numeric(&vars, &funcs));
}

// ─────────────────────────────────────────────────────────────────────
// Failures
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_parse_failures() {
    assert!(matches!(Expr::parse("(1+2"), Err(ExprError::UnmatchedOpen(0))));
    assert!(matches!(Expr::parse("1+2)"), Err(ExprError::UnexpectedClose(3))));
    assert!(matches!(Expr::parse("1+"), Err(ExprError::MissingOperand(_))));
    assert!(matches!(Expr::parse("*2"), Err(ExprError::MissingOperand(_))));
    assert!(matches!(Expr::parse(""), Err(ExprError::Empty)));
    assert!(matches!(
        Expr::parse("\"abc"),
        Err(ExprError::UnterminatedString(0))
    ));
    assert!(matches!(Expr::parse("1-\"A\""), Err(ExprError::TextOperand { .. })));
}

#[test]
fn test_evaluation_failures() {
    assert_eq!(eval("Q+1"), Err(ExprError::UnknownVariable("Q".into())));
    assert_eq!(eval("NOPE(1)"), Err(ExprError::UnknownFunction("NOPE".into())));
    assert_eq!(
        eval("1+\"A\""),
        Err(ExprError::Mismatch {
            op: "+",
            left: "number",
            right: "text"
        })
    );
    assert!(matches!(
        eval("SQR(\"X\")"),
        Err(ExprError::Call {
            source: FuncError::ArgType { .. },
            ..
        })
    ));
}

#[test]
fn test_determinism_100_iterations() {
    let first = Expr::parse("1+2*3/3^(1+(2+5))").unwrap();
    for i in 0..100 {
        let again = Expr::parse("1+2*3/3^(1+(2+5))").unwrap();
        assert_eq!(first, again, "Determinism failure at iteration {i}");
    }
}
