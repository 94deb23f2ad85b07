//! Statement grammar matching against the BASIC statement forms.

use basic_lexer::{scan, FieldValue, Pattern, PatternError, PatternSet};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn matches(grammar: &str, input: &str) -> bool {
    Pattern::compile("test", grammar)
        .unwrap()
        .matches(input)
        .is_ok()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ─────────────────────────────────────────────────────────────────────
// Single captures
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_goto_line() {
    let fields = scan("GOTO {line:int}", "GOTO 22").unwrap();
    assert_eq!(fields.get("line"), Some(&FieldValue::Int(22)));
    assert_eq!(fields.len(), 1);
}

#[test]
fn test_int_capture_rejects_text() {
    assert!(!matches("GOTO {line:int}", "GOTO TWENTY"));
    assert!(!matches("GOTO {line:int}", "GOTO 1.5"));
}

#[test]
fn test_def_function() {
    let fields = scan("DEF {fnc:string}={expr:string}", "DEF FNA(X)=SIN(x/57.3)").unwrap();
    assert_eq!(fields.text("fnc"), Some("FNA(X)"));
    assert_eq!(fields.text("expr"), Some("SIN(x/57.3)"));
}

#[test]
fn test_for_step() {
    let fields = scan(
        "FOR {var:string}={init:string} TO {limit:string} STEP {step:string}",
        "FOR I = 10 TO 1 STEP -1",
    )
    .unwrap();
    assert_eq!(fields.text("var"), Some("I"));
    assert_eq!(fields.text("init"), Some("10"));
    assert_eq!(fields.text("limit"), Some("1"));
    assert_eq!(fields.text("step"), Some("-1"));
}

#[test]
fn test_keyword_inside_name_is_not_a_literal() {
    let fields = scan(
        "FOR {var:string}={init:string} TO {limit:string}",
        "FOR I=TOTAL TO STOP",
    )
    .unwrap();
    assert_eq!(fields.text("init"), Some("TOTAL"));
    assert_eq!(fields.text("limit"), Some("STOP"));
}

#[test]
fn test_glued_keyword() {
    let fields = scan("PRINT{items:string}", "PRINT\"HI\"").unwrap();
    assert_eq!(fields.text("items"), Some("\"HI\""));
}

// ─────────────────────────────────────────────────────────────────────
// Array captures
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_on_gosub_lines() {
    let fields = scan("ON {expr:string} GOSUB {lines:[]int}", "ON X GOSUB 100,200").unwrap();
    assert_eq!(fields.text("expr"), Some("X"));
    assert_eq!(fields.int_list("lines"), Some(&[100, 200][..]));
}

#[test]
fn test_array_elements_trimmed() {
    let fields = scan("NEXT {vars:[]string}", "NEXT J , I").unwrap();
    assert_eq!(fields.text_list("vars"), Some(&strings(&["J", "I"])[..]));
}

#[test]
fn test_array_split_respects_brackets_and_quotes() {
    let fields = scan("DIM {arrays:[]string}", "DIM A(10,5), B$(3)").unwrap();
    assert_eq!(
        fields.text_list("arrays"),
        Some(&strings(&["A(10,5)", "B$(3)"])[..])
    );

    let fields = scan("DATA {values:[]string}", r#"DATA 1, "A,B", -2.5"#).unwrap();
    assert_eq!(
        fields.text_list("values"),
        Some(&strings(&["1", "\"A,B\"", "-2.5"])[..])
    );
}

#[test]
fn test_array_bad_int_element() {
    assert!(!matches("ON {expr:string} GOTO {lines:[]int}", "ON X GOTO 10,X"));
}

// ─────────────────────────────────────────────────────────────────────
// Compile-time rejection
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_adjacent_captures_rejected() {
    assert_eq!(
        Pattern::compile("bad", "LET {a:string}{b:string}"),
        Err(PatternError::AdjacentCaptures("b".into()))
    );
}

// ─────────────────────────────────────────────────────────────────────
// Ordered sets
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_prefix_skips_grammar() {
    let mut set = PatternSet::new();
    set.add("REM", "REM{text:string}").unwrap();
    set.add("ASSIGN", "{target:string}={expr:string}").unwrap();

    let (fields, name) = set.eval("REMARK=1").unwrap();
    assert_eq!(name, "REM");
    assert_eq!(fields.text("text"), Some("ARK=1"));

    let (fields, name) = set.eval("X = Y + 1").unwrap();
    assert_eq!(name, "ASSIGN");
    assert_eq!(fields.text("target"), Some("X"));
    assert_eq!(fields.text("expr"), Some("Y + 1"));
}

#[test]
fn test_prefixed_grammar_beats_earlier_bare_one() {
    let mut set = PatternSet::new();
    set.add("ASSIGN", "{target:string}={expr:string}").unwrap();
    set.add("LET", "LET {target:string}={expr:string}").unwrap();

    let (fields, name) = set.eval("LET X=1").unwrap();
    assert_eq!(name, "LET");
    assert_eq!(fields.text("target"), Some("X"));

    let (fields, name) = set.eval("X=1").unwrap();
    assert_eq!(name, "ASSIGN");
    assert_eq!(fields.text("target"), Some("X"));
}

#[test]
fn test_determinism_100_iterations() {
    let mut set = PatternSet::new();
    set.add("ON_GOTO", "ON {expr:string} GOTO {lines:[]int}").unwrap();
    let first = set.eval("ON K GOTO 10, 20, 30").map(|(f, n)| (f, n.to_string()));
    for i in 0..100 {
        let next = set.eval("ON K GOTO 10, 20, 30").map(|(f, n)| (f, n.to_string()));
        assert_eq!(first, next, "Determinism failure at iteration {i}");
    }
}
