//! Host-facing behaviour: sessions, templates and diagnostics

use pretty_assertions::assert_eq;
use voidwalk::*;

fn run(src: &str) -> Result<Interpreter, EvalError> {
    let mut interp = Interpreter::new();
    interp.run_script(src, "test")?;
    Ok(interp)
}

// ═══════════════════════════════════════════════════════════════════════
// Sessions
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_session_accumulates_declarations() {
    let mut interp = Interpreter::new();
    interp.run_script("int $total = 0;", "repl").unwrap();
    interp
        .run_script("function add(int $n) { $total += $n; }", "repl")
        .unwrap();
    interp.run_script("add(4); add(5);", "repl").unwrap();
    interp.run_script("print($total);", "repl").unwrap();
    assert_eq!(interp.output(), "9\n");
    assert_eq!(interp.variable("total").unwrap(), Value::Integer(9));
}

#[test]
fn test_session_survives_errors() {
    let mut interp = Interpreter::new();
    interp.run_script("int $a = 1;", "repl").unwrap();
    assert!(interp.run_script("$a = \"no\";", "repl").is_err());
    assert!(interp.run_script("int $b = ;", "repl").is_err());
    interp.run_script("$a = $a + 1;", "repl").unwrap();
    assert_eq!(interp.variable("a").unwrap(), Value::Integer(2));
}

#[test]
fn test_redeclaration_across_runs() {
    let mut interp = Interpreter::new();
    interp.run_script("int $a = 1;", "repl").unwrap();
    let err = interp.run_script("int $a = 2;", "repl").unwrap_err();
    assert!(matches!(err, EvalError::NameError { .. }));
}

#[test]
fn test_syntax_error_leaves_no_function_behind() {
    let mut interp = Interpreter::new();
    let err = interp
        .run_script("function g() int { return 1; } int $x = ;", "repl")
        .unwrap_err();
    assert!(matches!(err, EvalError::SyntaxError { .. }));
    assert!(!interp.environment().contains_scope("main::g"));
    assert!(interp.environment().operations(ROOT_SCOPE).is_empty());

    interp
        .run_script("function g() int { return 2; } int $y = g();", "repl")
        .unwrap();
    assert_eq!(interp.variable("y").unwrap(), Value::Integer(2));
}

#[test]
fn test_failed_run_frees_undeclared_functions() {
    let mut interp = Interpreter::new();
    assert!(interp
        .run_script("print($nope); function h() int { return 1; }", "repl")
        .is_err());
    assert!(!interp.environment().contains_scope("main::h"));

    interp
        .run_script("function h() int { return 2; } print(h());", "repl")
        .unwrap();
    assert_eq!(interp.output(), "2\n");
}

#[test]
fn test_failed_run_keeps_declared_functions() {
    let mut interp = Interpreter::new();
    assert!(interp
        .run_script("function k() int { return 3; } print($nope);", "repl")
        .is_err());
    interp.run_script("print(k());", "repl").unwrap();
    assert_eq!(interp.output(), "3\n");
}

#[test]
fn test_redefining_empty_function_across_runs() {
    let mut interp = Interpreter::new();
    interp.run_script("function f() { } f();", "repl").unwrap();
    let err = interp
        .run_script("function f() { print(\"leak\"); }", "repl")
        .unwrap_err();
    assert!(matches!(err, EvalError::NameError { .. }));
    assert_eq!(interp.output(), "");
}

#[test]
fn test_call_counter_only_resets_with_runtime() {
    let mut interp = Interpreter::new();
    interp
        .run_script("function f() { } f(); f(); f();", "t")
        .unwrap();
    assert_eq!(interp.environment().call_counter(), 3);
    interp.run_script("f();", "t").unwrap();
    assert_eq!(interp.environment().call_counter(), 4);
    interp.reset();
    assert_eq!(interp.environment().call_counter(), 0);
}

#[test]
fn test_take_output_drains() {
    let mut interp = run("print(1);").unwrap();
    assert_eq!(interp.take_output(), "1\n");
    assert_eq!(interp.output(), "");
}

#[test]
fn test_context_is_kept() {
    let ctx = EvalContext::with_max_call_depth(10).with_trace(true);
    let mut interp = Interpreter::with_context(ctx);
    interp.reset();
    assert_eq!(interp.context().max_call_depth, 10);
    assert!(interp.context().trace);
}

// ═══════════════════════════════════════════════════════════════════════
// Templates
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_template_interleaves_text_and_output() {
    let mut interp = Interpreter::new();
    let page = "<ul>\n<?void for (string $c : \"ab\") { printnl(\"<li>\" + $c + \"</li>\"); } ?>\n</ul>";
    let rendered = interp.run_template(page, "list.html").unwrap();
    assert_eq!(rendered, "<ul>\n<li>a</li><li>b</li>\n</ul>");
}

#[test]
fn test_template_shares_session_state() {
    let mut interp = Interpreter::new();
    interp
        .run_script("function greet(string $who) string { return \"hi \" + $who; }", "lib")
        .unwrap();
    let rendered = interp
        .run_template("<h1><?void printnl(greet(\"bo\")); ?></h1>", "page")
        .unwrap();
    assert_eq!(rendered, "<h1>hi bo</h1>");
}

#[test]
fn test_template_without_code() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.run_template("just text", "page").unwrap(), "just text");
}

#[test]
fn test_unterminated_template_tag() {
    let mut interp = Interpreter::new();
    let rendered = interp.run_template("a<?void printnl(\"b\");", "page").unwrap();
    assert_eq!(rendered, "ab");
}

// ═══════════════════════════════════════════════════════════════════════
// Diagnostics
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_runtime_error_diagnostic() {
    let err = run("int $a = 1;\nprint($nope);").unwrap_err();
    let diagnostic = err.diagnostic();
    assert_eq!(diagnostic.kind, ErrorKind::NameError);
    assert_eq!(diagnostic.file, "test");
    assert_eq!(diagnostic.line, 2);
    assert_eq!(diagnostic.column, 7);
}

#[test]
fn test_diagnostic_json() {
    let err = run("function f(int $a) { } f();").unwrap_err();
    let json = err.diagnostic().to_json().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["kind"], "ArityError");
    assert_eq!(parsed["file"], "test");
    assert_eq!(parsed["line"], 1);
    assert_eq!(parsed["column"], 24);
    assert_eq!(parsed["message"], "f expects 1 argument(s), got 0");
}

#[test]
fn test_syntax_error_position() {
    let err = run("int $a = 1;\nint $b = (2 + ;").unwrap_err();
    assert!(matches!(err, EvalError::SyntaxError { .. }));
    assert_eq!(err.location().line, 2);
    assert_eq!(err.kind(), ErrorKind::SyntaxError);
}

#[test]
fn test_error_display() {
    let err = run("print(1 / 0);").unwrap_err();
    assert!(err.to_string().starts_with("RuntimeError at test:1:"));
}
