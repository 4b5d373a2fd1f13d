//! Loops, conditionals, switch and operators

use pretty_assertions::assert_eq;
use voidwalk::*;

fn run(src: &str) -> Result<String, EvalError> {
    let mut interp = Interpreter::new();
    interp.run_script(src, "test")?;
    Ok(interp.take_output())
}

// ═══════════════════════════════════════════════════════════════════════
// Loops
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_nested_loops_break_innermost() {
    let src = "for (int $i = 0; $i < 3; $i++) {
            for (int $j = 0; $j < 3; $j++) {
                if ($j == 1) { break; }
                printnl($i, $j, \"\");
            }
        }";
    assert_eq!(run(src).unwrap(), "0 0 1 0 2 0 ");
}

#[test]
fn test_loop_runs_again_on_next_execution() {
    let src = "function count_to(int $n) int {
            int $total = 0;
            int $i = 0;
            while ($i < $n) { $i++; $total += $i; }
            return $total;
        }
        print(count_to(3), count_to(4));";
    assert_eq!(run(src).unwrap(), "6 10\n");
}

#[test]
fn test_foreach_orders_keys() {
    let src = "object $scores = {carol: 3, alice: 1, bob: 2};
        for (string $name, int $score : $scores) { printnl($name, \"\"); }";
    assert_eq!(run(src).unwrap(), "alice bob carol ");
}

#[test]
fn test_foreach_over_instance_properties() {
    let src = "class P { int $x = 1; int $y = 2; }
        int $sum = 0;
        for (string $k, int $v : new P()) { $sum += $v; }
        print($sum);";
    assert_eq!(run(src).unwrap(), "3\n");
}

#[test]
fn test_foreach_over_string() {
    let src = "for (string $c : \"abc\") { printnl($c, \"\"); }";
    assert_eq!(run(src).unwrap(), "a b c ");
}

#[test]
fn test_foreach_value_type_checked() {
    let err = run("for (int $v : [\"a\"]) { }").unwrap_err();
    assert!(matches!(err, EvalError::TypeError { .. }));
}

#[test]
fn test_break_in_function_outside_loop() {
    let err = run("function f() { break; } f();").unwrap_err();
    assert!(matches!(err, EvalError::RuntimeError { .. }));
}

// ═══════════════════════════════════════════════════════════════════════
// switch
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_switch_on_strings() {
    let src = "function label(string $s) string {
            switch ($s) {
                case \"a\": return \"first\";
                case \"b\": return \"second\";
                default: return \"other\";
            }
        }
        print(label(\"a\"), label(\"b\"), label(\"z\"));";
    assert_eq!(run(src).unwrap(), "first second other\n");
}

#[test]
fn test_switch_fallthrough_into_default() {
    let src = "switch (3) { case 3: printnl(\"three\"); default: printnl(\"-default\"); }";
    assert_eq!(run(src).unwrap(), "three-default");
}

#[test]
fn test_continue_inside_switch_reaches_loop() {
    let src = "for (int $i = 0; $i < 4; $i++) {
            switch ($i % 2) { case 0: continue; }
            printnl($i);
        }";
    assert_eq!(run(src).unwrap(), "13");
}

// ═══════════════════════════════════════════════════════════════════════
// Operators
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_arithmetic_and_precedence() {
    assert_eq!(run("print(2 + 3 * 4, (2 + 3) * 4, 7 % 3, -2 * 3);").unwrap(), "14 20 1 -6\n");
    assert_eq!(run("print(7 / 2, 7.0 / 2);").unwrap(), "3 3.5\n");
}

#[test]
fn test_comparison_and_logic() {
    let src = "print(1 < 2 && 2 < 3, 1 > 2 || !true, \"a\" == \"a\", 1 != 1.0);";
    assert_eq!(run(src).unwrap(), "true false true false\n");
}

#[test]
fn test_string_concatenation() {
    assert_eq!(run("print(\"foo\" + \"bar\");").unwrap(), "foobar\n");
    assert!(matches!(run("print(\"a\" + 1);"), Err(EvalError::TypeError { .. })));
}

#[test]
fn test_division_by_zero() {
    assert!(matches!(run("print(1 / 0);"), Err(EvalError::RuntimeError { .. })));
    assert!(matches!(run("print(1 % 0);"), Err(EvalError::RuntimeError { .. })));
}

#[test]
fn test_null_comparison() {
    let src = "string $s = null; print($s == null, $s != null);";
    assert_eq!(run(src).unwrap(), "true false\n");
}

#[test]
fn test_mismatched_operands() {
    assert!(matches!(run("print(true + 1);"), Err(EvalError::TypeError { .. })));
    assert!(matches!(run("print(!1);"), Err(EvalError::TypeError { .. })));
    assert!(matches!(run("print(-\"a\");"), Err(EvalError::TypeError { .. })));
    assert!(matches!(run("print(1.5 % 2);"), Err(EvalError::TypeError { .. })));
}
