//! Statements, expressions, frames and diagnostics.

use ijm_eval::{EvalConfig, EvalErrorKind};
use pretty_assertions::assert_eq;

use crate::common::{
    diagnostic, diagnostic_with, error_message, loose, output, output_with, run_with,
};

// Assignment and mutation

#[test]
fn assignment_and_compound_operators() {
    let source = "x = 1; x = x + 2; x += 3; x *= 2; x -= 1; x /= 11; print(x);";
    assert_eq!(output(source), "1\n");
}

#[test]
fn increments_prefix_and_postfix() {
    assert_eq!(
        output("i = 5; j = i++; k = ++i; i--; --i; print(i, j, k);"),
        "5 5 7\n"
    );
}

#[test]
fn compound_plus_concatenates_text() {
    assert_eq!(output("s = \"a\"; s += 1; s += \"b\"; print(s);"), "a1b\n");
}

// Text and number promotion

#[test]
fn plus_concatenates_when_either_side_is_text() {
    assert_eq!(output("print(\"a\" + 1 + 2);"), "a12\n");
    assert_eq!(output("print(1 + 2 + \"a\");"), "3a\n");
}

#[test]
fn text_is_coerced_in_arithmetic() {
    assert_eq!(output("print(\"3\" * 2, \"10\" - 4);"), "6 6\n");
}

#[test]
fn number_formatting_in_output() {
    assert_eq!(output("print(1/3, 2.5, 1e9, -0);"), "0.3333 2.5 1E9 0\n");
}

#[test]
fn text_comparison_is_case_sensitive() {
    let source = "\
if (\"abc\" == \"abc\") print(\"eq\");
if (\"abc\" != \"ABC\") print(\"ne\");
if (\"apple\" < \"banana\") print(\"lt\");";
    assert_eq!(output(source), "eq\nne\nlt\n");
}

#[test]
fn nan_is_unequal_to_itself() {
    assert_eq!(
        output("x = NaN; if (x != x) print(\"nan\"); if (x == x) print(\"eq\");"),
        "nan\n"
    );
}

#[test]
fn bitwise_operators_work_on_integers() {
    assert_eq!(
        output("print(6 & 3, 6 | 3, 6 ^ 3, 1 << 4, -16 >> 2, ~0, 7 % 3);"),
        "2 7 5 16 -4 -1 1\n"
    );
}

#[test]
fn precedence_of_arithmetic_and_comparison() {
    assert_eq!(output("print(2 + 3 * 4, (2 + 3) * 4, 1 + 2 == 3);"), "14 20 1\n");
}

#[test]
fn hex_literals() {
    assert_eq!(output("print(0x1F + 1);"), "32\n");
}

// Booleans and short-circuit

#[test]
fn logical_operators_short_circuit() {
    let source = "\
function boom() { print(\"boom\"); return true; }
if (false && boom()) print(\"and\");
if (true || boom()) print(\"or\");
if (true && boom()) print(\"both\");";
    assert_eq!(output(source), "or\nboom\nboth\n");
}

#[test]
fn and_binds_tighter_than_or() {
    assert_eq!(
        output("if (true || false && false) print(\"yes\");"),
        "yes\n"
    );
}

#[test]
fn conditions_must_be_boolean() {
    assert_eq!(error_message("if (2) x = 1;"), "Boolean expression expected");
}

#[test]
fn negation_requires_boolean() {
    assert_eq!(output("b = !false; print(b, !true);"), "1 0\n");
    assert_eq!(error_message("b = !5;"), "Boolean expression expected");
}

// Control flow

#[test]
fn if_else_chains() {
    let source = "\
for (i = 0; i < 3; i++) {
    if (i == 0) print(\"zero\");
    else if (i == 1) print(\"one\");
    else { print(\"many\"); }
}";
    assert_eq!(output(source), "zero\none\nmany\n");
}

#[test]
fn while_with_break_and_continue() {
    let source = "\
i = 0; s = 0;
while (i < 10) {
    i++;
    if (i % 2 == 0) continue;
    if (i > 7) break;
    s += i;
}
print(i, s);";
    assert_eq!(output(source), "9 16\n");
}

#[test]
fn do_while_runs_at_least_once() {
    assert_eq!(output("i = 10; do { i++; } while (i < 3); print(i);"), "11\n");
    assert_eq!(output("i = 0; do { i++; } while (i < 3); print(i);"), "3\n");
}

#[test]
fn do_while_with_continue_and_break() {
    let source = "\
i = 0; n = 0;
do {
    i++;
    if (i == 2) continue;
    if (i == 5) break;
    n++;
} while (i < 10);
print(i, n);";
    assert_eq!(output(source), "5 3\n");
}

#[test]
fn loop_variable_persists_after_for() {
    assert_eq!(output("for (i = 0; i < 5; i++) {} print(i);"), "5\n");
}

#[test]
fn for_with_break_leaves_variable() {
    assert_eq!(
        output("for (i = 0; i < 10; i++) { if (i == 4) break; } print(i);"),
        "4\n"
    );
}

#[test]
fn for_with_empty_parts() {
    assert_eq!(
        output("i = 0; for (;;) { i++; if (i == 3) break; } print(i);"),
        "3\n"
    );
}

#[test]
fn nested_loops_break_innermost_only() {
    let source = "\
n = 0;
for (i = 0; i < 3; i++) {
    for (j = 0; j < 3; j++) {
        if (j == 1) break;
        n++;
    }
}
print(n);";
    assert_eq!(output(source), "3\n");
}

#[test]
fn break_outside_loop_is_an_error() {
    assert_eq!(error_message("break;"), "'break' not in a loop");
    assert_eq!(
        error_message("function f() { continue; } for (i = 0; i < 2; i++) f();"),
        "'continue' not in a loop"
    );
}

#[test]
fn top_level_return_ends_the_run() {
    assert_eq!(output("print(1); return; print(2);"), "1\n");
}

#[test]
fn exit_ends_the_run_normally() {
    assert_eq!(output("print(1); exit(\"bye\"); print(2);"), "1\nbye\n");
    assert_eq!(output("exit; print(2);"), "");
}

// Frames and functions

#[test]
fn functions_do_not_see_caller_locals() {
    let source = "\
function f() { x = 5; return x; }
x = 1;
y = f();
print(x, y);";
    assert_eq!(output(source), "1 5\n");
}

#[test]
fn functions_see_and_update_globals() {
    let source = "\
var g = 1;
function bump() { g = g + 1; }
bump(); bump();
print(g);";
    assert_eq!(output(source), "3\n");
}

#[test]
fn top_level_var_runs_in_source_order() {
    assert_eq!(output("i = 7;\nvar j = i;\nprint(j);"), "7\n");
    assert_eq!(output("var i = 1;\ni = 7;\nvar j = i;\nprint(j);"), "7\n");
}

#[test]
fn functions_see_globals_declared_before_the_call() {
    let source = "\
function show() { print(g); }
var g = 1;
show();
g = 2;
show();";
    assert_eq!(output(source), "1\n2\n");
    assert_eq!(
        error_message("function show() { print(g); }\nshow();\nvar g = 1;"),
        "Undefined variable"
    );
}

#[test]
fn var_in_function_shadows_global() {
    let source = "\
var g = 1;
function f() { var g = 10; g++; return g; }
print(f());
print(g);";
    assert_eq!(output(source), "11\n1\n");
}

#[test]
fn var_in_loop_reuses_its_cell() {
    let config = EvalConfig {
        stack_capacity: 8,
        ..EvalConfig::default()
    };
    let source = "for (i = 0; i < 100; i++) { var t = i; } print(t);";
    assert_eq!(output_with(config, source), "99\n");
}

#[test]
fn functions_may_be_declared_after_use() {
    assert_eq!(
        output("print(twice(4));\nfunction twice(n) { return 2 * n; }"),
        "8\n"
    );
}

#[test]
fn recursion() {
    let source = "\
function fact(n) { if (n <= 1) return 1; return n * fact(n - 1); }
function fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
print(fact(10), fib(15));";
    assert_eq!(output(source), "3628800 610\n");
}

#[test]
fn recursion_depth_is_bounded_by_the_stack() {
    let config = EvalConfig {
        stack_capacity: 50,
        ..EvalConfig::default()
    };
    let source = "function fact(n) { if (n <= 1) return 1; return n * fact(n - 1); }\n";

    let (ok, _) = run_with(config.clone(), &format!("{source}x = fact(50);"));
    assert!(ok.is_ok());

    let failed = diagnostic_with(config, &format!("{source}x = fact(51);"));
    assert_eq!(failed.kind, EvalErrorKind::StackOverflow);
}

#[test]
fn deep_recursion_with_default_capacity_fails_cleanly() {
    let failed = diagnostic("function down(n) { return down(n + 1); }\ndown(0);");
    assert_eq!(failed.kind, EvalErrorKind::StackOverflow);
    assert_eq!(failed.line, 1);
}

#[test]
fn missing_return_value_is_an_error_only_when_used() {
    let source = "function f() { x = 1; }\nf();\nprint(\"ok\");";
    assert_eq!(output(source), "ok\n");

    let failed = diagnostic("function f() { x = 1; }\ny = f();");
    assert_eq!(failed.kind, EvalErrorKind::NoReturnValue);
    assert_eq!(failed.line, 2);
}

#[test]
fn bare_return_yields_no_value() {
    assert_eq!(
        error_message("function f() { return; }\ny = f();"),
        "No return value"
    );
}

#[test]
fn argument_count_must_match() {
    assert_eq!(
        diagnostic("function f(a, b) { return a; }\nf(1);").kind,
        EvalErrorKind::ArgumentCount { expected: 2 }
    );
}

#[test]
fn argument_limit() {
    let config = EvalConfig {
        max_args: 2,
        ..EvalConfig::default()
    };
    let failed = diagnostic_with(config, "function f(a, b, c) { }\nf(1, 2, 3);");
    assert_eq!(failed.kind, EvalErrorKind::TooManyArguments);
}

#[test]
fn undefined_names() {
    assert_eq!(error_message("print(q);"), "Undefined variable");
    assert_eq!(error_message("x = nope(1);"), "Undefined identifier");
    assert_eq!(error_message("y++;"), "Undefined variable");
}

// Arrays

#[test]
fn arrays_index_and_length() {
    assert_eq!(
        output("a = newArray(3); a[1] = 5; a[2] += 2; print(a[1], a[2], a.length);"),
        "5 2 3\n"
    );
}

#[test]
fn array_elements_increment() {
    assert_eq!(
        output("a = newArray(2); a[0]++; a[0]++; v = a[1]++; print(a[0], a[1], v);"),
        "2 1 0\n"
    );
}

#[test]
fn arrays_have_value_semantics() {
    let source = "\
function poke(arr) { arr[0] = 99; return arr[0]; }
a = newArray(1, 2);
b = a;
b[0] = 9;
print(a[0], b[0], poke(a), a[0]);";
    assert_eq!(output(source), "1 9 99 1\n");
}

#[test]
fn array_index_out_of_range() {
    assert_eq!(
        error_message("a = newArray(3); a[3] = 1;"),
        "Index (3) out of 0-2 range"
    );
    assert_eq!(
        error_message("a = newArray(3); x = a[-1];"),
        "Index (-1) out of 0-2 range"
    );
}

#[test]
fn expandable_arrays_grow_on_store() {
    let config = EvalConfig {
        expandable_arrays: true,
        ..EvalConfig::default()
    };
    assert_eq!(
        output_with(config, "a = newArray(1); a[3] = 7; print(a.length, a[2], a[3]);"),
        "4 0 7\n"
    );
}

#[test]
fn expandable_store_is_bounded() {
    let config = EvalConfig {
        expandable_arrays: true,
        max_array_len: 100,
        ..EvalConfig::default()
    };
    assert_eq!(
        output_with(config.clone(), "a = newArray(1); a[99] = 1; print(a.length);"),
        "100\n"
    );
    assert_eq!(
        diagnostic_with(config.clone(), "a = newArray(1); a[100] = 1;").kind,
        EvalErrorKind::Invalid("array size")
    );
    assert_eq!(
        diagnostic_with(config, "a = newArray(1); a[1e15] = 1;").kind,
        EvalErrorKind::Invalid("array size")
    );
}

#[test]
fn text_length_counts_characters() {
    assert_eq!(output("s = \"héllo\"; print(s.length);"), "5\n");
}

#[test]
fn indexing_a_number_is_an_error() {
    assert_eq!(error_message("n = 1; x = n[0];"), "Array expected");
}

#[test]
fn arrays_are_not_numbers() {
    assert_eq!(
        error_message("a = newArray(1); x = a * 2;"),
        "Number or numeric function expected"
    );
}

// Diagnostics

#[test]
fn error_reports_line_and_bracketed_token() {
    let failed = diagnostic("x = 1;\ny = 2;\nz = 3 + * 2;\nw = 4;");
    assert_eq!(failed.kind, EvalErrorKind::ValueExpected);
    assert_eq!(failed.line, 3);
    assert_eq!(failed.source_line, "z = 3 + <*> 2 ;");
    assert_eq!(
        failed.to_string(),
        "Number or string expected in line 3:\nz = 3 + <*> 2 ;"
    );
}

#[test]
fn error_lines_count_comment_lines() {
    let source = "/* one\ntwo\nthree */\n// four\nprint(undefinedThing);";
    let failed = diagnostic(source);
    assert_eq!(failed.line, 5);
    assert!(failed.source_line.contains("<undefinedThing>"));
}

#[test]
fn error_inside_function_reports_function_line() {
    let source = "\
function f(x) {
    return x + ;
}
y = f(1);";
    let failed = diagnostic(source);
    assert_eq!(failed.line, 2);
    assert_eq!(failed.source_line, "return x + <;>");
}

#[test]
fn missing_semicolon_is_reported_on_the_next_token() {
    let failed = diagnostic("x = 1\ny = 2;");
    assert_eq!(failed.kind, EvalErrorKind::Expected(";"));
    assert_eq!(failed.line, 2);
    assert_eq!(failed.source_line, "<y> = 2 ;");
}

#[test]
fn statements_cannot_start_with_literals() {
    assert_eq!(error_message("5;"), "Statement cannot begin with '5'");
}

#[test]
fn only_the_first_error_is_shown() {
    // `diagnostic` asserts the host saw exactly one message.
    let failed = diagnostic("x = ;\ny = ;");
    assert_eq!(failed.line, 1);
}

// Loose syntax

#[test]
fn loose_syntax_accepts_missing_semicolons() {
    let source = "x = 1\ny = x + 1\nif (y == 2) { print(y) }\nprint(\"done\")";
    assert_eq!(output_with(loose(), source), "2\ndone\n");
}

#[test]
fn loose_syntax_keeps_for_headers_strict() {
    let failed = diagnostic_with(loose(), "for (i = 0\n i < 3; i++) {}");
    assert_eq!(failed.kind, EvalErrorKind::Expected(";"));
}

#[test]
fn loose_syntax_return_without_value() {
    let source = "function f() {\n  print(\"in\")\n  return\n}\nf()\nprint(\"out\")";
    assert_eq!(output_with(loose(), source), "in\nout\n");
}

// Macros

#[test]
fn plain_run_executes_only_the_first_macro() {
    let source = "\
print(\"top\");
macro \"A\" { print(\"a\"); }
macro \"B\" { print(\"b\"); }
print(\"end\");";
    assert_eq!(output(source), "top\na\nend\n");
}

#[test]
fn return_inside_macro_leaves_the_macro_only() {
    let source = "macro \"A\" { print(1); return; print(2); }\nprint(3);";
    assert_eq!(output(source), "1\n3\n");
}
