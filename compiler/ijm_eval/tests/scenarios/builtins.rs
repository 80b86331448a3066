//! Numeric, text and array builtins, dialogs and files.

use ijm_eval::{DialogAnswer, EvalConfig, EvalErrorKind, HeadlessHost, RunError};
use pretty_assertions::assert_eq;

use crate::common::{diagnostic, error_message, output, run_on};

// Numbers

#[test]
fn math_functions() {
    assert_eq!(
        output("print(pow(2, 10), sqrt(16), abs(-3), minOf(3, 7), maxOf(3, 7), floor(-1.5));"),
        "1024 4 3 3 7 -2\n"
    );
}

#[test]
fn round_goes_half_up() {
    assert_eq!(output("print(round(2.5), round(-2.5), round(1.49));"), "3 -2 1\n");
}

#[test]
fn constants_without_parentheses() {
    assert_eq!(output("print(d2s(PI, 4), isNaN(NaN));"), "3.1416 1\n");
}

#[test]
fn parse_int_and_float() {
    assert_eq!(
        output("print(parseInt(\"ff\", 16), parseInt(\" 12 \"), parseFloat(\"2.5\"));"),
        "255 12 2.5\n"
    );
    assert_eq!(
        output("print(isNaN(parseInt(\"x\")), isNaN(parseFloat(\"\")));"),
        "1 1\n"
    );
    assert_eq!(error_message("n = parseInt(\"1\", 1);"), "Invalid radix");
}

#[test]
fn length_of_text_and_arrays() {
    assert_eq!(
        output("print(lengthOf(\"héllo\"), lengthOf(newArray(1, 2, 3)), lengthOf(\"\"));"),
        "5 3 0\n"
    );
}

#[test]
fn index_of_counts_characters() {
    let source = "print(indexOf(\"banana\", \"an\"), indexOf(\"banana\", \"an\", 2), indexOf(\"x\", \"y\"));";
    assert_eq!(output(source), "1 3 -1\n");
    assert_eq!(output("print(indexOf(\"héllo\", \"l\"));"), "2\n");
}

#[test]
fn starts_and_ends_with() {
    assert_eq!(
        output("print(startsWith(\"hello\", \"he\"), endsWith(\"hello\", \"he\"));"),
        "1 0\n"
    );
}

#[test]
fn seeded_runs_are_reproducible() {
    let source = "print(random, random(), random);";
    let first = output(source);
    assert_eq!(first, output(source));
    for word in first.split_whitespace() {
        let n: f64 = word.parse().unwrap_or(-1.0);
        assert!((0.0..1.0).contains(&n), "{n} out of range");
    }
}

#[test]
fn random_can_be_reseeded_from_the_program() {
    let source = "\
random(\"seed\", 3); a = random;
random(\"seed\", 3); b = random;
g = random(\"gaussian\");
print(a == b, isNaN(g));";
    assert_eq!(output(source), "1 0\n");
}

#[test]
fn gaussian_random_is_standard_normal() {
    let source = "\
random(\"seed\", 1); s = 0; neg = 0;
for (i = 0; i < 2000; i++) { g = random(\"gaussian\"); s += g; if (g < 0) neg++; }
random(\"seed\", 5); a = random(\"gaussian\");
random(\"seed\", 5); b = random(\"gaussian\");
print(abs(s / 2000) < 0.1, neg > 800, neg < 1200, a == b);";
    assert_eq!(output(source), "1 1 1 1\n");
}

#[test]
fn unknown_random_option() {
    assert_eq!(error_message("x = random(\"uniform\");"), "Invalid random option");
}

// Text

#[test]
fn number_to_text() {
    assert_eq!(
        output("print(d2s(3.14159, 2), d2s(12345, -2), toString(5), toString(1.5, 3));"),
        "3.14 1.23E4 5 1.500\n"
    );
}

#[test]
fn substring_is_character_based() {
    let source = "s = \"héllo\"; print(substring(s, 1, 2), substring(s, 2), substring(s, 0, 0) + \"|\");";
    assert_eq!(output(source), "é llo |\n");
}

#[test]
fn substring_out_of_range() {
    assert_eq!(
        error_message("s = substring(\"abc\", 2, 5);"),
        "Index (5) out of 0-2 range"
    );
    assert_eq!(
        error_message("s = substring(\"abc\", 2, 1);"),
        "Index (2) out of 0-2 range"
    );
}

#[test]
fn replace_is_literal() {
    assert_eq!(
        output("print(replace(\"a.b.c\", \".\", \"-\"), replace(\"abc\", \"\", \"x\"));"),
        "a-b-c abc\n"
    );
}

#[test]
fn case_and_char_codes() {
    assert_eq!(
        output("print(toUpperCase(\"abc\"), toLowerCase(\"ABC\"), fromCharCode(72, 105));"),
        "ABC abc Hi\n"
    );
}

#[test]
fn string_escapes() {
    assert_eq!(output("print(\"a\\tb\", 'q\"d', \"\\u0041\");"), "a\tb q\"d A\n");
}

#[test]
fn get_argument_reads_the_host_argument() {
    let host = HeadlessHost::buffered().with_argument("input.tif");
    let (result, host) = run_on(host, EvalConfig::default(), "print(\"arg=\" + getArgument());");
    assert!(result.is_ok());
    assert_eq!(host.log_text(), "arg=input.tif\n");
}

// Arrays

#[test]
fn new_array_from_elements() {
    assert_eq!(
        output("a = newArray(\"x\", 2, \"y\"); print(a.length, a[0], a[1] + 1);"),
        "3 x 3\n"
    );
    assert_eq!(output("a = newArray(); print(a.length);"), "0\n");
}

#[test]
fn arrays_print_comma_separated() {
    assert_eq!(output("print(newArray(1, \"a\", 2.5));"), "1,a,2.5\n");
}

#[test]
fn split_text() {
    let source = "\
a = split(\"one two\\tthree\");
b = split(\"a,b,,c\", \",\");
c = split(\"xyz\", \"\");
print(a.length, a[2], b.length, b[2], c.length);";
    assert_eq!(output(source), "3 three 3 c 3\n");
}

#[test]
fn sort_concat_sequence_copy() {
    let source = "\
print(Array.sort(newArray(3, 1, 2)));
print(Array.sort(newArray(\"b\", \"A\", \"c\")));
print(Array.concat(newArray(1, 2), 3, newArray(\"x\")));
print(Array.getSequence(4));
a = newArray(1, 2);
b = Array.copy(a);
b[0] = 5;
print(a[0], b[0]);";
    assert_eq!(output(source), "1,2,3\nA,b,c\n1,2,3,x\n0,1,2,3\n1 5\n");
}

#[test]
fn sort_rejects_mixed_arrays() {
    assert_eq!(
        error_message("a = Array.sort(newArray(1, \"a\"));"),
        "Mixed strings and numbers"
    );
}

#[test]
fn array_builtins_need_arrays() {
    assert_eq!(error_message("a = Array.copy(3);"), "Array expected");
}

#[test]
fn negative_array_size() {
    assert_eq!(error_message("a = newArray(-1);"), "Invalid array size");
}

#[test]
fn oversized_arrays_are_rejected() {
    assert_eq!(error_message("a = newArray(1e18);"), "Invalid array size");
    assert_eq!(error_message("a = newArray(NaN);"), "Invalid array size");
    assert_eq!(
        error_message("a = Array.getSequence(1e18);"),
        "Invalid array size"
    );
    assert_eq!(output("a = newArray(3); print(a.length);"), "3\n");
}

// Builtin positions

#[test]
fn procedures_have_no_value() {
    assert_eq!(error_message("x = print(1);"), "Number or string expected");
}

#[test]
fn function_results_can_be_discarded() {
    assert_eq!(output("sin(1); lengthOf(\"abc\"); print(\"ok\");"), "ok\n");
}

#[test]
fn dump_lists_the_stack() {
    let log = output("var g = 1;\nx = \"text\";\ndump();");
    assert!(log.contains("Symbol table:"), "{log}");
    assert!(log.contains("text"), "{log}");
}

// Dialogs and status

#[test]
fn dialogs_answer_from_the_script() {
    let host = HeadlessHost::buffered().with_answers([
        DialogAnswer::Number(5.0),
        DialogAnswer::Text("x".into()),
        DialogAnswer::Bool(false),
    ]);
    let source = "print(getNumber(\"n\", 1), getString(\"s\", \"d\"), getBoolean(\"b\"));";
    let (result, host) = run_on(host, EvalConfig::default(), source);
    assert!(result.is_ok());
    assert_eq!(host.log_text(), "5 x 0\n");
}

#[test]
fn dialogs_fall_back_to_defaults() {
    assert_eq!(
        output("print(getNumber(\"n\", 3), getString(\"s\", \"d\"));"),
        "3 d\n"
    );
}

#[test]
fn messages_status_and_progress_reach_the_host() {
    let source = "\
showMessage(\"hi\");
showMessage(\"Title\", \"body\");
showStatus(\"working\");
showProgress(1, 4);";
    let (result, host) = run_on(HeadlessHost::buffered(), EvalConfig::default(), source);
    assert!(result.is_ok());
    assert_eq!(
        host.messages(),
        &[
            ("Message".to_string(), "hi".to_string()),
            ("Title".to_string(), "body".to_string()),
        ]
    );
    assert_eq!(host.status(), "working");
    assert_eq!(host.progress(), 0.25);
}

#[test]
fn wrong_argument_counts_for_builtins() {
    assert_eq!(error_message("setColor(1, 2);"), "3 argument(s) expected");
    assert_eq!(error_message("x = sin(1, 2);"), "')' expected");
}

// Files

#[test]
fn files_round_trip_through_the_host() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.txt");
    let path_text = path.to_string_lossy().replace('\\', "/");
    let source = format!(
        "\
p = \"{path_text}\";
File.saveString(\"line one\", p);
print(File.exists(p));
print(File.openAsString(p));"
    );
    let (result, host) = run_on(HeadlessHost::buffered(), EvalConfig::default(), &source);
    assert!(result.is_ok(), "{:?}", host.errors());
    assert_eq!(host.log_text(), "1\nline one\n");
}

#[test]
fn missing_file_is_a_host_error() {
    let failed = diagnostic("s = File.openAsString(\"/no/such/dir/ijm-missing.txt\");");
    assert!(matches!(failed.kind, EvalErrorKind::Host(_)));
    assert_eq!(output("print(File.exists(\"/no/such/dir/ijm-missing.txt\"));"), "0\n");
}

#[test]
fn host_errors_show_once() {
    let (result, host) = run_on(
        HeadlessHost::buffered(),
        EvalConfig::default(),
        "s = File.openAsString(\"/no/such/dir/a\");\nprint(1);",
    );
    assert!(matches!(result, Err(RunError::Diagnostic(_))));
    assert_eq!(host.errors().len(), 1);
    assert_eq!(host.log_text(), "");
}
