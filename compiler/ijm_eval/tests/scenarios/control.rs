//! Entry points, cancellation, host cancel and the debugger hook.

use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use ijm_eval::{
    CancelToken, DebugAction, DebugMode, DebugTick, Debugger, DialogAnswer, EvalConfig,
    EvalErrorKind, HeadlessHost, Interpreter, LineTracer, RunError, Value,
};
use ijm_lexer::LexError;
use pretty_assertions::assert_eq;

use crate::common::run_on;

/// Records the line of every statement; halts after `limit` of them.
struct Recorder {
    mode: DebugMode,
    lines: Rc<RefCell<Vec<usize>>>,
    limit: usize,
}

impl Recorder {
    fn new(mode: DebugMode, limit: usize) -> (Self, Rc<RefCell<Vec<usize>>>) {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder {
            mode,
            lines: Rc::clone(&lines),
            limit,
        };
        (recorder, lines)
    }
}

impl Debugger for Recorder {
    fn mode(&self) -> DebugMode {
        self.mode
    }

    fn on_statement(&mut self, tick: &DebugTick<'_>) -> DebugAction {
        let mut lines = self.lines.borrow_mut();
        if lines.len() == self.limit {
            return DebugAction::Halt;
        }
        lines.push(tick.line);
        DebugAction::Continue
    }
}

fn program(source: &str) -> ijm_ir::Program {
    ijm_lexer::tokenize(source).unwrap_or_default()
}

// Macros

const TWO_MACROS: &str = "\
var shared = 0;
macro \"Set\" { shared = 5; mine = 1; print(\"set\"); }
macro \"Show\" { print(shared); print(mine); }
";

#[test]
fn macros_share_globals_but_not_locals() {
    let mut interpreter = Interpreter::new(HeadlessHost::buffered());
    assert!(interpreter
        .run_macro_named(program(TWO_MACROS), "Set")
        .is_ok());
    assert_eq!(interpreter.variable("shared"), Some(&Value::Number(5.0)));
    assert_eq!(interpreter.variable("mine"), None);

    let show = interpreter.macro_entry("Show").unwrap_or(usize::MAX);
    let result = interpreter.invoke_macro(show);
    let kind = result.err().and_then(|e| e.diagnostic().map(|d| d.kind.clone()));
    assert_eq!(kind, Some(EvalErrorKind::UndefinedVariable));
    assert_eq!(interpreter.host().log_text(), "set\n5\n");
}

#[test]
fn macro_names_in_source_order() {
    let mut interpreter = Interpreter::new(HeadlessHost::buffered());
    assert!(interpreter.push_globals(program(TWO_MACROS)).is_ok());
    assert_eq!(interpreter.macro_names(), vec!["Set", "Show"]);
    assert_eq!(interpreter.variable("shared"), Some(&Value::Number(0.0)));
    assert_eq!(interpreter.host().log_text(), "");
}

#[test]
fn run_macro_by_token_index() {
    let mut interpreter = Interpreter::new(HeadlessHost::buffered());
    assert!(interpreter.push_globals(program(TWO_MACROS)).is_ok());
    let entry = interpreter.macro_entry("Set").unwrap_or(usize::MAX);

    let mut fresh = Interpreter::new(HeadlessHost::buffered());
    assert!(fresh.run_macro(program(TWO_MACROS), entry).is_ok());
    assert_eq!(fresh.host().log_text(), "set\n");
}

#[test]
fn unknown_macro_name() {
    let mut interpreter = Interpreter::new(HeadlessHost::buffered());
    let result = interpreter.run_macro_named(program(TWO_MACROS), "Nope");
    assert!(matches!(result, Err(RunError::UnknownMacro(name)) if name == "Nope"));
    assert!(!interpreter.has_failed());
}

#[test]
fn lex_errors_are_reported_once() {
    let mut interpreter = Interpreter::new(HeadlessHost::buffered());
    let result = interpreter.run_source("x = \"abc");
    assert!(matches!(
        result,
        Err(RunError::Lex(LexError::UnterminatedString { line: 1 }))
    ));
    assert!(interpreter.has_failed());
    assert_eq!(
        interpreter.host().errors(),
        &["Unterminated string in line 1".to_string()]
    );
}

#[test]
fn interpreter_runs_again_after_success() {
    let mut interpreter = Interpreter::new(HeadlessHost::buffered());
    assert!(interpreter.run_source("x = 1; print(x);").is_ok());
    assert!(interpreter.run_source("print(2);").is_ok());
    assert_eq!(interpreter.host().log_text(), "1\n2\n");
    assert_eq!(interpreter.variable("x"), None);
}

#[test]
fn exit_inside_a_function_ends_the_run() {
    let (result, host) = run_on(
        HeadlessHost::buffered(),
        EvalConfig::default(),
        "function f() { exit; }\nf();\nprint(1);",
    );
    assert!(result.is_ok());
    assert_eq!(host.log_text(), "");
}

// Cancellation

#[test]
fn canceled_token_stops_before_the_first_statement() {
    let token = CancelToken::new();
    token.cancel();
    let mut interpreter = Interpreter::builder(HeadlessHost::buffered())
        .cancel_token(token.clone())
        .build();
    assert!(matches!(
        interpreter.run_source("print(1);"),
        Err(RunError::Aborted)
    ));
    assert_eq!(interpreter.host().log_text(), "");
    assert!(interpreter.host().errors().is_empty());
    assert!(!interpreter.has_failed());

    token.reset();
    assert!(interpreter.run_source("print(2);").is_ok());
    assert_eq!(interpreter.host().log_text(), "2\n");
}

#[test]
fn another_thread_can_abort_an_endless_loop() {
    let mut interpreter = Interpreter::new(HeadlessHost::buffered());
    let token = interpreter.cancel_token();
    let canceler = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        token.cancel();
    });
    let result = interpreter.run_source("n = 0; while (true) { n++; }");
    canceler.join().ok();
    assert!(matches!(result, Err(RunError::Aborted)));
    assert!(interpreter.host().errors().is_empty());
}

#[test]
fn dialog_cancel_ends_the_run_silently() {
    let host = HeadlessHost::buffered().with_answers([DialogAnswer::Cancel]);
    let (result, host) = run_on(
        host,
        EvalConfig::default(),
        "print(\"before\");\nn = getNumber(\"n\", 1);\nprint(\"after\");",
    );
    assert!(matches!(result, Err(RunError::Canceled)));
    assert_eq!(host.log_text(), "before\n");
    assert!(host.errors().is_empty());
}

#[test]
fn dialogs_in_var_declarations_open_in_order() {
    let host = HeadlessHost::buffered()
        .with_answers([DialogAnswer::Number(1.0), DialogAnswer::Number(2.0)]);
    let (result, host) = run_on(
        host,
        EvalConfig::default(),
        "a = getNumber(\"a\", 0);\nvar b = getNumber(\"b\", 0);\nprint(a, b);",
    );
    assert!(result.is_ok());
    assert_eq!(host.log_text(), "1 2\n");
}

#[test]
fn message_cancel_ends_the_run_silently() {
    let host = HeadlessHost::buffered().with_answers([DialogAnswer::Cancel]);
    let (result, host) = run_on(
        host,
        EvalConfig::default(),
        "showMessage(\"stop?\");\nprint(\"after\");",
    );
    assert!(matches!(result, Err(RunError::Canceled)));
    assert_eq!(host.log_text(), "");
    assert!(host.messages().is_empty());
}

// Debugger

#[test]
fn debugger_sees_every_statement() {
    let (recorder, lines) = Recorder::new(DebugMode::Step, usize::MAX);
    let mut interpreter = Interpreter::builder(HeadlessHost::buffered())
        .debugger(Box::new(recorder))
        .build();
    let source = "x = 1;\ny = 2;\nif (x < y) {\n  z = 3;\n}";
    assert!(interpreter.run_source(source).is_ok());
    assert_eq!(*lines.borrow(), vec![1, 2, 3, 3, 4]);
}

#[test]
fn debugger_halt_aborts_the_run() {
    let (recorder, lines) = Recorder::new(DebugMode::Trace, 2);
    let mut interpreter = Interpreter::builder(HeadlessHost::buffered())
        .debugger(Box::new(recorder))
        .build();
    let result = interpreter.run_source("print(1);\nprint(2);\nprint(3);");
    assert!(matches!(result, Err(RunError::Aborted)));
    assert_eq!(interpreter.host().log_text(), "1\n2\n");
    assert_eq!(lines.borrow().len(), 2);
}

#[test]
fn run_to_completion_skips_the_hook() {
    let (recorder, lines) = Recorder::new(DebugMode::RunToCompletion, 0);
    let mut interpreter = Interpreter::builder(HeadlessHost::buffered())
        .debugger(Box::new(recorder))
        .build();
    assert!(interpreter.run_source("print(1);").is_ok());
    assert!(lines.borrow().is_empty());
}

#[test]
fn line_tracer_leaves_output_alone() {
    let mut interpreter = Interpreter::builder(HeadlessHost::buffered())
        .debugger(Box::new(LineTracer::default()))
        .build();
    assert!(interpreter
        .run_source("for (i = 0; i < 3; i++)\n  print(i);")
        .is_ok());
    assert_eq!(interpreter.host().log_text(), "0\n1\n2\n");
}
