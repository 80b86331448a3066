//! Image builtins against the headless host.

use ijm_eval::{EvalConfig, HeadlessHost};
use pretty_assertions::assert_eq;

use crate::common::{error_message, output, run_with};

fn host_after(source: &str) -> HeadlessHost {
    let (result, host) = run_with(EvalConfig::default(), source);
    assert!(result.is_ok(), "{:?}", host.errors());
    host
}

#[test]
fn new_image_becomes_active() {
    let source = "\
newImage(\"a\", \"8-bit black\", 4, 3);
print(getWidth(), getHeight(), getTitle(), nImages, getImageID());";
    assert_eq!(output(source), "4 3 a 1 -1\n");
}

#[test]
fn new_image_fill_kinds() {
    let source = "\
newImage(\"w\", \"8-bit white\", 2, 2);
print(getPixel(0, 0));
newImage(\"r\", \"8-bit ramp\", 4, 1);
print(getPixel(1, 0), getPixel(3, 0));";
    assert_eq!(output(source), "255\n64 192\n");
}

#[test]
fn new_image_takes_an_optional_depth() {
    assert_eq!(
        output("newImage(\"s\", \"8-bit black\", 2, 2, 1); print(nImages);"),
        "1\n"
    );
    assert_eq!(
        error_message("newImage(\"z\", \"8-bit black\", 0, 2);"),
        "Invalid image size"
    );
}

#[test]
fn huge_images_are_a_diagnostic() {
    assert_eq!(
        error_message("newImage(\"a\", \"8-bit\", 1e10, 1e10);"),
        "Image too large: 10000000000x10000000000"
    );
}

#[test]
fn pixels_read_and_write() {
    let host = host_after(
        "\
newImage(\"a\", \"8-bit black\", 4, 4);
setPixel(1, 1, 200);
print(getPixel(1, 1), getPixel(0, 0), getPixel(9, 9));",
    );
    assert_eq!(host.log_text(), "200 0 0\n");
    assert_eq!(host.pixel("a", 1, 1), Some(200.0));
}

#[test]
fn fill_respects_the_selection() {
    let host = host_after(
        "\
newImage(\"f\", \"8-bit black\", 4, 4);
setColor(10);
makeRectangle(1, 1, 2, 2);
fill;",
    );
    assert_eq!(host.pixel("f", 1, 1), Some(10.0));
    assert_eq!(host.pixel("f", 2, 2), Some(10.0));
    assert_eq!(host.pixel("f", 0, 0), Some(0.0));
    assert_eq!(host.pixel("f", 3, 3), Some(0.0));
}

#[test]
fn select_none_then_fill_covers_the_image() {
    let host = host_after(
        "\
newImage(\"f\", \"8-bit black\", 3, 3);
makeOval(0, 0, 2, 2);
run(\"Select None\");
setColor(30, 60, 90);
fill();",
    );
    assert_eq!(host.pixel("f", 2, 2), Some(60.0));
    assert_eq!(host.commands(), &["Select None".to_string()]);
}

#[test]
fn draw_line_uses_the_current_colour() {
    let host = host_after(
        "\
newImage(\"l\", \"8-bit black\", 4, 2);
setColor(7);
drawLine(0, 0, 3, 0);",
    );
    for x in 0..4 {
        assert_eq!(host.pixel("l", x, 0), Some(7.0));
        assert_eq!(host.pixel("l", x, 1), Some(0.0));
    }
}

#[test]
fn line_selection_fill() {
    let host = host_after(
        "\
newImage(\"d\", \"8-bit black\", 3, 3);
makeLine(0, 0, 2, 2);
setColor(5);
fill;",
    );
    assert_eq!(host.pixel("d", 1, 1), Some(5.0));
    assert_eq!(host.pixel("d", 0, 2), Some(0.0));
}

#[test]
fn select_image_by_id_and_title() {
    let source = "\
newImage(\"a\", \"8-bit black\", 1, 1);
a = getImageID();
newImage(\"b\", \"8-bit black\", 1, 1);
print(getTitle());
selectImage(a);
print(getTitle());
selectImage(\"b\");
print(getTitle());";
    assert_eq!(output(source), "b\na\nb\n");
}

#[test]
fn select_missing_image() {
    assert_eq!(
        error_message("selectImage(\"nope\");"),
        "\"nope\" not found"
    );
}

#[test]
fn close_activates_the_newest_remaining_image() {
    let source = "\
newImage(\"a\", \"8-bit black\", 1, 1);
newImage(\"b\", \"8-bit black\", 1, 1);
close;
print(nImages, getTitle());";
    assert_eq!(output(source), "1 a\n");
}

#[test]
fn image_builtins_without_an_image() {
    assert_eq!(error_message("print(getWidth());"), "No image");
    assert_eq!(error_message("setPixel(0, 0, 1);"), "No image");
    assert_eq!(output("print(nImages);"), "0\n");
}

#[test]
fn active_image_is_memoized_between_calls() {
    let host = host_after(
        "\
newImage(\"a\", \"8-bit black\", 4, 4);
for (i = 0; i < 4; i++) setPixel(i, 0, 1);
x = getPixel(0, 0);",
    );
    assert_eq!(host.current_image_queries(), 1);
}

#[test]
fn image_changes_invalidate_the_memo() {
    let host = host_after(
        "\
newImage(\"a\", \"8-bit black\", 2, 2);
setPixel(0, 0, 1);
newImage(\"b\", \"8-bit black\", 2, 2);
setPixel(0, 0, 2);
selectImage(\"a\");
setPixel(1, 1, 3);",
    );
    assert_eq!(host.current_image_queries(), 3);
    assert_eq!(host.pixel("a", 0, 0), Some(1.0));
    assert_eq!(host.pixel("a", 1, 1), Some(3.0));
    assert_eq!(host.pixel("b", 0, 0), Some(2.0));
}

#[test]
fn results_table() {
    let source = "\
setResult(\"Area\", 0, 5);
setResult(\"Area\", 1, 7);
setResult(\"Mean\", 1, 2.5);
updateResults();
print(nResults, getResult(\"Area\", 1), getResult(\"Mean\", 0), getResult(\"Mean\", 1));";
    assert_eq!(output(source), "2 7 0 2.5\n");
}

#[test]
fn results_table_errors() {
    assert_eq!(
        error_message("x = getResult(\"Nope\", 0);"),
        "\"Nope\" column not found"
    );
    assert_eq!(error_message("setResult(\"A\", 3, 1);"), "Row (3) out of range");
}

#[test]
fn run_records_commands_with_options() {
    let host = host_after(
        "setResult(\"A\", 0, 1);\nrun(\"Clear Results\", \"quiet\");\nprint(nResults);",
    );
    assert_eq!(host.log_text(), "0\n");
    assert_eq!(host.commands(), &["Clear Results[quiet]".to_string()]);
}

#[test]
fn unknown_command_fails() {
    assert_eq!(
        error_message("run(\"Gaussian Blur...\", \"sigma=2\");"),
        "Unrecognized command: \"Gaussian Blur...\""
    );
}
