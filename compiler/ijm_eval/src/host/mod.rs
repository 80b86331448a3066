//! The host capability surface builtins delegate to.
//!
//! Every call is synchronous. A host may block (for example in a modal
//! dialog); cancellation is only observed after the call returns. Calls
//! that can be dismissed by the user report [`HostError::Canceled`], which
//! ends the run silently.

mod headless;

pub use headless::{
    buffer_output, stdout_output, DialogAnswer, HeadlessHost, OutputSink, SharedOutput,
};

use crate::value::Value;

/// Identifier of an open image. Hosts hand out negative ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageId(pub i64);

/// How `selectImage` names an image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageRef {
    Id(ImageId),
    Title(String),
}

/// Basic facts about an image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub id: ImageId,
    pub title: String,
    pub width: usize,
    pub height: usize,
}

/// A region of interest.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Roi {
    Rectangle { x: f64, y: f64, width: f64, height: f64 },
    Oval { x: f64, y: f64, width: f64, height: f64 },
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
}

/// Drawing colour.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Color {
    Value(f64),
    Rgb(u8, u8, u8),
}

/// Failure of a host call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The user dismissed the operation.
    #[error("canceled")]
    Canceled,
    /// The operation needs an image and none is open.
    #[error("no image")]
    NoImage,
    #[error("{0}")]
    Failed(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// Capabilities the host application provides to builtins.
pub trait Host {
    // Output and reporting

    /// Append a line to the log window.
    fn log(&mut self, text: &str);
    /// Present the single diagnostic of a failed run.
    fn show_error(&mut self, message: &str);
    fn show_status(&mut self, text: &str);
    fn show_progress(&mut self, fraction: f64);
    fn wait(&mut self, millis: f64);

    // Dialogs

    fn show_message(&mut self, title: &str, message: &str) -> HostResult<()>;
    fn get_number(&mut self, prompt: &str, default: f64) -> HostResult<f64>;
    fn get_string(&mut self, prompt: &str, default: &str) -> HostResult<String>;
    fn get_boolean(&mut self, prompt: &str) -> HostResult<bool>;

    // Images

    fn new_image(
        &mut self,
        title: &str,
        kind: &str,
        width: usize,
        height: usize,
    ) -> HostResult<ImageId>;
    fn select_image(&mut self, image: &ImageRef) -> HostResult<()>;
    /// Close the active image.
    fn close_image(&mut self) -> HostResult<()>;
    /// The active image, or [`HostError::NoImage`].
    fn current_image(&mut self) -> HostResult<ImageId>;
    fn image_count(&self) -> usize;
    fn image_info(&self, image: ImageId) -> HostResult<ImageInfo>;
    fn get_pixel(&self, image: ImageId, x: f64, y: f64) -> HostResult<f64>;
    fn put_pixel(&mut self, image: ImageId, x: i64, y: i64, value: f64) -> HostResult<()>;
    fn set_selection(&mut self, image: ImageId, roi: Roi) -> HostResult<()>;
    fn set_color(&mut self, color: Color);
    /// Fill the selection (or the whole image) with the current colour.
    fn fill(&mut self, image: ImageId) -> HostResult<()>;
    fn draw_line(&mut self, image: ImageId, from: (f64, f64), to: (f64, f64)) -> HostResult<()>;
    /// Run a named menu command.
    fn run_command(&mut self, command: &str, options: &str) -> HostResult<()>;

    // Results table

    fn set_result(&mut self, column: &str, row: usize, value: &Value) -> HostResult<()>;
    fn get_result(&self, column: &str, row: usize) -> HostResult<f64>;
    fn result_count(&self) -> usize;
    fn update_results(&mut self);

    // Files

    fn read_file(&mut self, path: &str) -> HostResult<String>;
    fn write_file(&mut self, path: &str, text: &str) -> HostResult<()>;
    fn file_exists(&self, path: &str) -> bool;

    /// Argument the macro was started with.
    fn argument(&self) -> String;
}
