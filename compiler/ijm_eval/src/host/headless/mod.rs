//! In-memory host used by tests and the CLI.
//!
//! Images are plain `f64` pixel buffers. Dialogs answer from a scripted
//! queue (falling back to their defaults), the results table is a list of
//! rows, and files go through `std::fs`. No image algorithms beyond storing
//! pixels, filling selections and drawing lines.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use super::{Color, Host, HostError, HostResult, ImageId, ImageInfo, ImageRef, Roi};
use crate::value::Value;

mod output;

pub use output::{buffer_output, stdout_output, OutputSink, SharedOutput};


/// Most pixels one in-memory image may hold.
pub const MAX_PIXELS: usize = 1 << 26;

/// A scripted answer for the next dialog.
#[derive(Clone, Debug, PartialEq)]
pub enum DialogAnswer {
    Number(f64),
    Text(String),
    Bool(bool),
    /// The user presses Cancel.
    Cancel,
}

#[derive(Clone, Debug)]
struct Image {
    id: ImageId,
    title: String,
    width: usize,
    height: usize,
    pixels: Vec<f64>,
    selection: Option<Roi>,
}

impl Image {
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    fn set(&mut self, x: i64, y: i64, value: f64) {
        if let Some(index) = self.index(x, y) {
            self.pixels[index] = value;
        }
    }

    fn line(&mut self, (x1, y1): (f64, f64), (x2, y2): (f64, f64), value: f64) {
        let (mut x, mut y) = (x1.round() as i64, y1.round() as i64);
        let (x2, y2) = (x2.round() as i64, y2.round() as i64);
        let dx = (x2 - x).abs();
        let dy = -(y2 - y).abs();
        let sx = if x < x2 { 1 } else { -1 };
        let sy = if y < y2 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set(x, y, value);
            if x == x2 && y == y2 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn fill(&mut self, value: f64) {
        match self.selection {
            None => self.pixels.fill(value),
            Some(Roi::Line { x1, y1, x2, y2 }) => self.line((x1, y1), (x2, y2), value),
            Some(Roi::Rectangle {
                x,
                y,
                width,
                height,
            }) => self.fill_where(x, y, width, height, value, |_, _| true),
            Some(Roi::Oval {
                x,
                y,
                width,
                height,
            }) => {
                let (rx, ry) = (width / 2.0, height / 2.0);
                let (cx, cy) = (x + rx, y + ry);
                self.fill_where(x, y, width, height, value, |px, py| {
                    let nx = (px + 0.5 - cx) / rx;
                    let ny = (py + 0.5 - cy) / ry;
                    nx * nx + ny * ny <= 1.0
                });
            }
        }
    }

    fn fill_where(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        value: f64,
        inside: impl Fn(f64, f64) -> bool,
    ) {
        let (x0, y0) = (x as i64, y as i64);
        let (x1, y1) = ((x + width) as i64, (y + height) as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                if inside(px as f64, py as f64) {
                    self.set(px, py, value);
                }
            }
        }
    }
}

/// Headless implementation of [`Host`].
pub struct HeadlessHost {
    output: SharedOutput,
    errors: Vec<String>,
    messages: Vec<(String, String)>,
    status: String,
    progress: f64,
    answers: VecDeque<DialogAnswer>,
    images: Vec<Image>,
    current: Option<usize>,
    next_id: i64,
    color: f64,
    columns: Vec<String>,
    rows: Vec<FxHashMap<String, f64>>,
    commands: Vec<String>,
    argument: String,
    current_image_queries: usize,
}

impl HeadlessHost {
    /// Host logging to `output`.
    pub fn new(output: SharedOutput) -> Self {
        HeadlessHost {
            output,
            errors: Vec::new(),
            messages: Vec::new(),
            status: String::new(),
            progress: 0.0,
            answers: VecDeque::new(),
            images: Vec::new(),
            current: None,
            next_id: -1,
            color: 0.0,
            columns: Vec::new(),
            rows: Vec::new(),
            commands: Vec::new(),
            argument: String::new(),
            current_image_queries: 0,
        }
    }

    /// Host capturing its log into a buffer.
    pub fn buffered() -> Self {
        Self::new(buffer_output())
    }

    /// Set the macro argument returned by `getArgument()`.
    #[must_use]
    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.argument = argument.into();
        self
    }

    /// Queue answers for upcoming dialogs, in order.
    #[must_use]
    pub fn with_answers(mut self, answers: impl IntoIterator<Item = DialogAnswer>) -> Self {
        self.answers.extend(answers);
        self
    }

    pub fn output(&self) -> &SharedOutput {
        &self.output
    }

    /// Captured log text.
    pub fn log_text(&self) -> String {
        self.output.get_output()
    }

    /// Diagnostics shown through [`Host::show_error`].
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// `(title, message)` pairs shown through `showMessage`.
    pub fn messages(&self) -> &[(String, String)] {
        &self.messages
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Commands passed to `run`, formatted as `command[options]`.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// How often the interpreter asked for the active image.
    pub fn current_image_queries(&self) -> usize {
        self.current_image_queries
    }

    /// Titles of the open images, oldest first.
    pub fn image_titles(&self) -> Vec<&str> {
        self.images.iter().map(|image| image.title.as_str()).collect()
    }

    /// Pixel of the image titled `title`, for assertions.
    pub fn pixel(&self, title: &str, x: i64, y: i64) -> Option<f64> {
        let image = self.images.iter().find(|image| image.title == title)?;
        image.index(x, y).map(|index| image.pixels[index])
    }

    fn next_answer(&mut self) -> Option<DialogAnswer> {
        self.answers.pop_front()
    }

    fn image(&self, id: ImageId) -> HostResult<&Image> {
        self.images
            .iter()
            .find(|image| image.id == id)
            .ok_or(HostError::NoImage)
    }

    fn image_mut(&mut self, id: ImageId) -> HostResult<&mut Image> {
        self.images
            .iter_mut()
            .find(|image| image.id == id)
            .ok_or(HostError::NoImage)
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::buffered()
    }
}

impl Host for HeadlessHost {
    fn log(&mut self, text: &str) {
        self.output.println(text);
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn show_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn show_progress(&mut self, fraction: f64) {
        self.progress = fraction;
    }

    fn wait(&mut self, millis: f64) {
        if millis > 0.0 {
            std::thread::sleep(std::time::Duration::from_secs_f64(millis / 1000.0));
        }
    }

    fn show_message(&mut self, title: &str, message: &str) -> HostResult<()> {
        if self.answers.front() == Some(&DialogAnswer::Cancel) {
            self.answers.pop_front();
            return Err(HostError::Canceled);
        }
        self.messages.push((title.to_string(), message.to_string()));
        Ok(())
    }

    fn get_number(&mut self, _prompt: &str, default: f64) -> HostResult<f64> {
        match self.next_answer() {
            Some(DialogAnswer::Cancel) => Err(HostError::Canceled),
            Some(DialogAnswer::Number(n)) => Ok(n),
            Some(DialogAnswer::Text(s)) => Ok(crate::value::parse_number(&s)),
            Some(DialogAnswer::Bool(_)) | None => Ok(default),
        }
    }

    fn get_string(&mut self, _prompt: &str, default: &str) -> HostResult<String> {
        match self.next_answer() {
            Some(DialogAnswer::Cancel) => Err(HostError::Canceled),
            Some(DialogAnswer::Text(s)) => Ok(s),
            Some(DialogAnswer::Number(n)) => Ok(crate::value::n2s(n)),
            Some(DialogAnswer::Bool(_)) | None => Ok(default.to_string()),
        }
    }

    fn get_boolean(&mut self, _prompt: &str) -> HostResult<bool> {
        match self.next_answer() {
            Some(DialogAnswer::Cancel) => Err(HostError::Canceled),
            Some(DialogAnswer::Bool(b)) => Ok(b),
            Some(DialogAnswer::Number(n)) => Ok(n != 0.0),
            Some(DialogAnswer::Text(_)) | None => Ok(true),
        }
    }

    fn new_image(
        &mut self,
        title: &str,
        kind: &str,
        width: usize,
        height: usize,
    ) -> HostResult<ImageId> {
        if width == 0 || height == 0 {
            return Err(HostError::Failed(format!(
                "Invalid image size: {width}x{height}"
            )));
        }
        let size = width
            .checked_mul(height)
            .filter(|&size| size <= MAX_PIXELS)
            .ok_or_else(|| HostError::Failed(format!("Image too large: {width}x{height}")))?;
        let kind = kind.to_lowercase();
        let mut pixels = vec![0.0; size];
        if kind.contains("white") {
            let white = if kind.contains("32") { 1.0 } else { 255.0 };
            pixels.fill(white);
        } else if kind.contains("ramp") {
            for (index, pixel) in pixels.iter_mut().enumerate() {
                *pixel = ((index % width) * 256 / width) as f64;
            }
        }
        let id = ImageId(self.next_id);
        self.next_id -= 1;
        self.images.push(Image {
            id,
            title: title.to_string(),
            width,
            height,
            pixels,
            selection: None,
        });
        self.current = Some(self.images.len() - 1);
        Ok(id)
    }

    fn select_image(&mut self, image: &ImageRef) -> HostResult<()> {
        let found = match image {
            ImageRef::Id(id) => self.images.iter().position(|image| image.id == *id),
            ImageRef::Title(title) => self.images.iter().position(|image| &image.title == title),
        };
        match found {
            Some(index) => {
                self.current = Some(index);
                Ok(())
            }
            None => Err(HostError::Failed(match image {
                ImageRef::Id(id) => format!("Image {} not found", id.0),
                ImageRef::Title(title) => format!("\"{title}\" not found"),
            })),
        }
    }

    fn close_image(&mut self) -> HostResult<()> {
        let index = self.current.ok_or(HostError::NoImage)?;
        self.images.remove(index);
        self.current = self.images.len().checked_sub(1);
        Ok(())
    }

    fn current_image(&mut self) -> HostResult<ImageId> {
        self.current_image_queries += 1;
        self.current
            .map(|index| self.images[index].id)
            .ok_or(HostError::NoImage)
    }

    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn image_info(&self, image: ImageId) -> HostResult<ImageInfo> {
        let image = self.image(image)?;
        Ok(ImageInfo {
            id: image.id,
            title: image.title.clone(),
            width: image.width,
            height: image.height,
        })
    }

    fn get_pixel(&self, image: ImageId, x: f64, y: f64) -> HostResult<f64> {
        let image = self.image(image)?;
        Ok(image
            .index(x as i64, y as i64)
            .map_or(0.0, |index| image.pixels[index]))
    }

    fn put_pixel(&mut self, image: ImageId, x: i64, y: i64, value: f64) -> HostResult<()> {
        self.image_mut(image)?.set(x, y, value);
        Ok(())
    }

    fn set_selection(&mut self, image: ImageId, roi: Roi) -> HostResult<()> {
        self.image_mut(image)?.selection = Some(roi);
        Ok(())
    }

    fn set_color(&mut self, color: Color) {
        self.color = match color {
            Color::Value(value) => value,
            Color::Rgb(r, g, b) => (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0,
        };
    }

    fn fill(&mut self, image: ImageId) -> HostResult<()> {
        let color = self.color;
        self.image_mut(image)?.fill(color);
        Ok(())
    }

    fn draw_line(&mut self, image: ImageId, from: (f64, f64), to: (f64, f64)) -> HostResult<()> {
        let color = self.color;
        self.image_mut(image)?.line(from, to, color);
        Ok(())
    }

    fn run_command(&mut self, command: &str, options: &str) -> HostResult<()> {
        self.commands.push(if options.is_empty() {
            command.to_string()
        } else {
            format!("{command}[{options}]")
        });
        match command {
            "Select None" | "Select All" => {
                let index = self.current.ok_or(HostError::NoImage)?;
                self.images[index].selection = None;
                Ok(())
            }
            "Clear Results" => {
                self.rows.clear();
                self.columns.clear();
                Ok(())
            }
            "Close All" => {
                self.images.clear();
                self.current = None;
                Ok(())
            }
            other => Err(HostError::Failed(format!("Unrecognized command: \"{other}\""))),
        }
    }

    fn set_result(&mut self, column: &str, row: usize, value: &Value) -> HostResult<()> {
        if row > self.rows.len() {
            return Err(HostError::Failed(format!("Row ({row}) out of range")));
        }
        if row == self.rows.len() {
            self.rows.push(FxHashMap::default());
        }
        if !self.columns.iter().any(|c| c == column) {
            self.columns.push(column.to_string());
        }
        self.rows[row].insert(column.to_string(), value.as_number());
        Ok(())
    }

    fn get_result(&self, column: &str, row: usize) -> HostResult<f64> {
        if !self.columns.iter().any(|c| c == column) {
            return Err(HostError::Failed(format!("\"{column}\" column not found")));
        }
        self.rows
            .get(row)
            .map(|values| values.get(column).copied().unwrap_or(0.0))
            .ok_or_else(|| HostError::Failed(format!("Row ({row}) out of range")))
    }

    fn result_count(&self) -> usize {
        self.rows.len()
    }

    fn update_results(&mut self) {
        tracing::debug!(
            rows = self.rows.len(),
            columns = self.columns.len(),
            "results updated"
        );
    }

    fn read_file(&mut self, path: &str) -> HostResult<String> {
        std::fs::read_to_string(path).map_err(|e| HostError::Failed(format!("{path}: {e}")))
    }

    fn write_file(&mut self, path: &str, text: &str) -> HostResult<()> {
        std::fs::write(path, text).map_err(|e| HostError::Failed(format!("{path}: {e}")))
    }

    fn file_exists(&self, path: &str) -> bool {
        std::path::Path::new(path).exists()
    }

    fn argument(&self) -> String {
        self.argument.clone()
    }
}
