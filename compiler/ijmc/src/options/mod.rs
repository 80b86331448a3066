//! Flags of `ijm run`.

use ijm_eval::EvalConfig;


/// Everything `ijm run` was asked to do.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunOptions {
    pub config: EvalConfig,
    /// Run this macro instead of the program from the top.
    pub macro_name: Option<String>,
    /// Value returned by `getArgument()`.
    pub argument: String,
    /// Attach the line tracer.
    pub trace: bool,
    /// Run the files concurrently, one interpreter each.
    pub parallel: bool,
    pub files: Vec<String>,
}

/// A flag `ijm run` does not understand.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("unknown option '{0}'")]
    Unknown(String),
    #[error("invalid value '{value}' for {flag}")]
    BadValue { flag: &'static str, value: String },
    #[error("missing file path")]
    NoFiles,
}

/// Parse the arguments following `ijm run`.
///
/// Flags and file paths may be mixed in any order.
pub fn parse_run_options(args: &[String]) -> Result<RunOptions, OptionError> {
    let mut options = RunOptions::default();
    for arg in args {
        if let Some(value) = arg.strip_prefix("--stack=") {
            options.config.stack_capacity = positive("--stack", value)?;
        } else if let Some(value) = arg.strip_prefix("--max-args=") {
            options.config.max_args = positive("--max-args", value)?;
        } else if let Some(name) = arg.strip_prefix("--macro=") {
            options.macro_name = Some(name.to_string());
        } else if let Some(text) = arg.strip_prefix("--arg=") {
            options.argument = text.to_string();
        } else {
            match arg.as_str() {
                "--loose" => options.config.loose_syntax = true,
                "--expandable-arrays" => options.config.expandable_arrays = true,
                "--trace" => options.trace = true,
                "--parallel" | "-j" => options.parallel = true,
                flag if flag.starts_with('-') => return Err(OptionError::Unknown(flag.to_string())),
                path => options.files.push(path.to_string()),
            }
        }
    }
    if options.files.is_empty() {
        return Err(OptionError::NoFiles);
    }
    Ok(options)
}

fn positive(flag: &'static str, value: &str) -> Result<usize, OptionError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(OptionError::BadValue {
            flag,
            value: value.to_string(),
        }),
    }
}
