//! Interpreter configuration.

/// Tunables for one interpreter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum number of cells on the value stack (globals and all frames).
    pub stack_capacity: usize,
    /// Maximum number of arguments a user function call may pass.
    pub max_args: usize,
    /// Accept a missing `;` at the end of a line, before `}` or at the end
    /// of the program. Never applies inside control-construct headers.
    pub loose_syntax: bool,
    /// Assigning past the end of an array grows it instead of failing.
    pub expandable_arrays: bool,
    /// Largest array `newArray`, `Array.getSequence` or an expanding store
    /// may create.
    pub max_array_len: usize,
}

impl EvalConfig {
    pub const DEFAULT_STACK_CAPACITY: usize = 1000;
    pub const DEFAULT_MAX_ARGS: usize = 32;
    pub const DEFAULT_MAX_ARRAY_LEN: usize = 10_000_000;
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            stack_capacity: Self::DEFAULT_STACK_CAPACITY,
            max_args: Self::DEFAULT_MAX_ARGS,
            loose_syntax: false,
            expandable_arrays: false,
            max_array_len: Self::DEFAULT_MAX_ARRAY_LEN,
        }
    }
}
