//! Native stack growth for recursive evaluation.
//!
//! User function calls and nested expressions re-enter the evaluator. The
//! value stack bounds how deep a macro may recurse; this keeps the native
//! stack from running out first, so the bound surfaces as a "Stack overflow"
//! diagnostic rather than a crash.

/// Grow the stack when less than this remains.
#[cfg(not(target_arch = "wasm32"))]
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
#[cfg(not(target_arch = "wasm32"))]
const SEGMENT: usize = 2 * 1024 * 1024;

/// Run `f`, first moving to a fresh stack segment if the current one is
/// nearly exhausted. A plain call on wasm.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    #[cfg(not(target_arch = "wasm32"))]
    {
        stacker::maybe_grow(RED_ZONE, SEGMENT, f)
    }
    #[cfg(target_arch = "wasm32")]
    {
        f()
    }
}
