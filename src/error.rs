use thiserror::Error;

use crate::grid::Vec2;

/// Fatal generation failures. None of these carry a partial result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenError {
    #[error("grid size {size} is too small for a loop with padding {padding}")]
    Configuration { size: usize, padding: usize },
    #[error("loop start {start} has no adjacent floor cell")]
    IsolatedStart { start: Vec2 },
    #[error("no cell with value {needle} within {runs} spiral runs of {origin}")]
    SearchBoundExceeded { origin: Vec2, needle: i32, runs: usize },
    #[error("malformed loop: no closed path of at least {min_len} cells after {attempts} attempts")]
    MalformedLoop { attempts: usize, min_len: usize },
    #[error("operand has {got} cells, grid has {expected}")]
    OperandSize { expected: usize, got: usize },
}
