//! Public error type for the Lanes API.
//!
//! Each stage keeps its own detailed error type; this enum only tags which
//! stage failed so hosts can use `?` across all of them.

use thiserror::Error;

use crate::compiler::CompileError;
use crate::vm::{ExecutionError, LoadError};

/// Public error type for all Lanes operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The description could not be read or compiled.
    #[error(transparent)]
    Compilation(#[from] CompileError),

    /// A compiled artifact could not be encoded, decoded or verified.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The run terminated with a runtime error or exceeded a limit.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
