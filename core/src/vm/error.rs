//! Runtime errors.
//!
//! # Error Categories
//!
//! - **Runtime errors**: the running program did something the VM cannot
//!   execute, such as reading an unbound variable or comparing a string with
//!   an integer. The run terminates and the error names what happened.
//!
//! - **Resource exceeded errors**: the program outgrew a limit configured in
//!   [`ExecutionOptions`](crate::api::ExecutionOptions). These are kept apart
//!   so hosts can tell a misbehaving program from a runaway one.

use ecow::EcoString;
use thiserror::Error;

use crate::values::{NativeError, ValueKind};

/// Why a run terminated without finishing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    ResourceExceeded(#[from] ResourceExceededError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// An instruction needed more operands than the stack held.
    #[error("instruction {offset} needs {needed} value(s) but the stack holds {available}")]
    StackUnderflow {
        offset: u32,
        needed: usize,
        available: usize,
    },

    #[error("variable `{name}` is not defined")]
    UndefinedVariable { name: EcoString },

    #[error("cannot compare {left} with {right}")]
    TypeMismatch { left: ValueKind, right: ValueKind },

    #[error("expected a boolean condition, found {found}")]
    ExpectedBoolean { found: ValueKind },

    #[error("native function `{name}` is not registered")]
    UnknownNativeFunction { name: EcoString },

    #[error("native function `{name}` failed: {source}")]
    NativeCallFailed {
        name: EcoString,
        #[source]
        source: NativeError,
    },

    /// The instruction pointer left the instruction stream. Only reachable
    /// with programs that bypassed verification.
    #[error("no instruction at offset {offset}")]
    CorruptProgram { offset: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceExceededError {
    #[error("call stack overflow: more than {max_depth} nested lane calls")]
    CallStackOverflow { max_depth: usize },

    #[error("operand stack overflow: more than {max_size} values")]
    OperandStackOverflow { max_size: usize },

    #[error("instruction limit of {limit} reached")]
    InstructionLimit { limit: u64 },
}

/// How a run that did not fail came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The entry lane returned.
    Finished,
    /// An `Abort` card was executed.
    Aborted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err: ExecutionError = RuntimeError::UndefinedVariable { name: "x".into() }.into();
        assert_eq!(err.to_string(), "variable `x` is not defined");

        let err: ExecutionError = ResourceExceededError::CallStackOverflow { max_depth: 8 }.into();
        assert_eq!(
            err.to_string(),
            "call stack overflow: more than 8 nested lane calls"
        );
    }

    #[test]
    fn test_native_failure_keeps_source() {
        use core::error::Error as _;

        let err = RuntimeError::NativeCallFailed {
            name: "move".into(),
            source: NativeError::new("blocked"),
        };
        assert_eq!(err.to_string(), "native function `move` failed: blocked");
        assert_eq!(err.source().map(|s| s.to_string()).as_deref(), Some("blocked"));
    }
}
