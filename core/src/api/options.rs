//! Configuration options for the Lanes engine.

use crate::String;

/// Configuration options for compilation.
///
/// # Example
///
/// ```
/// use lanes_core::api::CompilationOptions;
///
/// let options = CompilationOptions::default().with_entry_lane("start");
/// assert_eq!(options.entry_lane.as_deref(), Some("start"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationOptions {
    /// Lane execution starts in.
    ///
    /// When unset, a lane named `main` is used if there is one, otherwise
    /// the first declared lane.
    pub entry_lane: Option<String>,
}

impl CompilationOptions {
    pub fn with_entry_lane(mut self, name: impl Into<String>) -> Self {
        self.entry_lane = Some(name.into());
        self
    }
}

/// Configuration options for program execution.
///
/// These options control resource limits during a run.
///
/// # Example
///
/// ```
/// use lanes_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions {
///     max_instructions: Some(10_000),
///     ..ExecutionOptions::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Maximum number of nested lane calls, counting the entry lane.
    ///
    /// Default: 256
    pub max_call_depth: usize,

    /// Maximum number of values on the operand stack.
    ///
    /// Default: 1024
    pub max_stack_size: usize,

    /// Maximum number of instructions executed per run (if Some).
    ///
    /// Programs may loop forever through jumps; set this for untrusted input.
    ///
    /// Default: None
    pub max_instructions: Option<u64>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
            max_stack_size: 1024,
            max_instructions: None,
        }
    }
}

/// Configuration options for the Lanes engine.
///
/// These options set the defaults for compilation and execution,
/// which can be overridden on a per-call basis.
///
/// # Example
///
/// ```
/// use lanes_core::api::{EngineOptions, CompilationOptions, ExecutionOptions};
///
/// let options = EngineOptions {
///     default_compilation_options: CompilationOptions::default(),
///     default_execution_options: ExecutionOptions {
///         max_call_depth: 64,
///         ..ExecutionOptions::default()
///     },
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Default options for compilation.
    ///
    /// These can be overridden when calling `Engine::compile_with()`.
    pub default_compilation_options: CompilationOptions,

    /// Default options for execution.
    ///
    /// These can be overridden when calling `Engine::run_with()`.
    pub default_execution_options: ExecutionOptions,
}
