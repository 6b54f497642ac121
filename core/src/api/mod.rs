//! Public API for the Lanes scripting engine.
//!
//! The pipeline is: JSON bytes → [`Program`](crate::program::Program) →
//! [`CompiledProgram`] → [`Vm::run`](crate::vm::Vm::run).
//!
//! # Example
//!
//! ```
//! use lanes_core::api::{compile, CompilationOptions};
//! use lanes_core::values::{NativeRegistry, Value};
//! use lanes_core::vm::{Outcome, Vm};
//! use std::cell::RefCell;
//!
//! let source = br#"{"lanes": {"main": {"cards": [
//!     {"StringLiteral": "x"},
//!     {"CallNative": "console_log"}
//! ]}}}"#;
//! let program = compile(source, &CompilationOptions::default()).unwrap();
//!
//! let printed = RefCell::new(Vec::new());
//! let mut natives = NativeRegistry::new();
//! natives.register("console_log", 1, |args: &[Value]| {
//!     printed.borrow_mut().push(args[0].to_string());
//!     Ok(None)
//! });
//!
//! let mut vm = Vm::new(&natives);
//! assert_eq!(vm.run(&program), Ok(Outcome::Finished));
//! assert_eq!(*printed.borrow(), ["x"]);
//! ```

pub mod engine;
pub mod error;
pub mod options;

pub use engine::Engine;
pub use error::Error;
pub use options::{CompilationOptions, EngineOptions, ExecutionOptions};

use crate::compiler::{self, CompileError};
use crate::vm::CompiledProgram;

/// Compile a JSON program description.
///
/// Compilation is all-or-nothing: on error nothing is produced.
pub fn compile(
    source: &[u8],
    options: &CompilationOptions,
) -> Result<CompiledProgram, CompileError> {
    let program = crate::description::from_slice(source)?;
    compiler::compile(&program, options)
}
