//! Lanes - an embeddable lane/card scripting engine
//!
//! # Overview
//!
//! A Lanes program is a set of named *lanes*, each an ordered list of
//! *cards*. Cards push literals, bind and read variables, compare values,
//! call host functions and transfer control to other lanes. Programs are
//! written as JSON, compiled once into an immutable [`CompiledProgram`], and
//! then executed any number of times by a [`Vm`].
//!
//! # Quick Start
//!
//! ```
//! use lanes::{Engine, EngineOptions, Outcome, Value};
//!
//! let engine = Engine::new(EngineOptions::default(), |natives| {
//!     natives.register("console_log", 1, |args: &[Value]| {
//!         println!("{}", args[0]);
//!         Ok(None)
//!     });
//! });
//!
//! let program = engine
//!     .compile(br#"{"lanes": {"main": {"cards": [
//!         {"StringLiteral": "hello"},
//!         {"CallNative": "console_log"}
//!     ]}}}"#)
//!     .unwrap();
//!
//! assert_eq!(engine.run(&program), Ok(Outcome::Finished));
//! ```
//!
//! # Sharing compiled programs
//!
//! A [`CompiledProgram`] is never mutated after compilation. Wrap it in an
//! `Arc` to run it from several threads, each with its own [`Vm`].

// Re-export public API from lanes_core
pub use lanes_core::api::{
    CompilationOptions, Engine, EngineOptions, Error, ExecutionOptions, compile,
};

pub use lanes_core::compiler::{CompileError, CompileStatus, Location};
pub use lanes_core::description;
pub use lanes_core::program::{self, Card, CardKind, Lane, Program, Target};

// Re-export commonly used types and values
pub use lanes_core::values::{
    self, Function, NativeError, NativeFunction, NativeRegistry, NativeResult, Value, ValueKind,
};
pub use lanes_core::vm::{
    self, CompiledProgram, ExecutionError, LoadError, Outcome, ResourceExceededError,
    RuntimeError, Vm,
};

mod error_renderer;
pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
