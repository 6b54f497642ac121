//! The Lanes compilation engine.

use super::{CompilationOptions, EngineOptions, Error, ExecutionOptions};
use crate::values::NativeRegistry;
use crate::vm::{CompiledProgram, Outcome, Vm};

/// Compiler front end plus the host's native functions.
///
/// # Lifetimes
///
/// - `'f`: Lifetime of host state borrowed by registered native functions.
///
/// # Example
///
/// ```
/// use lanes_core::api::{Engine, EngineOptions};
/// use lanes_core::values::Value;
/// use lanes_core::vm::Outcome;
///
/// let engine = Engine::new(EngineOptions::default(), |natives| {
///     natives.register("double", 1, |args: &[Value]| {
///         Ok(args[0].as_int().map(|i| Value::Int(i * 2)))
///     });
/// });
///
/// let program = engine
///     .compile(br#"{"lanes": {"main": {"cards": [{"ScalarInt": 21}, {"CallNative": "double"}]}}}"#)
///     .unwrap();
///
/// let mut vm = engine.vm();
/// assert_eq!(vm.run(&program), Ok(Outcome::Finished));
/// assert_eq!(vm.stack(), &[Value::Int(42)]);
/// ```
pub struct Engine<'f> {
    natives: NativeRegistry<'f>,
    options: EngineOptions,
}

impl<'f> Engine<'f> {
    /// Create a new engine, registering native functions with `init`.
    pub fn new(options: EngineOptions, init: impl FnOnce(&mut NativeRegistry<'f>)) -> Self {
        let mut natives = NativeRegistry::new();
        init(&mut natives);
        Self { natives, options }
    }

    pub fn natives(&self) -> &NativeRegistry<'f> {
        &self.natives
    }

    /// Access the engine options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Compile a JSON program description with the default compilation options.
    pub fn compile(&self, source: &[u8]) -> Result<CompiledProgram, Error> {
        self.compile_with(source, &self.options.default_compilation_options)
    }

    pub fn compile_with(
        &self,
        source: &[u8],
        options: &CompilationOptions,
    ) -> Result<CompiledProgram, Error> {
        Ok(super::compile(source, options)?)
    }

    /// A fresh VM wired to this engine's natives and default execution options.
    pub fn vm(&self) -> Vm<'_> {
        Vm::with_options(&self.natives, self.options.default_execution_options.clone())
    }

    /// Run `program` to completion on a fresh VM.
    pub fn run(&self, program: &CompiledProgram) -> Result<Outcome, Error> {
        Ok(self.vm().run(program)?)
    }

    pub fn run_with(
        &self,
        program: &CompiledProgram,
        options: ExecutionOptions,
    ) -> Result<Outcome, Error> {
        Ok(Vm::with_options(&self.natives, options).run(program)?)
    }
}
