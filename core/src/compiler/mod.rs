//! Compiler from the Program Model to VM bytecode.
//!
//! Compilation runs in two passes over the lane graph:
//!
//! - [`resolve`] builds the symbol table and rejects anything that cannot be
//!   linked (duplicate lanes, dangling targets, a missing entry lane)
//! - [`Encoder`] lays the lanes out back to back and emits one instruction per
//!   card, followed by a `Return` per lane
//!
//! Either pass may fail; nothing is produced unless both succeed.

mod encoder;
mod error;
mod resolver;


pub use encoder::Encoder;
pub use error::{CompileError, CompileStatus, Location};
pub use resolver::{DEFAULT_ENTRY_LANE, SymbolTable, resolve};

use tracing::debug;

use crate::api::CompilationOptions;
use crate::program::Program;
use crate::vm::CompiledProgram;

/// Compile a program description into an executable program.
pub fn compile(
    program: &Program,
    options: &CompilationOptions,
) -> Result<CompiledProgram, CompileError> {
    debug!(
        lanes = program.lanes.len(),
        cards = program.card_count(),
        "Compiling program"
    );

    let symbols = resolve(program, options)?;
    let compiled = Encoder::new(program, &symbols).encode()?;

    debug!(
        instructions = compiled.instructions().len(),
        constants = compiled.constants().len(),
        "Compiled program"
    );
    Ok(compiled)
}
