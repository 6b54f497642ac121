//! Bytecode representation and the virtual machine that executes it.

mod error;
mod frame;
mod instruction_set;
mod program;
mod runtime;
mod stack;
mod verify;

pub use error::{ExecutionError, Outcome, ResourceExceededError, RuntimeError};
pub use instruction_set::{ConstIndex, Instruction, JumpTarget};
pub use program::{CompiledProgram, Constant, LaneInfo};
pub use runtime::Vm;
pub use stack::{Overflow, Stack};
pub use verify::{LoadError, verify};
