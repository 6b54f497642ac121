//! Lanes VM instructions.
//!
//! This module defines the instruction set for the stack-based virtual
//! machine. There is exactly one instruction per card, plus the implicit
//! `Return` that terminates every lane.
//!
//! # Operands
//!
//! - Literal and name operands are indices into the constant pool
//!   ([`ConstIndex`]); the literal itself never lives in the instruction.
//! - Control transfer operands are resolved [`JumpTarget`]s: an absolute
//!   offset into the instruction stream plus the ordinal of the lane that owns
//!   that offset. Jumps never distinguish "same lane" from "other lane": every
//!   transfer is a lane call that pushes a frame.
//!
//! # Calling convention
//!
//! A lane call consumes as many operand stack values as the target lane
//! declares arguments. They bind in push order: the deepest consumed value
//! binds to the first declared argument and the top of stack binds to the
//! last one. Native calls receive their arguments in the same order.
//!
//! # Stack Discipline
//!
//! Stack effect notation: `[..., operand1, operand2] -> [..., result]`

use core::fmt;

use serde::{Deserialize, Serialize};

/// Index into [`CompiledProgram::constants`](super::CompiledProgram::constants).
pub type ConstIndex = u32;

/// Resolved destination of a control transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JumpTarget {
    /// Absolute instruction offset execution continues at.
    pub offset: u32,
    /// Ordinal of the lane owning `offset`; its arguments are bound on entry.
    pub lane: u32,
}

/// A single VM instruction.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    // ========================================================================
    // Literals
    // ========================================================================
    /// Push a string constant
    /// Operand: constant index | Stack: [...] -> [..., str]
    StringLiteral(ConstIndex) = 0x01,

    /// Push an integer constant
    /// Operand: constant index | Stack: [...] -> [..., int]
    ScalarInt(ConstIndex) = 0x02,

    /// Push nil
    /// Stack: [...] -> [..., nil]
    ScalarNil = 0x03,

    // ========================================================================
    // Variables
    // ========================================================================
    /// Bind a variable in the current frame, overwriting any previous value
    /// Operand: name constant | Stack: [..., value] -> [...]
    SetVar(ConstIndex) = 0x10,

    /// Push the value bound to a variable in the current frame
    /// Operand: name constant | Stack: [...] -> [..., value]
    ///
    /// Fails with `UndefinedVariable` when the name is unbound.
    ReadVar(ConstIndex) = 0x11,

    // ========================================================================
    // Comparison
    // ========================================================================
    /// Structural equality
    /// Stack: [..., a, b] -> [..., a == b]
    ///
    /// Fails with `TypeMismatch` when the kinds cannot be compared.
    Equals = 0x20,

    // ========================================================================
    // Host calls
    // ========================================================================
    /// Call a host function looked up by name
    /// Operand: name constant | Stack: [..., a1, ..., aN] -> [..., result?]
    ///
    /// N is the arity the host declared for the function. A result is pushed
    /// only if the function returns one.
    CallNative(ConstIndex) = 0x30,

    // ========================================================================
    // Control Flow
    // ========================================================================
    /// Pop a condition and call the target lane if it is true
    /// Stack: [..., args..., cond: Bool] -> [...]
    IfTrue(JumpTarget) = 0x40,

    /// Pop a condition and call one of two lanes
    /// Stack: [..., args..., cond: Bool] -> [...]
    IfElse {
        then: JumpTarget,
        r#else: JumpTarget,
    } = 0x41,

    /// Call the target lane unconditionally
    /// Stack: [..., args...] -> [...]
    Jump(JumpTarget) = 0x42,

    /// Return to the caller's frame; ends the run when leaving the entry lane.
    /// Emitted after the last card of every lane.
    Return = 0x43,

    /// Terminate the whole run with the abort outcome.
    Abort = 0x44,
}

static_assertions::assert_eq_size!(Instruction, [u8; 20]);

impl Instruction {
    /// Control transfer targets of this instruction, in operand order.
    pub fn targets(&self) -> impl Iterator<Item = JumpTarget> {
        let (first, second) = match *self {
            Instruction::IfTrue(target) | Instruction::Jump(target) => (Some(target), None),
            Instruction::IfElse { then, r#else } => (Some(then), Some(r#else)),
            _ => (None, None),
        };
        first.into_iter().chain(second)
    }

    /// Constant pool operand of this instruction, if any.
    pub fn constant(&self) -> Option<ConstIndex> {
        match *self {
            Instruction::StringLiteral(index)
            | Instruction::ScalarInt(index)
            | Instruction::SetVar(index)
            | Instruction::ReadVar(index)
            | Instruction::CallNative(index) => Some(index),
            _ => None,
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match self {
            StringLiteral(index) => write!(f, "StringLiteral({})", index),
            ScalarInt(index) => write!(f, "ScalarInt({})", index),
            ScalarNil => write!(f, "ScalarNil"),
            SetVar(index) => write!(f, "SetVar({})", index),
            ReadVar(index) => write!(f, "ReadVar({})", index),
            Equals => write!(f, "Equals"),
            CallNative(index) => write!(f, "CallNative({})", index),
            IfTrue(target) => write!(f, "IfTrue(@{})", target.offset),
            IfElse { then, r#else } => write!(f, "IfElse(@{}, @{})", then.offset, r#else.offset),
            Jump(target) => write!(f, "Jump(@{})", target.offset),
            Return => write!(f, "Return"),
            Abort => write!(f, "Abort"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets() {
        let a = JumpTarget { offset: 3, lane: 1 };
        let b = JumpTarget { offset: 7, lane: 2 };

        assert_eq!(Instruction::Jump(a).targets().collect::<Vec<_>>(), [a]);
        assert_eq!(
            Instruction::IfElse { then: a, r#else: b }
                .targets()
                .collect::<Vec<_>>(),
            [a, b]
        );
        assert_eq!(Instruction::Equals.targets().count(), 0);
    }

    #[test]
    fn test_debug_format() {
        let target = JumpTarget { offset: 4, lane: 1 };
        assert_eq!(format!("{:?}", Instruction::CallNative(2)), "CallNative(2)");
        assert_eq!(format!("{:?}", Instruction::IfTrue(target)), "IfTrue(@4)");
    }
}
