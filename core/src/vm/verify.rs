//! Verification of compiled programs loaded from bytes.
//!
//! Programs produced by the compiler are correct by construction. Programs
//! read back from an artifact are not, so every table and operand is checked
//! for consistency before the VM is allowed to see them:
//! - container checks: entry lane, lane ranges tile the instruction stream
//! - operand checks: constant indices, name operands are strings, jump
//!   targets land inside the lane they claim

use thiserror::Error;

use super::instruction_set::{Instruction, JumpTarget};
use super::program::{CompiledProgram, Constant};
use crate::String;

/// Errors raised while encoding, decoding or verifying a compiled artifact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("failed to encode compiled program: {message}")]
    Encode { message: String },

    #[error("failed to decode compiled program: {message}")]
    Decode { message: String },

    #[error("compiled program has no lanes")]
    NoLanes,

    #[error("entry lane #{entry} does not exist")]
    EntryOutOfRange { entry: u32 },

    /// Lanes must be laid out back to back, in order, covering every instruction.
    #[error("lane #{lane} does not start where the previous lane ends")]
    LaneLayout { lane: u32 },

    #[error("lane #{lane} does not end with a return")]
    MissingReturn { lane: u32 },

    #[error("instruction {offset} refers to missing constant #{index}")]
    ConstantOutOfRange { offset: u32, index: u32 },

    #[error("instruction {offset} uses constant #{index}, which has the wrong kind")]
    ConstantKind { offset: u32, index: u32 },

    #[error("instruction {offset} jumps outside its target lane")]
    BadTarget { offset: u32 },

    #[error("lane #{lane} declares an argument that is not a string constant")]
    BadArgument { lane: u32 },
}

/// Check every structural invariant the VM relies on.
pub fn verify(program: &CompiledProgram) -> Result<(), LoadError> {
    if program.lanes.is_empty() {
        return Err(LoadError::NoLanes);
    }
    if program.lane_info(program.entry).is_none() {
        return Err(LoadError::EntryOutOfRange {
            entry: program.entry,
        });
    }

    let mut next_entry: u64 = 0;
    for (ordinal, lane) in program.lanes.iter().enumerate() {
        let ordinal = ordinal as u32;
        if u64::from(lane.entry) != next_entry || lane.len == 0 {
            return Err(LoadError::LaneLayout { lane: ordinal });
        }
        next_entry += u64::from(lane.len);

        let last = u64::from(lane.entry) + u64::from(lane.len) - 1;
        match program.instructions.get(last as usize) {
            Some(Instruction::Return) => {}
            _ => return Err(LoadError::MissingReturn { lane: ordinal }),
        }

        for &argument in &lane.arguments {
            if !matches!(program.constant(argument), Some(Constant::Str(_))) {
                return Err(LoadError::BadArgument { lane: ordinal });
            }
        }
    }
    if next_entry != program.instructions.len() as u64 {
        return Err(LoadError::LaneLayout {
            lane: program.lanes.len() as u32,
        });
    }

    for (offset, instruction) in program.instructions.iter().enumerate() {
        let offset = offset as u32;
        verify_operands(program, offset, instruction)?;
    }

    Ok(())
}

fn verify_operands(
    program: &CompiledProgram,
    offset: u32,
    instruction: &Instruction,
) -> Result<(), LoadError> {
    if let Some(index) = instruction.constant() {
        let constant = program
            .constant(index)
            .ok_or(LoadError::ConstantOutOfRange { offset, index })?;
        let kind_matches = match (instruction, constant) {
            (Instruction::ScalarInt(_), constant) => matches!(constant, Constant::Int(_)),
            (_, constant) => matches!(constant, Constant::Str(_)),
        };
        if !kind_matches {
            return Err(LoadError::ConstantKind { offset, index });
        }
    }

    for JumpTarget { offset: to, lane } in instruction.targets() {
        let in_lane = program
            .lane_info(lane)
            .is_some_and(|info| info.contains(to));
        if !in_lane {
            return Err(LoadError::BadTarget { offset });
        }
    }

    Ok(())
}
