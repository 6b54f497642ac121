use alloc::collections::BTreeMap;

use ecow::EcoString;
use serde::{Deserialize, Serialize};

use super::instruction_set::{ConstIndex, Instruction, JumpTarget};
use super::verify::{LoadError, verify};
use crate::{String, Vec, format, values::Value};

/// A literal in the constant pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Int(i64),
    Str(EcoString),
}

impl Constant {
    pub fn to_value(&self) -> Value {
        match self {
            Constant::Int(i) => Value::Int(*i),
            Constant::Str(s) => Value::Str(s.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&EcoString> {
        match self {
            Constant::Str(s) => Some(s),
            Constant::Int(_) => None,
        }
    }
}

/// Lane table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneInfo {
    pub name: EcoString,
    /// Offset of the lane's first instruction.
    pub entry: u32,
    /// Number of instructions, including the terminating `Return`.
    pub len: u32,
    /// Argument names as string constants, in declaration order.
    pub arguments: Vec<ConstIndex>,
}

impl LaneInfo {
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    pub fn contains(&self, offset: u32) -> bool {
        offset >= self.entry && offset - self.entry < self.len
    }
}

/// The immutable output of a successful compilation.
///
/// A compiled program is never mutated after construction, so it can be
/// shared by reference (or `Arc`) between any number of VM runs, including
/// runs on different threads. It is not `Clone`: the host owns
/// exactly one copy and releases it by dropping it.
#[derive(PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledProgram {
    pub(crate) instructions: Vec<Instruction>,
    pub(crate) lanes: Vec<LaneInfo>,
    pub(crate) constants: Vec<Constant>,
    pub(crate) entry: u32,
}

impl CompiledProgram {
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn lanes(&self) -> &[LaneInfo] {
        &self.lanes
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn instruction(&self, offset: u32) -> Option<&Instruction> {
        self.instructions.get(offset as usize)
    }

    pub fn constant(&self, index: ConstIndex) -> Option<&Constant> {
        self.constants.get(index as usize)
    }

    /// The string constant at `index`, or an empty string for a non-string
    /// slot. Verified programs only use string slots for names.
    pub fn name(&self, index: ConstIndex) -> EcoString {
        self.constant(index)
            .and_then(Constant::as_str)
            .cloned()
            .unwrap_or_default()
    }

    pub fn lane_info(&self, ordinal: u32) -> Option<&LaneInfo> {
        self.lanes.get(ordinal as usize)
    }

    /// Look up a lane by name.
    pub fn lane(&self, name: &str) -> Option<&LaneInfo> {
        self.lanes.iter().find(|lane| lane.name == name)
    }

    /// Ordinal of the lane execution starts in.
    pub fn entry(&self) -> u32 {
        self.entry
    }

    pub fn entry_lane(&self) -> &LaneInfo {
        &self.lanes[self.entry as usize]
    }

    /// Serialize to a compact binary artifact.
    pub fn to_bytes(&self) -> Result<Vec<u8>, LoadError> {
        postcard::to_allocvec(self).map_err(|err| LoadError::Encode {
            message: format!("{}", err),
        })
    }

    /// Load an artifact produced by [`CompiledProgram::to_bytes`].
    ///
    /// The artifact is verified before it is returned, so a corrupted or
    /// hand-crafted artifact is rejected here instead of misbehaving at run
    /// time.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let program: CompiledProgram =
            postcard::from_bytes(bytes).map_err(|err| LoadError::Decode {
                message: format!("{}", err),
            })?;
        verify(&program)?;
        Ok(program)
    }

    fn describe_target(&self, target: JumpTarget) -> String {
        match self.lane_info(target.lane) {
            Some(lane) if lane.entry == target.offset => format!("{}", lane.name),
            Some(lane) => format!("{}+{}", lane.name, target.offset - lane.entry),
            None => format!("@{}", target.offset),
        }
    }
}

impl core::fmt::Debug for CompiledProgram {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "CompiledProgram {{")?;

        match self.lane_info(self.entry) {
            Some(lane) => writeln!(f, "  entry: {}", lane.name)?,
            None => writeln!(f, "  entry: #{}", self.entry)?,
        }

        // Print constants pool
        if !self.constants.is_empty() {
            writeln!(f, "  constants: [")?;
            for (i, constant) in self.constants.iter().enumerate() {
                writeln!(f, "    [{}] = {:?}", i, constant)?;
            }
            writeln!(f, "  ]")?;
        } else {
            writeln!(f, "  constants: []")?;
        }

        // Lane labels, keyed by entry offset
        let labels: BTreeMap<u32, &LaneInfo> =
            self.lanes.iter().map(|lane| (lane.entry, lane)).collect();

        writeln!(f, "  instructions:")?;
        for (addr, instr) in self.instructions.iter().enumerate() {
            let addr = addr as u32;
            if let Some(lane) = labels.get(&addr) {
                write!(f, "  {}", lane.name)?;
                if !lane.arguments.is_empty() {
                    write!(f, "(")?;
                    for (i, arg) in lane.arguments.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", self.name(*arg))?;
                    }
                    write!(f, ")")?;
                }
                writeln!(f, ":")?;
            }

            write!(f, "    {:4}  {:?}", addr, instr)?;
            match *instr {
                Instruction::IfTrue(target) | Instruction::Jump(target) => {
                    write!(f, " (to {})", self.describe_target(target))?;
                }
                Instruction::IfElse { then, r#else } => {
                    write!(
                        f,
                        " (to {} / {})",
                        self.describe_target(then),
                        self.describe_target(r#else)
                    )?;
                }
                _ => {
                    if let Some(constant) = instr.constant().and_then(|i| self.constant(i)) {
                        match constant {
                            Constant::Int(i) => write!(f, "  ; {}", i)?,
                            Constant::Str(s) => write!(f, "  ; {:?}", s)?,
                        }
                    }
                }
            }
            writeln!(f)?;
        }

        write!(f, "}}")
    }
}
