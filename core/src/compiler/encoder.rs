//! Instruction emission.

use ecow::EcoString;
use tracing::debug;

use super::error::{CompileError, Location};
use super::resolver::SymbolTable;
use crate::program::{Card, CardKind, Program, Target};
use crate::vm::{CompiledProgram, ConstIndex, Constant, Instruction, JumpTarget, LaneInfo};
use crate::Vec;

/// Turns a resolved [`Program`] into a [`CompiledProgram`].
///
/// Lanes are laid out back to back in declaration order, each followed by a
/// `Return`. All entry offsets are known before the first card is emitted, so
/// jump targets are written directly without patching.
pub struct Encoder<'p, 's> {
    program: &'p Program,
    symbols: &'s SymbolTable<'p>,

    /// Entry offset of every lane, by ordinal.
    entries: Vec<u32>,

    /// Constant pool for literals and names
    constants: Vec<Constant>,

    /// Constant deduplication map: Constant -> index
    constant_map: hashbrown::HashMap<Constant, ConstIndex>,

    instructions: Vec<Instruction>,

    lanes: Vec<LaneInfo>,
}

impl<'p, 's> Encoder<'p, 's> {
    pub fn new(program: &'p Program, symbols: &'s SymbolTable<'p>) -> Self {
        Self {
            program,
            symbols,
            entries: Vec::with_capacity(program.lanes.len()),
            constants: Vec::new(),
            constant_map: hashbrown::HashMap::new(),
            instructions: Vec::with_capacity(program.card_count() + program.lanes.len()),
            lanes: Vec::with_capacity(program.lanes.len()),
        }
    }

    pub fn encode(mut self) -> Result<CompiledProgram, CompileError> {
        self.layout()?;

        let program = self.program;
        for (ordinal, lane) in program.lanes.iter().enumerate() {
            debug_assert_eq!(self.instructions.len() as u32, self.entries[ordinal]);

            let arguments = lane
                .arguments
                .iter()
                .map(|argument| self.add_constant(Constant::Str(argument.as_str().into())))
                .collect::<Result<Vec<_>, _>>()?;

            for (index, card) in lane.cards.iter().enumerate() {
                let instruction = self.encode_card(Location::new(lane.name.as_str(), index), card)?;
                self.emit(instruction);
            }
            self.emit(Instruction::Return);

            debug!(
                lane = %lane.name,
                entry = self.entries[ordinal],
                cards = lane.cards.len(),
                "Encoded lane"
            );
            self.lanes.push(LaneInfo {
                name: lane.name.as_str().into(),
                entry: self.entries[ordinal],
                len: lane.cards.len() as u32 + 1,
                arguments,
            });
        }

        Ok(CompiledProgram {
            instructions: self.instructions,
            lanes: self.lanes,
            constants: self.constants,
            entry: self.symbols.entry(),
        })
    }

    /// Assign every lane its entry offset.
    fn layout(&mut self) -> Result<(), CompileError> {
        let program = self.program;
        let mut next: u32 = 0;
        for lane in &program.lanes {
            self.entries.push(next);
            let len = u32::try_from(lane.cards.len())
                .ok()
                .and_then(|cards| cards.checked_add(1))
                .ok_or(CompileError::ProgramTooLarge)?;
            next = next.checked_add(len).ok_or(CompileError::ProgramTooLarge)?;
        }
        Ok(())
    }

    fn encode_card(&mut self, location: Location, card: &Card) -> Result<Instruction, CompileError> {
        use Instruction as I;
        Ok(match card {
            Card::StringLiteral(value) => I::StringLiteral(self.add_str(value)?),
            Card::ScalarInt(value) => I::ScalarInt(self.add_constant(Constant::Int(*value))?),
            Card::ScalarNil => I::ScalarNil,
            Card::SetVar(name) => I::SetVar(self.add_name(location, CardKind::SetVar, name)?),
            Card::ReadVar(name) => I::ReadVar(self.add_name(location, CardKind::ReadVar, name)?),
            Card::Equals => I::Equals,
            Card::CallNative(name) => {
                I::CallNative(self.add_name(location, CardKind::CallNative, name)?)
            }
            Card::IfTrue(target) => I::IfTrue(self.jump_target(&location, target)?),
            Card::IfElse { then, r#else } => I::IfElse {
                then: self.jump_target(&location, then)?,
                r#else: self.jump_target(&location, r#else)?,
            },
            Card::Jump(target) => I::Jump(self.jump_target(&location, target)?),
            Card::Abort => I::Abort,
        })
    }

    fn jump_target(&self, location: &Location, target: &Target) -> Result<JumpTarget, CompileError> {
        let unresolved = || CompileError::UnresolvedTarget {
            location: location.clone(),
            target: target.clone(),
        };
        match target {
            Target::Lane(name) => {
                let lane = self.symbols.lane(name).ok_or_else(unresolved)?;
                Ok(JumpTarget {
                    offset: self.entries[lane as usize],
                    lane,
                })
            }
            Target::Card(id) => {
                let position = self.symbols.card(*id).ok_or_else(unresolved)?;
                let entry = *self.entries.get(position.lane).ok_or_else(unresolved)?;
                Ok(JumpTarget {
                    offset: entry + position.card as u32,
                    lane: position.lane as u32,
                })
            }
        }
    }

    // === Constant Pool ===

    fn add_name(
        &mut self,
        location: Location,
        kind: CardKind,
        name: &str,
    ) -> Result<ConstIndex, CompileError> {
        if name.is_empty() {
            return Err(CompileError::invalid_card(location, kind, "name must not be empty"));
        }
        self.add_str(name)
    }

    fn add_str(&mut self, value: &str) -> Result<ConstIndex, CompileError> {
        self.add_constant(Constant::Str(EcoString::from(value)))
    }

    /// Add a constant to the pool, returning the index of an equal constant
    /// if there already is one.
    fn add_constant(&mut self, constant: Constant) -> Result<ConstIndex, CompileError> {
        if let Some(&index) = self.constant_map.get(&constant) {
            return Ok(index);
        }

        let index =
            ConstIndex::try_from(self.constants.len()).map_err(|_| CompileError::ProgramTooLarge)?;
        self.constants.push(constant.clone());
        self.constant_map.insert(constant, index);
        Ok(index)
    }

    // === Instruction Emission ===

    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }
}
