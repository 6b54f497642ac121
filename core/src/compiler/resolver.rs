//! Name resolution.
//!
//! The resolver validates the lane graph before anything is emitted: lane
//! names are unique, argument names are unique per lane, every control
//! transfer names something that exists, and the entry lane is known.

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use super::error::{CompileError, Location};
use crate::api::CompilationOptions;
use crate::program::{CardId, CardPosition, Program, Target};

/// Name of the lane used as entry point when none is configured.
pub const DEFAULT_ENTRY_LANE: &str = "main";

/// Lane name to ordinal mapping, plus the resolved entry lane.
#[derive(Debug)]
pub struct SymbolTable<'p> {
    lanes: HashMap<&'p str, u32>,
    cards: &'p alloc::collections::BTreeMap<CardId, CardPosition>,
    entry: u32,
}

impl<'p> SymbolTable<'p> {
    pub fn lane(&self, name: &str) -> Option<u32> {
        self.lanes.get(name).copied()
    }

    /// Position of a legacy numeric card id.
    pub fn card(&self, id: CardId) -> Option<CardPosition> {
        self.cards.get(&id).copied()
    }

    pub fn entry(&self) -> u32 {
        self.entry
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

/// Build the symbol table for `program`, or report the first problem found.
pub fn resolve<'p>(
    program: &'p Program,
    options: &CompilationOptions,
) -> Result<SymbolTable<'p>, CompileError> {
    if program.lanes.is_empty() {
        return Err(CompileError::EmptyProgram);
    }
    if u32::try_from(program.lanes.len()).is_err() {
        return Err(CompileError::ProgramTooLarge);
    }

    let mut lanes = HashMap::with_capacity(program.lanes.len());
    for (ordinal, lane) in program.lanes.iter().enumerate() {
        if lanes.insert(lane.name.as_str(), ordinal as u32).is_some() {
            return Err(CompileError::DuplicateLane {
                name: lane.name.clone(),
            });
        }

        let mut seen = HashSet::with_capacity(lane.arguments.len());
        for argument in &lane.arguments {
            if !seen.insert(argument.as_str()) {
                return Err(CompileError::DuplicateArgument {
                    lane: lane.name.clone(),
                    argument: argument.clone(),
                });
            }
        }
    }

    let symbols = SymbolTable {
        lanes,
        cards: &program.card_table,
        entry: 0,
    };

    for lane in &program.lanes {
        for (index, card) in lane.cards.iter().enumerate() {
            for target in card.targets() {
                if !resolves(program, &symbols, target) {
                    return Err(CompileError::UnresolvedTarget {
                        location: Location::new(lane.name.as_str(), index),
                        target: target.clone(),
                    });
                }
            }
        }
    }

    let entry = match &options.entry_lane {
        Some(name) => symbols
            .lane(name)
            .ok_or_else(|| CompileError::MissingEntryLane { name: name.clone() })?,
        None => symbols.lane(DEFAULT_ENTRY_LANE).unwrap_or(0),
    };
    debug!(
        lanes = symbols.len(),
        entry = %program.lanes[entry as usize].name,
        "Resolved lanes"
    );

    Ok(SymbolTable { entry, ..symbols })
}

fn resolves(program: &Program, symbols: &SymbolTable<'_>, target: &Target) -> bool {
    match target {
        Target::Lane(name) => symbols.lane(name).is_some(),
        Target::Card(id) => symbols.card(*id).is_some_and(|position| {
            program
                .lanes
                .get(position.lane)
                .is_some_and(|lane| position.card < lane.cards.len())
        }),
    }
}
