//! Compilation errors.
//!
//! Compilation is all-or-nothing: the first problem found aborts it, and the
//! error names the lane and card where it was found.

use core::fmt;

use thiserror::Error;

use crate::program::{CardKind, Target};
use crate::String;

/// Where in the program description a problem was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub lane: String,
    pub card: usize,
}

impl Location {
    pub fn new(lane: impl Into<String>, card: usize) -> Self {
        Self {
            lane: lane.into(),
            card,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lane `{}`, card {}", self.lane, self.card)
    }
}

/// Errors that can occur while turning a description into a compiled program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The input could not be read as a program description.
    #[error("malformed program description at line {line}, column {column}: {message}")]
    Malformed {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("program has no lanes")]
    EmptyProgram,

    #[error("lane names must be unique, found `{name}` more than once")]
    DuplicateLane { name: String },

    #[error("argument `{argument}` is declared more than once in lane `{lane}`")]
    DuplicateArgument { lane: String, argument: String },

    #[error("{location}: {target} does not exist")]
    UnresolvedTarget { location: Location, target: Target },

    #[error("entry lane `{name}` does not exist")]
    MissingEntryLane { name: String },

    /// A card whose payload does not fit its kind.
    #[error("{location}: invalid {kind} card: {reason}")]
    InvalidCard {
        location: Location,
        kind: CardKind,
        reason: String,
    },

    /// A card label that is not part of the language.
    #[error("{location}: unknown card kind `{name}`")]
    UnknownCard { location: Location, name: String },

    #[error("program does not fit in 32-bit instruction offsets")]
    ProgramTooLarge,
}

/// Coarse classification of a [`CompileError`], for hosts that only need to
/// know which class of failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileStatus {
    Malformed,
    UnresolvedTarget,
    DuplicateLane,
    InvalidStructure,
}

impl CompileError {
    pub fn status(&self) -> CompileStatus {
        match self {
            CompileError::Malformed { .. } => CompileStatus::Malformed,
            CompileError::UnresolvedTarget { .. } | CompileError::MissingEntryLane { .. } => {
                CompileStatus::UnresolvedTarget
            }
            CompileError::DuplicateLane { .. } => CompileStatus::DuplicateLane,
            CompileError::EmptyProgram
            | CompileError::DuplicateArgument { .. }
            | CompileError::InvalidCard { .. }
            | CompileError::UnknownCard { .. }
            | CompileError::ProgramTooLarge => CompileStatus::InvalidStructure,
        }
    }

    /// The lane and card the error refers to, if it refers to a single card.
    pub fn location(&self) -> Option<&Location> {
        match self {
            CompileError::UnresolvedTarget { location, .. }
            | CompileError::InvalidCard { location, .. }
            | CompileError::UnknownCard { location, .. } => Some(location),
            _ => None,
        }
    }

    pub(crate) fn invalid_card(
        location: Location,
        kind: CardKind,
        reason: impl Into<String>,
    ) -> Self {
        CompileError::InvalidCard {
            location,
            kind,
            reason: reason.into(),
        }
    }
}
