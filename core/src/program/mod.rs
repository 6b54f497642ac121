//! In-memory Program Model.
//!
//! A [`Program`] is the canonical, shape-independent description of a lane
//! graph. It is what the `description` deserializer produces and what the
//! compiler consumes; it is discarded once compilation finishes.
//!
//! ```text
//! Program
//! ├── lanes: [Lane { name, arguments, cards: [Card] }]
//! ├── card_table: { legacy card id -> (lane ordinal, card index) }
//! └── imports / submodules (metadata only)
//! ```

mod card;

pub use card::{Card, CardKind, Target};

use alloc::collections::BTreeMap;

use crate::{String, Vec};

/// Numeric card identifier used by the legacy flat card table encoding.
pub type CardId = u32;

/// A named subroutine: declared parameters plus an ordered card list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Lane {
    pub name: String,
    pub arguments: Vec<String>,
    pub cards: Vec<Card>,
}

impl Lane {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            cards: Vec::new(),
        }
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cards(mut self, cards: impl IntoIterator<Item = Card>) -> Self {
        self.cards = cards.into_iter().collect();
        self
    }

    pub fn with_card(mut self, card: Card) -> Self {
        self.cards.push(card);
        self
    }
}

/// Position of a card inside a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardPosition {
    /// Ordinal of the owning lane in [`Program::lanes`].
    pub lane: usize,
    /// Index of the card inside the lane.
    pub card: usize,
}

/// A complete program description, prior to compilation.
///
/// Lanes are kept in declaration order and may contain duplicate names; it is
/// the compiler's job to reject those, so the model never silently drops a
/// lane.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub lanes: Vec<Lane>,
    /// Legacy numeric card ids, filled in by deserializers that read the flat
    /// card table encoding. Empty for canonical descriptions.
    pub card_table: BTreeMap<CardId, CardPosition>,
    pub imports: Vec<String>,
    pub submodules: Vec<String>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lane(mut self, lane: Lane) -> Self {
        self.lanes.push(lane);
        self
    }

    pub fn lane(&self, name: &str) -> Option<&Lane> {
        self.lanes.iter().find(|lane| lane.name == name)
    }

    /// Total number of cards across all lanes.
    pub fn card_count(&self) -> usize {
        self.lanes.iter().map(|lane| lane.cards.len()).sum()
    }
}
