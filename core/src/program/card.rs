use core::fmt;

use super::CardId;
use crate::String;

/// Reference to a control transfer destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    /// Entry of the lane with the given name.
    Lane(String),
    /// Legacy encoding: a card in the flat card table.
    Card(CardId),
}

impl Target {
    pub fn lane(name: impl Into<String>) -> Self {
        Target::Lane(name.into())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Lane(name) => write!(f, "lane `{}`", name),
            Target::Card(id) => write!(f, "card #{}", id),
        }
    }
}

/// One instruction of the source language.
///
/// The set of cards is closed: every consumer matches exhaustively, so adding
/// a card kind is a compile error everywhere it has to be handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Card {
    StringLiteral(String),
    ScalarInt(i64),
    ScalarNil,
    SetVar(String),
    ReadVar(String),
    /// Pops two values, pushes whether they are equal.
    Equals,
    CallNative(String),
    IfTrue(Target),
    IfElse { then: Target, r#else: Target },
    Jump(Target),
    Abort,
}

impl Card {
    pub fn string(value: impl Into<String>) -> Self {
        Card::StringLiteral(value.into())
    }

    pub fn set_var(name: impl Into<String>) -> Self {
        Card::SetVar(name.into())
    }

    pub fn read_var(name: impl Into<String>) -> Self {
        Card::ReadVar(name.into())
    }

    pub fn call_native(name: impl Into<String>) -> Self {
        Card::CallNative(name.into())
    }

    pub fn jump(lane: impl Into<String>) -> Self {
        Card::Jump(Target::lane(lane))
    }

    pub fn if_true(lane: impl Into<String>) -> Self {
        Card::IfTrue(Target::lane(lane))
    }

    pub fn if_else(then: impl Into<String>, r#else: impl Into<String>) -> Self {
        Card::IfElse {
            then: Target::lane(then),
            r#else: Target::lane(r#else),
        }
    }

    pub fn kind(&self) -> CardKind {
        match self {
            Card::StringLiteral(_) => CardKind::StringLiteral,
            Card::ScalarInt(_) => CardKind::ScalarInt,
            Card::ScalarNil => CardKind::ScalarNil,
            Card::SetVar(_) => CardKind::SetVar,
            Card::ReadVar(_) => CardKind::ReadVar,
            Card::Equals => CardKind::Equals,
            Card::CallNative(_) => CardKind::CallNative,
            Card::IfTrue(_) => CardKind::IfTrue,
            Card::IfElse { .. } => CardKind::IfElse,
            Card::Jump(_) => CardKind::Jump,
            Card::Abort => CardKind::Abort,
        }
    }

    /// Control transfer destinations referenced by this card, in order.
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        let (first, second) = match self {
            Card::IfTrue(target) | Card::Jump(target) => (Some(target), None),
            Card::IfElse { then, r#else } => (Some(then), Some(r#else)),
            _ => (None, None),
        };
        first.into_iter().chain(second)
    }
}

/// Payload-free label of a [`Card`], as written in program descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    StringLiteral,
    ScalarInt,
    ScalarNil,
    SetVar,
    ReadVar,
    Equals,
    CallNative,
    IfTrue,
    IfElse,
    Jump,
    Abort,
}

impl CardKind {
    pub const ALL: [CardKind; 11] = [
        CardKind::StringLiteral,
        CardKind::ScalarInt,
        CardKind::ScalarNil,
        CardKind::SetVar,
        CardKind::ReadVar,
        CardKind::Equals,
        CardKind::CallNative,
        CardKind::IfTrue,
        CardKind::IfElse,
        CardKind::Jump,
        CardKind::Abort,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CardKind::StringLiteral => "StringLiteral",
            CardKind::ScalarInt => "ScalarInt",
            CardKind::ScalarNil => "ScalarNil",
            CardKind::SetVar => "SetVar",
            CardKind::ReadVar => "ReadVar",
            CardKind::Equals => "Equals",
            CardKind::CallNative => "CallNative",
            CardKind::IfTrue => "IfTrue",
            CardKind::IfElse => "IfElse",
            CardKind::Jump => "Jump",
            CardKind::Abort => "Abort",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
