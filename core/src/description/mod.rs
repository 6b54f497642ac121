//! JSON program descriptions.
//!
//! Reads every accepted encoding of a lane program and normalizes it into a
//! single [`Program`]. The compiler never sees the input shape.
//!
//! ## Canonical encoding
//!
//! ```json
//! {
//!   "lanes": {
//!     "main": { "arguments": [], "cards": [{ "StringLiteral": "x" }, { "Jump": "log" }] },
//!     "log":  { "arguments": [], "cards": [{ "CallNative": "console_log" }] }
//!   }
//! }
//! ```
//!
//! ## Legacy encodings
//!
//! - Lanes as a list, either `[{"name": "main", ...}]` or
//!   `[["main", {...}]]`. A listed lane without a name is named after its
//!   position.
//! - A flat `"cards"` table keyed by numeric id, with lanes listing ids
//!   instead of cards. Control transfers may then target a card id. Cards of
//!   the table that no lane lists become one-card lanes named `@<id>`, so
//!   they can still be jumped to. A `#<n>` suffix keeps that name clear of
//!   the declared lanes.
//! - Cards written as `{"ty": <kind>, "val": <payload>}`.
//!
//! `imports` and `submodules` are carried along as metadata.

mod card;
mod raw;


use alloc::collections::BTreeMap;

use hashbrown::HashSet;
use tracing::debug;

use self::raw::RawProgram;
use crate::compiler::{CompileError, Location};
use crate::program::{CardId, CardPosition, Lane, Program, Target};
use crate::{String, ToString, format};

/// Read a program description from raw bytes.
pub fn from_slice(bytes: &[u8]) -> Result<Program, CompileError> {
    let raw: RawProgram = serde_json::from_slice(bytes).map_err(malformed)?;
    build(raw)
}

/// Read a program description from a string.
pub fn from_str(text: &str) -> Result<Program, CompileError> {
    from_slice(text.as_bytes())
}

fn malformed(err: serde_json::Error) -> CompileError {
    let (line, column) = (err.line(), err.column());
    let message = err.to_string();
    let suffix = format!(" at line {} column {}", line, column);
    let message = match message.strip_suffix(suffix.as_str()) {
        Some(stripped) => stripped.to_string(),
        None => message,
    };
    CompileError::Malformed {
        message,
        line,
        column,
    }
}

fn build(raw: RawProgram) -> Result<Program, CompileError> {
    // Later duplicates of a card id replace earlier ones.
    let mut table: BTreeMap<CardId, serde_json::Value> = raw.cards.0.into_iter().collect();

    let mut program = Program {
        imports: raw.imports,
        submodules: raw.submodules.0,
        ..Program::default()
    };

    for (ordinal, raw_lane) in raw.lanes.0.into_iter().enumerate() {
        let name = raw_lane.name.unwrap_or_else(|| ordinal.to_string());
        let mut lane = Lane::new(name).with_arguments(raw_lane.arguments);

        for (index, json) in raw_lane.cards.iter().enumerate() {
            let location = Location::new(lane.name.as_str(), index);
            let card = match card_reference(json) {
                Some(id) => {
                    let json = table.get(&id).ok_or_else(|| CompileError::UnresolvedTarget {
                        location: location.clone(),
                        target: Target::Card(id),
                    })?;
                    let card = card::parse_card(json, &location)?;
                    program.card_table.entry(id).or_insert(CardPosition {
                        lane: ordinal,
                        card: index,
                    });
                    card
                }
                None => card::parse_card(json, &location)?,
            };
            lane.cards.push(card);
        }
        program.lanes.push(lane);
    }

    // Cards of the table that no lane placed. Without any declared lane the
    // program is empty, whatever its table holds.
    table.retain(|id, _| !program.card_table.contains_key(id));
    if program.lanes.is_empty() {
        table.clear();
    }
    let mut taken: HashSet<String> = program.lanes.iter().map(|lane| lane.name.clone()).collect();
    for (id, json) in table {
        let name = floating_lane_name(id, &taken);
        taken.insert(name.clone());
        let card = card::parse_card(&json, &Location::new(name.as_str(), 0))?;
        program.card_table.insert(
            id,
            CardPosition {
                lane: program.lanes.len(),
                card: 0,
            },
        );
        program.lanes.push(Lane::new(name).with_card(card));
    }

    debug!(
        lanes = program.lanes.len(),
        cards = program.card_count(),
        legacy_ids = program.card_table.len(),
        "Read program description"
    );
    Ok(program)
}

/// `@<id>`, suffixed with `#<n>` when a lane of that name already exists.
fn floating_lane_name(id: CardId, taken: &HashSet<String>) -> String {
    let base = format!("@{}", id);
    let mut name = base.clone();
    let mut suffix = 1;
    while taken.contains(&name) {
        name = format!("{}#{}", base, suffix);
        suffix += 1;
    }
    name
}

/// A lane entry that is a number refers to the flat card table.
fn card_reference(json: &serde_json::Value) -> Option<CardId> {
    json.as_u64().and_then(|id| CardId::try_from(id).ok())
}

/// Convenience for hosts holding a `String`.
impl core::str::FromStr for Program {
    type Err = CompileError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        crate::description::from_str(text)
    }
}
