//! Card decoding.
//!
//! A card is written in one of three ways:
//!
//! ```text
//! {"CallNative": "console_log"}              externally tagged
//! {"ty": "CallNative", "val": "console_log"} tag and value
//! "Equals"                                   bare label, payload-free cards only
//! ```

use serde_json::Value as Json;

use crate::compiler::{CompileError, Location};
use crate::program::{Card, CardId, CardKind, Target};
use crate::{String, ToString, format};

pub(super) fn parse_card(json: &Json, location: &Location) -> Result<Card, CompileError> {
    let (label, payload) = match json {
        Json::String(label) => (label.as_str(), &Json::Null),
        Json::Object(fields) if fields.contains_key("ty") => {
            let label = fields
                .get("ty")
                .and_then(Json::as_str)
                .ok_or_else(|| unknown(location, "ty"))?;
            (label, fields.get("val").unwrap_or(&Json::Null))
        }
        Json::Object(fields) if fields.len() == 1 => match fields.iter().next() {
            Some((label, payload)) => (label.as_str(), payload),
            None => return Err(unknown(location, "object")),
        },
        Json::Object(_) => return Err(unknown(location, "object")),
        other => return Err(unknown(location, json_type(other))),
    };

    let kind = CardKind::from_name(label).ok_or_else(|| unknown(location, label))?;
    decode(kind, payload, location)
}

fn decode(kind: CardKind, payload: &Json, location: &Location) -> Result<Card, CompileError> {
    let invalid = |reason: String| CompileError::invalid_card(location.clone(), kind, reason);
    let string = || {
        payload
            .as_str()
            .map(ToString::to_string)
            .ok_or_else(|| invalid(format!("expected a string, found {}", json_type(payload))))
    };
    let unit = |card: Card| {
        if payload.is_null() {
            Ok(card)
        } else {
            Err(invalid(format!("expected no payload, found {}", json_type(payload))))
        }
    };

    match kind {
        CardKind::StringLiteral => Ok(Card::StringLiteral(string()?)),
        CardKind::ScalarInt => payload
            .as_i64()
            .map(Card::ScalarInt)
            .ok_or_else(|| invalid(format!("expected an integer, found {}", json_type(payload)))),
        CardKind::ScalarNil => unit(Card::ScalarNil),
        CardKind::SetVar => Ok(Card::SetVar(string()?)),
        CardKind::ReadVar => Ok(Card::ReadVar(string()?)),
        CardKind::Equals => unit(Card::Equals),
        CardKind::CallNative => Ok(Card::CallNative(string()?)),
        CardKind::IfTrue => Ok(Card::IfTrue(target(payload).map_err(invalid)?)),
        CardKind::IfElse => {
            let branch = |name: &str| {
                payload
                    .get(name)
                    .ok_or_else(|| invalid(format!("missing `{}` target", name)))
                    .and_then(|json| target(json).map_err(invalid))
            };
            Ok(Card::IfElse {
                then: branch("then")?,
                r#else: branch("else")?,
            })
        }
        CardKind::Jump => Ok(Card::Jump(target(payload).map_err(invalid)?)),
        CardKind::Abort => unit(Card::Abort),
    }
}

fn target(json: &Json) -> Result<Target, String> {
    match json {
        Json::String(name) => Ok(Target::Lane(name.clone())),
        Json::Number(number) => number
            .as_u64()
            .and_then(|id| CardId::try_from(id).ok())
            .map(Target::Card)
            .ok_or_else(|| format!("card id {} is out of range", number)),
        other => Err(format!(
            "expected a lane name or card id, found {}",
            json_type(other)
        )),
    }
}

fn unknown(location: &Location, name: &str) -> CompileError {
    CompileError::UnknownCard {
        location: location.clone(),
        name: name.into(),
    }
}

fn json_type(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}
