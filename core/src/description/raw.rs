//! Serde shapes of the accepted JSON encodings.
//!
//! These types mirror the input as closely as possible and defer all
//! validation of cards to the conversion step, which knows the lane and card
//! position to report.

use core::fmt;
use core::marker::PhantomData;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::program::CardId;
use crate::{String, Vec};

#[derive(Debug, Default, serde::Deserialize)]
pub(super) struct RawProgram {
    #[serde(default, alias = "functions")]
    pub lanes: RawLanes,
    /// Legacy flat card table.
    #[serde(default)]
    pub cards: Entries<CardId, serde_json::Value>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub submodules: Names,
}

#[derive(Debug, Default, serde::Deserialize)]
pub(super) struct RawLane {
    /// Only used by the list encoding; in the keyed encoding the key wins.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Vec<String>,
    /// Inline cards, or legacy card ids.
    #[serde(default)]
    pub cards: Vec<serde_json::Value>,
}

/// Lanes in declaration order, duplicates included.
#[derive(Debug, Default)]
pub(super) struct RawLanes(pub Vec<RawLane>);

/// One element of the list encoding of lanes.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ListedLane {
    Pair(String, RawLane),
    Named(RawLane),
}

impl<'de> Deserialize<'de> for RawLanes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LanesVisitor;

        impl<'de> Visitor<'de> for LanesVisitor {
            type Value = RawLanes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of lanes keyed by name, or a list of lanes")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawLanes, A::Error> {
                let mut lanes = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, mut lane)) = map.next_entry::<String, RawLane>()? {
                    lane.name = Some(name);
                    lanes.push(lane);
                }
                Ok(RawLanes(lanes))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<RawLanes, A::Error> {
                let mut lanes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(listed) = seq.next_element::<ListedLane>()? {
                    lanes.push(match listed {
                        ListedLane::Pair(name, mut lane) => {
                            lane.name = Some(name);
                            lane
                        }
                        ListedLane::Named(lane) => lane,
                    });
                }
                Ok(RawLanes(lanes))
            }
        }

        deserializer.deserialize_any(LanesVisitor)
    }
}

/// Map entries in input order, duplicates included.
#[derive(Debug)]
pub(super) struct Entries<K, V>(pub Vec<(K, V)>);

impl<K, V> Default for Entries<K, V> {
    fn default() -> Self {
        Entries(Vec::new())
    }
}

impl<'de, K, V> Deserialize<'de> for Entries<K, V>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for EntriesVisitor<K, V>
        where
            K: Deserialize<'de>,
            V: Deserialize<'de>,
        {
            type Value = Entries<K, V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Names of a keyed collection whose contents are not needed.
///
/// Accepts an object (its keys), a list of names, or a list of
/// `[name, value]` pairs.
#[derive(Debug, Default)]
pub(super) struct Names(pub Vec<String>);

impl<'de> Deserialize<'de> for Names {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NamesVisitor;

        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Named {
            Name(String),
            Pair(String, de::IgnoredAny),
        }

        impl<'de> Visitor<'de> for NamesVisitor {
            type Value = Names;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object or a list of names")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Names, A::Error> {
                let mut names = Vec::new();
                while let Some((name, _)) = map.next_entry::<String, de::IgnoredAny>()? {
                    names.push(name);
                }
                Ok(Names(names))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Names, A::Error> {
                let mut names = Vec::new();
                while let Some(named) = seq.next_element::<Named>()? {
                    names.push(match named {
                        Named::Name(name) | Named::Pair(name, _) => name,
                    });
                }
                Ok(Names(names))
            }
        }

        deserializer.deserialize_any(NamesVisitor)
    }
}
