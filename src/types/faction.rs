use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{NEUTRAL_COLOR, NEUTRAL_FACTION_NAME};

/// Opaque faction identifier. `FactionId::NEUTRAL` owns every unclaimed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactionId(pub u32);

impl FactionId {
    pub const NEUTRAL: FactionId = FactionId(0);

    pub fn is_neutral(self) -> bool {
        self == Self::NEUTRAL
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "faction#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    pub color: u32,
}

/// Name and color lookup for every faction in a match, neutral included.
///
/// Ids are dense: the neutral faction is always id 0 and playable factions
/// follow in registration order.
#[derive(Debug, Clone)]
pub struct FactionRoster {
    factions: Vec<Faction>,
}

impl FactionRoster {
    pub fn new() -> Self {
        Self {
            factions: vec![Faction {
                id: FactionId::NEUTRAL,
                name: NEUTRAL_FACTION_NAME.to_string(),
                color: NEUTRAL_COLOR,
            }],
        }
    }

    pub fn with_neutral_color(color: u32) -> Self {
        let mut roster = Self::new();
        roster.factions[0].color = color;
        roster
    }

    /// Register a playable faction. Returns `None` if the name is taken.
    pub fn register(&mut self, name: &str, color: u32) -> Option<FactionId> {
        if self.by_name(name).is_some() {
            return None;
        }
        let id = FactionId(self.factions.len() as u32);
        self.factions.push(Faction {
            id,
            name: name.to_string(),
            color,
        });
        Some(id)
    }

    pub fn get(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(id.0 as usize)
    }

    pub fn by_name(&self, name: &str) -> Option<&Faction> {
        self.factions.iter().find(|f| f.name == name)
    }

    pub fn name_of(&self, id: FactionId) -> &str {
        self.get(id).map(|f| f.name.as_str()).unwrap_or("unknown")
    }

    pub fn color_of(&self, id: FactionId) -> u32 {
        self.get(id).map(|f| f.color).unwrap_or(NEUTRAL_COLOR)
    }

    /// Playable factions, neutral excluded.
    pub fn playable(&self) -> impl Iterator<Item = &Faction> {
        self.factions.iter().skip(1)
    }

    pub fn len(&self) -> usize {
        self.factions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }
}

impl Default for FactionRoster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_is_always_first() {
        let roster = FactionRoster::new();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.name_of(FactionId::NEUTRAL), NEUTRAL_FACTION_NAME);
        assert_eq!(roster.playable().count(), 0);
    }

    #[test]
    fn register_assigns_dense_ids() {
        let mut roster = FactionRoster::new();
        let a = roster.register("georgia", 0x67ffc6).unwrap();
        let b = roster.register("armenia", 0xc22625).unwrap();
        assert_eq!(a, FactionId(1));
        assert_eq!(b, FactionId(2));
        assert_eq!(roster.color_of(b), 0xc22625);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut roster = FactionRoster::new();
        roster.register("india", 0x1e0942).unwrap();
        assert!(roster.register("india", 0x000000).is_none());
        assert!(roster.register(NEUTRAL_FACTION_NAME, 0x000000).is_none());
    }
}
