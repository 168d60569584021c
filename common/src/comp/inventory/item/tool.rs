use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Sword,
    Axe,
    Hammer,
    Bow,
    Staff,
    Dagger,
    Spear,
    /// Intrinsic weapons of wild creatures (fangs, claws, beaks)
    Natural,
    /// Unarmed fallback so entities can still attack
    Empty,
}

/// How many hands a tool occupies when wielded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hands {
    One,
    Two,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tool {
    pub kind: ToolKind,
    pub hands: Hands,
    equip_time_millis: u64,
}

impl Tool {
    pub fn equip_time(&self) -> Duration { Duration::from_millis(self.equip_time_millis) }
}
