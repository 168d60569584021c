use serde::{Deserialize, Serialize};

/// The slot family a piece of armor belongs to. Checked against the equip
/// slot when building loadouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmorKind {
    Head,
    Neck,
    Shoulder,
    Chest,
    Hand,
    Ring,
    Back,
    Belt,
    Pants,
    Foot,
    Tabard,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Armor {
    pub kind: ArmorKind,
    protection: i32,
}

impl Armor {
    pub fn protection(&self) -> i32 { self.protection }

    #[cfg(test)]
    pub fn test_armor(kind: ArmorKind, protection: i32) -> Self { Self { kind, protection } }
}
