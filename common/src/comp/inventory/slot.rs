use super::item::{armor::ArmorKind, ItemKind};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum EquipSlot {
    ActiveMainhand,
    ActiveOffhand,
    Armor(ArmorSlot),
    Lantern,
    Glider,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum ArmorSlot {
    Head,
    Neck,
    Shoulders,
    Chest,
    Gloves,
    Ring1,
    Ring2,
    Back,
    Belt,
    Legs,
    Feet,
    Tabard,
}

impl EquipSlot {
    pub fn can_hold(self, item_kind: &ItemKind) -> bool {
        match (self, item_kind) {
            (Self::ActiveMainhand, ItemKind::Tool(_)) => true,
            (Self::ActiveOffhand, ItemKind::Tool(_)) => true,
            (Self::Armor(slot), ItemKind::Armor(armor)) => slot.can_hold(armor.kind),
            (Self::Lantern, ItemKind::Lantern { .. }) => true,
            (Self::Glider, ItemKind::Glider) => true,
            _ => false,
        }
    }
}

impl ArmorSlot {
    fn can_hold(self, kind: ArmorKind) -> bool {
        matches!(
            (self, kind),
            (Self::Head, ArmorKind::Head)
                | (Self::Neck, ArmorKind::Neck)
                | (Self::Shoulders, ArmorKind::Shoulder)
                | (Self::Chest, ArmorKind::Chest)
                | (Self::Gloves, ArmorKind::Hand)
                | (Self::Ring1, ArmorKind::Ring)
                | (Self::Ring2, ArmorKind::Ring)
                | (Self::Back, ArmorKind::Back)
                | (Self::Belt, ArmorKind::Belt)
                | (Self::Legs, ArmorKind::Pants)
                | (Self::Feet, ArmorKind::Foot)
                | (Self::Tabard, ArmorKind::Tabard)
        )
    }
}
