use super::{
    item::{tool, Item, ItemKind},
    slot::{ArmorSlot, EquipSlot},
};
use std::mem::replace;
use tracing::warn;

/// The equipped items of an entity. Slots hold at most one item each; slot
/// compatibility is enforced on `swap`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Loadout {
    active_mainhand: Option<Item>,
    active_offhand: Option<Item>,
    head: Option<Item>,
    neck: Option<Item>,
    shoulders: Option<Item>,
    chest: Option<Item>,
    gloves: Option<Item>,
    ring1: Option<Item>,
    ring2: Option<Item>,
    back: Option<Item>,
    belt: Option<Item>,
    legs: Option<Item>,
    feet: Option<Item>,
    tabard: Option<Item>,
    lantern: Option<Item>,
    glider: Option<Item>,
}

impl Loadout {
    pub fn new_empty() -> Self { Self::default() }

    fn slot_mut(&mut self, equip_slot: EquipSlot) -> &mut Option<Item> {
        match equip_slot {
            EquipSlot::ActiveMainhand => &mut self.active_mainhand,
            EquipSlot::ActiveOffhand => &mut self.active_offhand,
            EquipSlot::Armor(ArmorSlot::Head) => &mut self.head,
            EquipSlot::Armor(ArmorSlot::Neck) => &mut self.neck,
            EquipSlot::Armor(ArmorSlot::Shoulders) => &mut self.shoulders,
            EquipSlot::Armor(ArmorSlot::Chest) => &mut self.chest,
            EquipSlot::Armor(ArmorSlot::Gloves) => &mut self.gloves,
            EquipSlot::Armor(ArmorSlot::Ring1) => &mut self.ring1,
            EquipSlot::Armor(ArmorSlot::Ring2) => &mut self.ring2,
            EquipSlot::Armor(ArmorSlot::Back) => &mut self.back,
            EquipSlot::Armor(ArmorSlot::Belt) => &mut self.belt,
            EquipSlot::Armor(ArmorSlot::Legs) => &mut self.legs,
            EquipSlot::Armor(ArmorSlot::Feet) => &mut self.feet,
            EquipSlot::Armor(ArmorSlot::Tabard) => &mut self.tabard,
            EquipSlot::Lantern => &mut self.lantern,
            EquipSlot::Glider => &mut self.glider,
        }
    }

    /// Replaces the item in `equip_slot`, returning the old item. If the new
    /// item cannot go in that slot it is handed back unequipped.
    pub fn swap(&mut self, equip_slot: EquipSlot, item: Option<Item>) -> Option<Item> {
        if let Some(item_ref) = &item {
            if !equip_slot.can_hold(item_ref.kind()) {
                warn!(?equip_slot, id = ?item_ref.item_definition_id(), "cannot equip item in slot");
                return item;
            }
        }
        replace(self.slot_mut(equip_slot), item)
    }

    pub fn equipped(&self, equip_slot: EquipSlot) -> Option<&Item> {
        match equip_slot {
            EquipSlot::ActiveMainhand => self.active_mainhand.as_ref(),
            EquipSlot::ActiveOffhand => self.active_offhand.as_ref(),
            EquipSlot::Armor(ArmorSlot::Head) => self.head.as_ref(),
            EquipSlot::Armor(ArmorSlot::Neck) => self.neck.as_ref(),
            EquipSlot::Armor(ArmorSlot::Shoulders) => self.shoulders.as_ref(),
            EquipSlot::Armor(ArmorSlot::Chest) => self.chest.as_ref(),
            EquipSlot::Armor(ArmorSlot::Gloves) => self.gloves.as_ref(),
            EquipSlot::Armor(ArmorSlot::Ring1) => self.ring1.as_ref(),
            EquipSlot::Armor(ArmorSlot::Ring2) => self.ring2.as_ref(),
            EquipSlot::Armor(ArmorSlot::Back) => self.back.as_ref(),
            EquipSlot::Armor(ArmorSlot::Belt) => self.belt.as_ref(),
            EquipSlot::Armor(ArmorSlot::Legs) => self.legs.as_ref(),
            EquipSlot::Armor(ArmorSlot::Feet) => self.feet.as_ref(),
            EquipSlot::Armor(ArmorSlot::Tabard) => self.tabard.as_ref(),
            EquipSlot::Lantern => self.lantern.as_ref(),
            EquipSlot::Glider => self.glider.as_ref(),
        }
    }

    /// The tool wielded in the mainhand, if any.
    pub fn main_tool(&self) -> Option<&tool::Tool> {
        self.active_mainhand.as_ref().and_then(|i| match i.kind() {
            ItemKind::Tool(tool) => Some(tool),
            _ => None,
        })
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        [
            &self.active_mainhand,
            &self.active_offhand,
            &self.head,
            &self.neck,
            &self.shoulders,
            &self.chest,
            &self.gloves,
            &self.ring1,
            &self.ring2,
            &self.back,
            &self.belt,
            &self.legs,
            &self.feet,
            &self.tabard,
            &self.lantern,
            &self.glider,
        ]
        .into_iter()
        .filter_map(|i| i.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_returns_incompatible_item() {
        let mut loadout = Loadout::new_empty();
        let bread = Item::new_from_asset_expect("common.items.food.bread");

        let returned = loadout.swap(EquipSlot::ActiveMainhand, Some(bread.clone()));
        assert_eq!(returned, Some(bread));
        assert!(loadout.equipped(EquipSlot::ActiveMainhand).is_none());
    }

    #[test]
    fn swap_replaces_previous_item() {
        let mut loadout = Loadout::new_empty();
        let iron = Item::new_from_asset_expect("common.items.weapons.sword.iron");
        let steel = Item::new_from_asset_expect("common.items.weapons.sword.steel");

        assert_eq!(loadout.swap(EquipSlot::ActiveMainhand, Some(iron.clone())), None);
        let returned = loadout.swap(EquipSlot::ActiveMainhand, Some(steel));
        assert_eq!(returned, Some(iron));
    }
}
