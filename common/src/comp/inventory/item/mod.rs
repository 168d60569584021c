pub mod armor;
pub mod tool;

// Reexports
pub use tool::{Hands, Tool, ToolKind};

use crate::assets::{self, AssetExt, Error};
use armor::Armor;
use serde::{Deserialize, Serialize};
use std::{num::NonZeroU32, sync::Arc};
use tracing::error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    Low,      // Grey
    Common,   // Light blue
    Moderate, // Green
    High,     // Blue
    Epic,     // Purple
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsumableKind {
    Food,
    Drink,
    Potion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UtilityKind {
    Coins,
    Collar,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Something wieldable
    Tool(Tool),
    Armor(Armor),
    Lantern { strength: u32 },
    Glider,
    Consumable { kind: ConsumableKind },
    Utility { kind: UtilityKind },
}

impl ItemKind {
    pub fn is_stackable(&self) -> bool {
        matches!(
            self,
            ItemKind::Consumable { .. } | ItemKind::Utility { .. }
        )
    }
}

/// Item definition as stored on disk. Immutable; shared between all item
/// instances created from the same asset.
#[derive(Clone, Debug, Deserialize)]
pub struct ItemDef {
    name: String,
    description: String,
    pub kind: ItemKind,
    pub quality: Quality,
}

impl assets::Asset for ItemDef {
    type Loader = assets::RonLoader;

    const EXTENSION: &'static str = "ron";
}

impl ItemDef {
    pub fn name(&self) -> &str { &self.name }

    pub fn description(&self) -> &str { &self.description }

    pub fn is_stackable(&self) -> bool { self.kind.is_stackable() }

    pub fn max_amount(&self) -> u32 {
        if self.is_stackable() { u32::MAX } else { 1 }
    }
}

/// Returned by operations that would produce an invalid item state, for
/// example stacking an unstackable item.
#[derive(Clone, Copy, Debug)]
pub struct OperationFailure;

/// An item instance: a definition plus a stack size.
#[derive(Clone, Debug)]
pub struct Item {
    item_def_id: String,
    item_def: Arc<ItemDef>,
    amount: NonZeroU32,
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool { self.item_def_id == other.item_def_id }
}

impl Item {
    pub fn new_from_asset(asset_specifier: &str) -> Result<Self, Error> {
        // Cloning the cached Arc keeps one ItemDef shared between all
        // instances of the same definition
        let item_def = Arc::<ItemDef>::load_cloned(asset_specifier)?;
        Ok(Self {
            item_def_id: asset_specifier.to_owned(),
            item_def,
            amount: NonZeroU32::new(1).unwrap(),
        })
    }

    /// Creates a new instance of an `Item` from the provided asset identifier
    /// Panics if the asset does not exist.
    #[track_caller]
    pub fn new_from_asset_expect(asset_specifier: &str) -> Self {
        Self::new_from_asset(asset_specifier).unwrap_or_else(|err| {
            panic!(
                "Expected asset to exist: {}, instead got error {:?}",
                asset_specifier, err
            )
        })
    }

    /// Creates a Vec containing one of each item that matches the provided
    /// asset glob pattern
    pub fn new_from_asset_glob(asset_glob: &str) -> Result<Vec<Self>, Error> {
        let directory = asset_glob.strip_suffix(".*").unwrap_or(asset_glob);
        let specifiers = assets::Directory::load(directory)?;
        specifiers
            .read()
            .iter()
            .map(|spec| Self::new_from_asset(spec))
            .collect()
    }

    pub fn item_definition_id(&self) -> &str { &self.item_def_id }

    pub fn name(&self) -> &str { self.item_def.name() }

    pub fn description(&self) -> &str { self.item_def.description() }

    pub fn kind(&self) -> &ItemKind { &self.item_def.kind }

    pub fn quality(&self) -> Quality { self.item_def.quality }

    pub fn amount(&self) -> u32 { self.amount.get() }

    pub fn is_stackable(&self) -> bool { self.item_def.is_stackable() }

    pub fn max_amount(&self) -> u32 { self.item_def.max_amount() }

    pub fn set_amount(&mut self, give_amount: u32) -> Result<(), OperationFailure> {
        if give_amount == 0 {
            return Err(OperationFailure);
        }
        if give_amount > 1 && !self.is_stackable() {
            return Err(OperationFailure);
        }
        if give_amount > self.max_amount() {
            return Err(OperationFailure);
        }
        // Unwrap is safe, give_amount != 0 was checked above
        self.amount = NonZeroU32::new(give_amount).unwrap();
        Ok(())
    }

    /// Increases the amount, saturating at `max_amount`.
    pub fn increase_amount(&mut self, increase_by: u32) -> Result<(), OperationFailure> {
        let new_amount = self.amount.get().saturating_add(increase_by);
        self.set_amount(new_amount)
    }

    /// An empty-handed "weapon" so entities without tools can still act.
    pub fn empty() -> Self { Self::new_from_asset_expect("common.items.weapons.empty.empty") }
}

/// Sum up the items in an item list, merging equal definitions into stacks.
///
/// Items that fail to stack keep their own entry instead of being dropped.
pub fn flatten_counted_items(items: &[(u32, String)]) -> Vec<Item> {
    let mut result: Vec<Item> = Vec::new();
    for (amount, asset) in items {
        match Item::new_from_asset(asset) {
            Ok(mut item) => {
                if item.set_amount(*amount).is_err() {
                    error!(?asset, ?amount, "item stack limit exceeded");
                    continue;
                }
                let merged = result
                    .iter_mut()
                    .find(|existing| existing.item_definition_id() == asset)
                    .map_or(false, |existing| existing.increase_amount(*amount).is_ok());
                if !merged {
                    result.push(item);
                }
            },
            Err(err) => {
                error!(?asset, ?err, "failed to load inventory item");
            },
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_limits() {
        let mut sword = Item::new_from_asset_expect("common.items.weapons.sword.iron");
        assert!(sword.set_amount(2).is_err());
        assert_eq!(sword.amount(), 1);

        let mut bread = Item::new_from_asset_expect("common.items.food.bread");
        assert!(bread.set_amount(10).is_ok());
        assert_eq!(bread.amount(), 10);
        assert!(bread.set_amount(0).is_err());
    }

    #[test]
    fn glob_loads_whole_directory() {
        let food = Item::new_from_asset_glob("common.items.food.*").expect("glob failed");
        assert!(food.iter().any(|i| i.item_definition_id() == "common.items.food.bread"));
        assert!(food.len() >= 3);
    }

    #[test]
    fn flatten_merges_stacks() {
        let items = vec![
            (2, "common.items.food.bread".to_owned()),
            (3, "common.items.food.bread".to_owned()),
            (1, "common.items.food.cheese".to_owned()),
        ];
        let flattened = flatten_counted_items(&items);
        assert_eq!(flattened.len(), 2);
        assert_eq!(flattened[0].amount(), 5);
    }

    // Unstackable duplicates can't merge and must keep their own entries
    #[test]
    fn flatten_keeps_unstackable_duplicates() {
        let items = vec![
            (1, "common.items.weapons.sword.iron".to_owned()),
            (1, "common.items.weapons.sword.iron".to_owned()),
        ];
        let flattened = flatten_counted_items(&items);
        assert_eq!(flattened.len(), 2);
        assert!(flattened.iter().all(|i| i.amount() == 1));
    }

    #[test]
    fn item_defs_are_shared() {
        let a = Item::new_from_asset_expect("common.items.food.bread");
        let b = Item::new_from_asset_expect("common.items.food.bread");
        assert!(Arc::ptr_eq(&a.item_def, &b.item_def));
    }
}
