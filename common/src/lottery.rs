//! Weighted tables for random drops.
//!
//! A lottery is loaded from a RON list of `(weight, item)` pairs. Weights are
//! positive integers; an entry is drawn with probability weight / total. An
//! example loot table:
//! ```text
//! [
//!     (4, Item("common.items.food.cheese")),
//!     (2, ItemQuantity("common.items.food.bread", 2, 5)),
//!     (1, LootTable("common.loot_tables.creature.humanoid")),
//!     (1, Nothing),
//! ]
//! ```
use crate::{
    assets::{self, AssetExt},
    comp::Item,
};
use rand::prelude::*;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Lottery<T> {
    // Cumulative start weight of each item, so a draw is a binary search
    items: Vec<(u32, T)>,
    total: u32,
}

impl<T: DeserializeOwned + Send + Sync + 'static> assets::Asset for Lottery<T> {
    type Loader = assets::LoadFrom<Vec<(u32, T)>, assets::RonLoader>;

    const EXTENSION: &'static str = "ron";
}

impl<T> From<Vec<(u32, T)>> for Lottery<T> {
    fn from(mut items: Vec<(u32, T)>) -> Lottery<T> {
        let mut total = 0;

        for (weight, _) in &mut items {
            total += *weight;
            *weight = total - *weight;
        }

        Self { items, total }
    }
}

impl<T> Lottery<T> {
    pub fn choose_seeded(&self, seed: u32) -> &T {
        let x = ((seed as u64 * self.total as u64) >> 32) as u32;
        &self.items[self
            .items
            .binary_search_by_key(&x, |(y, _)| *y)
            .unwrap_or_else(|i| i.saturating_sub(1))]
        .1
    }

    pub fn choose(&self) -> &T { self.choose_seeded(thread_rng().gen()) }

    pub fn iter(&self) -> impl Iterator<Item = &(u32, T)> { self.items.iter() }

    pub fn total(&self) -> u32 { self.total }

    /// True when the table has at least one entry and every weight is a
    /// positive integer. Drawing from a table that fails this check panics
    /// on the empty case and breaks the weight / total probability on the
    /// zero-weight case.
    pub fn weights_are_valid(&self) -> bool {
        // items hold cumulative start weights, so a zero weight shows up as
        // two equal consecutive entries (or a last entry equal to the total)
        !self.items.is_empty()
            && self.items.windows(2).all(|pair| pair[0].0 < pair[1].0)
            && self.items.last().map_or(false, |(start, _)| *start < self.total)
    }
}

/// One entry of a loot table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LootSpec<T: AsRef<str>> {
    /// Asset specifier
    Item(T),
    /// Asset specifier, lower range, upper range
    ItemQuantity(T, u32, u32),
    /// Recursive indirection into another loot table asset
    LootTable(T),
    /// No drop
    Nothing,
}

impl<T: AsRef<str>> LootSpec<T> {
    pub fn to_item(&self) -> Option<Item> { self.to_item_with(&mut Vec::new()) }

    /// `visited` carries the chain of loot table specifiers already drawn
    /// from, so reference cycles terminate instead of recursing forever.
    fn to_item_with(&self, visited: &mut Vec<String>) -> Option<Item> {
        let mut rng = thread_rng();
        match self {
            Self::Item(item) => match Item::new_from_asset(item.as_ref()) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(?e, asset = item.as_ref(), "failed to load loot item");
                    None
                },
            },
            Self::ItemQuantity(item, lower, upper) => {
                let range = *lower.min(upper)..=*lower.max(upper);
                let quantity = rng.gen_range(range);
                match Item::new_from_asset(item.as_ref()) {
                    Ok(mut item) => {
                        if let Err(e) = item.set_amount(quantity) {
                            warn!(?e, ?quantity, "invalid quantity for loot item");
                        }
                        Some(item)
                    },
                    Err(e) => {
                        warn!(?e, asset = item.as_ref(), "failed to load loot item");
                        None
                    },
                }
            },
            Self::LootTable(table) => {
                let table = table.as_ref();
                if visited.iter().any(|t| t == table) {
                    warn!(table, "loot table cycle");
                    return None;
                }
                visited.push(table.to_owned());
                let drawn = Lottery::<LootSpec<String>>::load_expect(table)
                    .read()
                    .choose_seeded(rng.gen())
                    .clone();
                let item = drawn.to_item_with(visited);
                visited.pop();
                item
            },
            Self::Nothing => None,
        }
    }
}

impl Default for LootSpec<String> {
    fn default() -> Self { Self::Nothing }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::assets;

    /// Checks that an entry is usable: its items exist and its quantity
    /// ranges and nested tables are sane.
    pub fn validate_loot_spec(item: &LootSpec<String>) {
        validate_spec(item, &mut Vec::new());
    }

    fn validate_spec(item: &LootSpec<String>, visited: &mut Vec<String>) {
        match item {
            LootSpec::Item(item) => {
                Item::new_from_asset_expect(item);
            },
            LootSpec::ItemQuantity(item, lower, upper) => {
                assert!(
                    upper >= lower,
                    "Upper quantity must be at least the lower quantity ({item})"
                );
                let mut item = Item::new_from_asset_expect(item);
                item.set_amount(*upper)
                    .expect("quantity above item stack limit");
            },
            LootSpec::LootTable(loot_table) => {
                assert!(
                    !visited.contains(loot_table),
                    "loot table cycle through {loot_table}"
                );
                visited.push(loot_table.clone());
                let loot_table = Lottery::<LootSpec<String>>::load_expect_cloned(loot_table);
                validate_table_contents(&loot_table, visited);
                visited.pop();
            },
            LootSpec::Nothing => {},
        }
    }

    fn validate_table_contents(table: &Lottery<LootSpec<String>>, visited: &mut Vec<String>) {
        assert!(table.weights_are_valid(), "empty table or zero weight");
        for (_, item) in table.iter() {
            validate_spec(item, visited);
        }
    }

    #[test]
    fn test_all_loot_tables() {
        let loot_tables =
            assets::Directory::load("common.loot_tables").expect("failed to get loot table directory");
        for loot_table_id in loot_tables.read().iter() {
            let loot_table = Lottery::<LootSpec<String>>::load_expect_cloned(loot_table_id);
            validate_table_contents(&loot_table, &mut vec![loot_table_id.clone()]);
        }
    }

    #[test]
    fn test_choose_seeded_stays_in_bounds() {
        let lottery = Lottery::from(vec![(1, "a"), (3, "b"), (6, "c")]);
        assert_eq!(lottery.total(), 10);
        for seed in [0, 1, u32::MAX / 2, u32::MAX - 1, u32::MAX] {
            let choice = lottery.choose_seeded(seed);
            assert!(["a", "b", "c"].contains(choice));
        }
        // Seed 0 always lands on the first entry
        assert_eq!(*lottery.choose_seeded(0), "a");
    }

    #[test]
    fn test_zero_and_missing_weights_are_invalid() {
        assert!(!Lottery::<&str>::from(Vec::new()).weights_are_valid());
        assert!(!Lottery::from(vec![(0, "a"), (1, "b")]).weights_are_valid());
        assert!(!Lottery::from(vec![(1, "a"), (0, "b")]).weights_are_valid());
        assert!(Lottery::from(vec![(1, "a"), (3, "b")]).weights_are_valid());
    }

    // common.test.loot.a and common.test.loot.b reference each other
    #[test]
    fn test_loot_table_cycle_yields_nothing() {
        let spec = LootSpec::LootTable("common.test.loot.a".to_owned());
        assert!(spec.to_item().is_none());
    }

    #[test]
    #[should_panic(expected = "cycle")]
    fn test_loot_table_cycle_fails_validation() {
        validate_loot_spec(&LootSpec::LootTable("common.test.loot.a".to_owned()));
    }
}
