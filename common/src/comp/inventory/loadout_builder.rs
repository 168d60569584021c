use crate::{
    assets::{self, AssetExt, Error},
    comp::{
        body::Body,
        inventory::{
            item::{tool, Item, ItemKind},
            loadout::Loadout,
            slot::{ArmorSlot, EquipSlot},
        },
    },
};
use rand::{distributions::WeightedError, seq::SliceRandom, Rng};
use serde::Deserialize;

type Weight = u32;

#[derive(Debug)]
pub enum SpecError {
    LoadoutAssetError(Error),
    ItemAssetError(Error),
    ItemChoiceError(WeightedError),
    BaseChoiceError(WeightedError),
    HandsChoiceError(WeightedError),
}

#[derive(Debug)]
pub enum ValidationError {
    ItemAssetError(String, Error),
    LoadoutAssetError(String, Error),
    /// Loadout inheritance chain visits the same asset twice
    Loop(Vec<String>),
    /// Weighted choice with a zero weight or no entries
    InvalidWeights(String),
    /// Item can not be equipped in the slot its spec was written for
    SlotMismatch(String, EquipSlot),
    /// Hands spec references an item that is not a tool
    NotATool(String),
    /// Offhand can only hold one-handed tools
    OffhandNotOneHanded(String),
    /// Two-handed mainhand combined with an offhand item
    MainhandNotExclusive(String),
}

/// Weighted random selection of an item for one equip slot.
///
/// `None` entries in a `Choice` leave the slot empty when drawn.
#[derive(Debug, Deserialize, Clone)]
pub enum ItemSpec {
    Item(String),
    Choice(Vec<(Weight, Option<ItemSpec>)>),
}

impl ItemSpec {
    fn try_to_item(&self, rng: &mut impl Rng) -> Result<Option<Item>, SpecError> {
        match self {
            Self::Item(item_asset) => Item::new_from_asset(item_asset)
                .map(Some)
                .map_err(SpecError::ItemAssetError),
            Self::Choice(items) => {
                let (_, item_spec) = items
                    .choose_weighted(rng, |(weight, _)| *weight)
                    .map_err(SpecError::ItemChoiceError)?;
                match item_spec {
                    Some(spec) => spec.try_to_item(rng),
                    None => Ok(None),
                }
            },
        }
    }

    fn validate(&self, slot: EquipSlot) -> Result<(), ValidationError> {
        match self {
            Self::Item(item_asset) => {
                let item = Item::new_from_asset(item_asset)
                    .map_err(|e| ValidationError::ItemAssetError(item_asset.clone(), e))?;
                if !slot.can_hold(item.kind()) {
                    return Err(ValidationError::SlotMismatch(item_asset.clone(), slot));
                }
                if let EquipSlot::ActiveOffhand = slot {
                    match item.kind() {
                        ItemKind::Tool(t) if t.hands == tool::Hands::One => {},
                        ItemKind::Tool(_) => {
                            return Err(ValidationError::OffhandNotOneHanded(item_asset.clone()));
                        },
                        _ => return Err(ValidationError::NotATool(item_asset.clone())),
                    }
                }
                Ok(())
            },
            Self::Choice(items) => {
                if items.is_empty() || items.iter().any(|(weight, _)| *weight == 0) {
                    return Err(ValidationError::InvalidWeights(format!("{self:?}")));
                }
                for (_, item_spec) in items {
                    if let Some(spec) = item_spec {
                        spec.validate(slot)?;
                    }
                }
                Ok(())
            },
        }
    }
}

/// The wielded weapon pair: a direct (mainhand, offhand) assignment or a
/// weighted draw between such assignments.
#[derive(Debug, Deserialize, Clone)]
pub enum Hands {
    InHands((Option<ItemSpec>, Option<ItemSpec>)),
    Choice(Vec<(Weight, Hands)>),
}

impl Hands {
    fn try_to_pair(&self, rng: &mut impl Rng) -> Result<(Option<Item>, Option<Item>), SpecError> {
        match self {
            Self::InHands((mainhand, offhand)) => {
                let mut from_spec = |i: &Option<ItemSpec>| -> Result<Option<Item>, SpecError> {
                    match i {
                        Some(spec) => spec.try_to_item(rng),
                        None => Ok(None),
                    }
                };
                // Calls can't be inlined into the tuple, closure borrows rng
                let mainhand = from_spec(mainhand)?;
                let offhand = from_spec(offhand)?;
                Ok((mainhand, offhand))
            },
            Self::Choice(pairs) => {
                let (_, hands) = pairs
                    .choose_weighted(rng, |(weight, _)| *weight)
                    .map_err(SpecError::HandsChoiceError)?;
                hands.try_to_pair(rng)
            },
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::InHands((mainhand, offhand)) => {
                if let Some(spec) = mainhand {
                    spec.validate(EquipSlot::ActiveMainhand)?;
                }
                if let Some(spec) = offhand {
                    spec.validate(EquipSlot::ActiveOffhand)?;
                }
                // A direct two-handed mainhand leaves no room for an offhand.
                // Choices are checked entry by entry above, which can't see
                // cross-slot combinations, so only the direct case is caught.
                if let (Some(ItemSpec::Item(main_asset)), Some(_)) = (mainhand, offhand) {
                    let item = Item::new_from_asset(main_asset)
                        .map_err(|e| ValidationError::ItemAssetError(main_asset.clone(), e))?;
                    if let ItemKind::Tool(t) = item.kind() {
                        if t.hands == tool::Hands::Two {
                            return Err(ValidationError::MainhandNotExclusive(main_asset.clone()));
                        }
                    }
                }
                Ok(())
            },
            Self::Choice(pairs) => {
                if pairs.is_empty() || pairs.iter().any(|(weight, _)| *weight == 0) {
                    return Err(ValidationError::InvalidWeights(format!("{self:?}")));
                }
                for (_, hands) in pairs {
                    hands.validate()?;
                }
                Ok(())
            },
        }
    }
}

/// Base loadout to inherit from: a direct asset reference, a first-wins
/// combination, or a weighted choice between bases.
#[derive(Debug, Deserialize, Clone)]
pub enum Base {
    Asset(String),
    /// NOTE: If the same slot is filled in multiple configs,
    /// the first one has priority
    Combine(Vec<Base>),
    Choice(Vec<(Weight, Base)>),
}

impl Base {
    fn to_spec(&self, rng: &mut impl Rng) -> Result<LoadoutSpec, SpecError> {
        match self {
            Base::Asset(asset_specifier) => LoadoutSpec::load_cloned(asset_specifier)
                .map_err(SpecError::LoadoutAssetError)?
                .resolve(rng),
            Base::Combine(bases) => {
                let mut spec = LoadoutSpec::default();
                for base in bases {
                    spec = spec.merge(base.to_spec(rng)?);
                }
                Ok(spec)
            },
            Base::Choice(bases) => {
                let (_, base) = bases
                    .choose_weighted(rng, |(weight, _)| *weight)
                    .map_err(SpecError::BaseChoiceError)?;
                base.to_spec(rng)
            },
        }
    }

    fn validate(&self, mut history: Vec<String>) -> Result<(), ValidationError> {
        match self {
            Base::Asset(asset_specifier) => {
                if history.contains(asset_specifier) {
                    history.push(asset_specifier.clone());
                    return Err(ValidationError::Loop(history));
                }
                let spec = LoadoutSpec::load_cloned(asset_specifier)
                    .map_err(|e| ValidationError::LoadoutAssetError(asset_specifier.clone(), e))?;
                history.push(asset_specifier.clone());
                spec.validate(history)
            },
            Base::Combine(bases) => {
                for base in bases {
                    base.validate(history.clone())?;
                }
                Ok(())
            },
            Base::Choice(bases) => {
                if bases.is_empty() || bases.iter().any(|(weight, _)| *weight == 0) {
                    return Err(ValidationError::InvalidWeights(format!("{self:?}")));
                }
                for (_, base) in bases {
                    base.validate(history.clone())?;
                }
                Ok(())
            },
        }
    }
}

/// Declarative description of a loadout, loaded from RON assets.
///
/// Check assets/common/loadout/ for examples.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct LoadoutSpec {
    // Meta field
    inherit: Option<Base>,
    // Armor
    head: Option<ItemSpec>,
    neck: Option<ItemSpec>,
    shoulders: Option<ItemSpec>,
    chest: Option<ItemSpec>,
    gloves: Option<ItemSpec>,
    ring1: Option<ItemSpec>,
    ring2: Option<ItemSpec>,
    back: Option<ItemSpec>,
    belt: Option<ItemSpec>,
    legs: Option<ItemSpec>,
    feet: Option<ItemSpec>,
    tabard: Option<ItemSpec>,
    lantern: Option<ItemSpec>,
    glider: Option<ItemSpec>,
    // Weapons
    active_hands: Option<Hands>,
}

impl assets::Asset for LoadoutSpec {
    type Loader = assets::RonLoader;

    const EXTENSION: &'static str = "ron";
}

impl LoadoutSpec {
    /// Merges `base` under this spec. Own fields have priority.
    fn merge(self, base: Self) -> Self {
        Self {
            inherit: None,
            head: self.head.or(base.head),
            neck: self.neck.or(base.neck),
            shoulders: self.shoulders.or(base.shoulders),
            chest: self.chest.or(base.chest),
            gloves: self.gloves.or(base.gloves),
            ring1: self.ring1.or(base.ring1),
            ring2: self.ring2.or(base.ring2),
            back: self.back.or(base.back),
            belt: self.belt.or(base.belt),
            legs: self.legs.or(base.legs),
            feet: self.feet.or(base.feet),
            tabard: self.tabard.or(base.tabard),
            lantern: self.lantern.or(base.lantern),
            glider: self.glider.or(base.glider),
            active_hands: self.active_hands.or(base.active_hands),
        }
    }

    /// Recursively evaluates the inheritance chain, so that the result
    /// carries no `inherit` field.
    fn resolve(mut self, rng: &mut impl Rng) -> Result<Self, SpecError> {
        match self.inherit.take() {
            Some(base) => {
                let base = base.to_spec(rng)?;
                Ok(self.merge(base))
            },
            None => Ok(self),
        }
    }

    /// Checks that all referenced assets exist, all items fit their slots and
    /// all weights obey the positive-integer invariant.
    ///
    /// `history` holds the inheritance chain walked so far and is used to
    /// reject loops.
    pub fn validate(&self, history: Vec<String>) -> Result<(), ValidationError> {
        if let Some(base) = &self.inherit {
            base.validate(history)?;
        }

        let armor_slots = [
            (&self.head, EquipSlot::Armor(ArmorSlot::Head)),
            (&self.neck, EquipSlot::Armor(ArmorSlot::Neck)),
            (&self.shoulders, EquipSlot::Armor(ArmorSlot::Shoulders)),
            (&self.chest, EquipSlot::Armor(ArmorSlot::Chest)),
            (&self.gloves, EquipSlot::Armor(ArmorSlot::Gloves)),
            (&self.ring1, EquipSlot::Armor(ArmorSlot::Ring1)),
            (&self.ring2, EquipSlot::Armor(ArmorSlot::Ring2)),
            (&self.back, EquipSlot::Armor(ArmorSlot::Back)),
            (&self.belt, EquipSlot::Armor(ArmorSlot::Belt)),
            (&self.legs, EquipSlot::Armor(ArmorSlot::Legs)),
            (&self.feet, EquipSlot::Armor(ArmorSlot::Feet)),
            (&self.tabard, EquipSlot::Armor(ArmorSlot::Tabard)),
            (&self.lantern, EquipSlot::Lantern),
            (&self.glider, EquipSlot::Glider),
        ];
        for (spec, slot) in armor_slots {
            if let Some(spec) = spec {
                spec.validate(slot)?;
            }
        }

        match &self.active_hands {
            Some(hands) => hands.validate(),
            None => Ok(()),
        }
    }
}

/// Builder for entity `Loadout`s.
///
/// ```
/// use emberveil_common::comp::inventory::{item::Item, loadout_builder::LoadoutBuilder};
///
/// // Start with the character defaults and swap in a specific sword
/// let loadout = LoadoutBuilder::empty()
///     .defaults()
///     .active_mainhand(Some(Item::new_from_asset_expect(
///         "common.items.weapons.sword.iron",
///     )))
///     .build();
/// ```
#[derive(Clone)]
pub struct LoadoutBuilder(Loadout);

impl LoadoutBuilder {
    #[must_use]
    pub fn empty() -> Self { Self(Loadout::new_empty()) }

    /// Set default armor items for the loadout. This may vary with game
    /// updates, but should be safe defaults for a new character.
    #[must_use]
    pub fn defaults(self) -> Self {
        self.chest(Some(Item::new_from_asset_expect(
            "common.items.armor.linen.chest",
        )))
        .legs(Some(Item::new_from_asset_expect(
            "common.items.armor.linen.pants",
        )))
        .feet(Some(Item::new_from_asset_expect(
            "common.items.armor.linen.feet",
        )))
        .lantern(Some(Item::new_from_asset_expect(
            "common.items.lantern.black",
        )))
        .glider(Some(Item::new_from_asset_expect(
            "common.items.glider.cloth",
        )))
    }

    pub fn from_asset<R: Rng>(asset_specifier: &str, rng: &mut R) -> Result<Self, SpecError> {
        let spec = LoadoutSpec::load_cloned(asset_specifier).map_err(SpecError::LoadoutAssetError)?;
        Self::from_loadout_spec(spec, rng)
    }

    #[must_use]
    pub fn from_asset_expect<R: Rng>(asset_specifier: &str, rng: &mut R) -> Self {
        Self::from_asset(asset_specifier, rng).unwrap_or_else(|err| {
            panic!("failed to load loadout: {}. Error: {:?}", asset_specifier, err)
        })
    }

    pub fn from_loadout_spec<R: Rng>(spec: LoadoutSpec, rng: &mut R) -> Result<Self, SpecError> {
        let spec = spec.resolve(rng)?;

        fn item_in_slot(
            spec: &Option<ItemSpec>,
            rng: &mut impl Rng,
        ) -> Result<Option<Item>, SpecError> {
            match spec {
                Some(spec) => spec.try_to_item(rng),
                None => Ok(None),
            }
        }

        let (mainhand, offhand) = match &spec.active_hands {
            Some(hands) => hands.try_to_pair(rng)?,
            None => (None, None),
        };

        Ok(Self::empty()
            .active_mainhand(mainhand)
            .active_offhand(offhand)
            .head(item_in_slot(&spec.head, rng)?)
            .neck(item_in_slot(&spec.neck, rng)?)
            .shoulders(item_in_slot(&spec.shoulders, rng)?)
            .chest(item_in_slot(&spec.chest, rng)?)
            .gloves(item_in_slot(&spec.gloves, rng)?)
            .ring1(item_in_slot(&spec.ring1, rng)?)
            .ring2(item_in_slot(&spec.ring2, rng)?)
            .back(item_in_slot(&spec.back, rng)?)
            .belt(item_in_slot(&spec.belt, rng)?)
            .legs(item_in_slot(&spec.legs, rng)?)
            .feet(item_in_slot(&spec.feet, rng)?)
            .tabard(item_in_slot(&spec.tabard, rng)?)
            .lantern(item_in_slot(&spec.lantern, rng)?)
            .glider(item_in_slot(&spec.glider, rng)?))
    }

    /// Default loadout for creatures spawned without an explicit loadout
    /// asset, derived from their body.
    #[must_use]
    pub fn from_default(body: &Body) -> Self {
        let builder = Self::empty().with_default_maintool(body);
        match body {
            Body::Humanoid(_) => builder.defaults(),
            _ => builder,
        }
    }

    #[must_use]
    pub fn with_default_maintool(self, body: &Body) -> Self {
        self.active_mainhand(Some(default_main_tool(body)))
    }

    #[must_use]
    pub fn active_mainhand(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::ActiveMainhand, item);
        self
    }

    #[must_use]
    pub fn active_offhand(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::ActiveOffhand, item);
        self
    }

    #[must_use]
    pub fn head(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Armor(ArmorSlot::Head), item);
        self
    }

    #[must_use]
    pub fn neck(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Armor(ArmorSlot::Neck), item);
        self
    }

    #[must_use]
    pub fn shoulders(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Armor(ArmorSlot::Shoulders), item);
        self
    }

    #[must_use]
    pub fn chest(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Armor(ArmorSlot::Chest), item);
        self
    }

    #[must_use]
    pub fn gloves(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Armor(ArmorSlot::Gloves), item);
        self
    }

    #[must_use]
    pub fn ring1(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Armor(ArmorSlot::Ring1), item);
        self
    }

    #[must_use]
    pub fn ring2(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Armor(ArmorSlot::Ring2), item);
        self
    }

    #[must_use]
    pub fn back(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Armor(ArmorSlot::Back), item);
        self
    }

    #[must_use]
    pub fn belt(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Armor(ArmorSlot::Belt), item);
        self
    }

    #[must_use]
    pub fn legs(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Armor(ArmorSlot::Legs), item);
        self
    }

    #[must_use]
    pub fn feet(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Armor(ArmorSlot::Feet), item);
        self
    }

    #[must_use]
    pub fn tabard(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Armor(ArmorSlot::Tabard), item);
        self
    }

    #[must_use]
    pub fn lantern(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Lantern, item);
        self
    }

    #[must_use]
    pub fn glider(mut self, item: Option<Item>) -> Self {
        self.0.swap(EquipSlot::Glider, item);
        self
    }

    #[must_use]
    pub fn build(self) -> Loadout { self.0 }
}

/// If a creature has an intrinsic weapon (fangs, beak), returns it, otherwise
/// falls back to the unarmed pseudo-item so the entity can still attack.
pub fn default_main_tool(body: &Body) -> Item {
    use crate::comp::body::quadruped_medium;
    match body {
        Body::QuadrupedMedium(quadruped_medium) => match quadruped_medium.species {
            quadruped_medium::Species::Wolf | quadruped_medium::Species::Bear => {
                Item::new_from_asset_expect("common.items.npc_weapons.unique.fangs")
            },
            quadruped_medium::Species::Horse | quadruped_medium::Species::Deer => {
                Item::new_from_asset_expect("common.items.npc_weapons.unique.hooves")
            },
        },
        Body::BirdMedium(_) => Item::new_from_asset_expect("common.items.npc_weapons.unique.beak"),
        Body::Humanoid(_) => Item::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Directory;
    use rand::{rngs::SmallRng, SeedableRng};

    // Iterate over all loadouts shipped with the game and validate them.
    // Deliberately skips common.test, which holds intentionally broken specs.
    #[test]
    fn test_all_loadout_assets() {
        let loadouts = Directory::load("common.loadout").expect("failed to get loadout directory");
        for loadout_id in loadouts.read().iter() {
            let loadout =
                LoadoutSpec::load_cloned(loadout_id).expect("failed to load loadout asset");
            loadout
                .validate(vec![loadout_id.clone()])
                .unwrap_or_else(|e| panic!("Loadout {loadout_id} is broken: {e:?}"));
        }
    }

    #[test]
    fn test_loadout_assets_resolve() {
        let mut rng = SmallRng::seed_from_u64(42);
        let loadouts = Directory::load("common.loadout").expect("failed to get loadout directory");
        for loadout_id in loadouts.read().iter() {
            // A resolved loadout must never fail on a validated spec
            let loadout = LoadoutBuilder::from_asset_expect(loadout_id, &mut rng).build();
            drop(loadout);
        }
    }

    #[test]
    fn test_inheritance_loop_is_rejected() {
        let spec = LoadoutSpec::load_cloned("common.test.loadout.loop")
            .expect("failed to load test loadout");
        match spec.validate(vec!["common.test.loadout.loop".to_owned()]) {
            Err(ValidationError::Loop(_)) => {},
            other => panic!("expected inheritance loop to be rejected, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_weight_is_rejected() {
        let spec = ItemSpec::Choice(vec![
            (0, Some(ItemSpec::Item("common.items.weapons.sword.iron".to_owned()))),
            (1, None),
        ]);
        assert!(matches!(
            spec.validate(EquipSlot::ActiveMainhand),
            Err(ValidationError::InvalidWeights(_))
        ));
    }

    #[test]
    fn test_hands_choice_draw() {
        let mut rng = SmallRng::seed_from_u64(7);
        let hands = Hands::Choice(vec![
            (
                2,
                Hands::InHands((
                    Some(ItemSpec::Item("common.items.weapons.sword.iron".to_owned())),
                    None,
                )),
            ),
            (
                1,
                Hands::InHands((
                    Some(ItemSpec::Item("common.items.weapons.axe.iron".to_owned())),
                    None,
                )),
            ),
        ]);
        hands.validate().expect("hands spec should be valid");
        for _ in 0..16 {
            let (mainhand, offhand) = hands.try_to_pair(&mut rng).expect("draw failed");
            assert!(mainhand.is_some());
            assert!(offhand.is_none());
        }
    }

    #[test]
    fn test_default_loadouts_for_all_bodies() {
        use crate::comp::body::{bird_medium, humanoid, quadruped_medium};

        let bodies = [
            Body::Humanoid(humanoid::Body::random()),
            Body::QuadrupedMedium(quadruped_medium::Body::random()),
            Body::BirdMedium(bird_medium::Body::random()),
        ];
        for body in bodies {
            let loadout = LoadoutBuilder::from_default(&body).build();
            assert!(loadout.main_tool().is_some(), "no default tool for {body:?}");
        }
    }
}
