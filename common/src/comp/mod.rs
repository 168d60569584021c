pub mod alignment;
pub mod body;
pub mod inventory;
pub mod skills;

pub use alignment::Alignment;
pub use body::{AllBodies, Body, BodyData};
pub use inventory::{
    item::{self, Item, ItemKind},
    loadout::Loadout,
    loadout_builder::{self, LoadoutBuilder},
    slot,
};
pub use skills::{Skill, SkillSet};
