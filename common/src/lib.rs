//! Data definitions for game content: entity configs, loadouts, items, loot
//! tables and skillsets, all stored as RON assets.

pub mod assets;
pub mod comp;
pub mod generation;
pub mod lottery;
pub mod npc;
pub mod skillset_builder;

// Reexports
pub use self::{
    comp::{body::Body, inventory::loadout_builder::LoadoutBuilder},
    generation::{EntityConfig, EntityInfo},
    lottery::{LootSpec, Lottery},
    skillset_builder::SkillSetBuilder,
};
