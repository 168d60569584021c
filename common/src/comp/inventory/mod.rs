pub mod item;
pub mod loadout;
pub mod loadout_builder;
pub mod slot;

pub use item::{Item, ItemKind};
pub use loadout::Loadout;
pub use loadout_builder::LoadoutBuilder;
