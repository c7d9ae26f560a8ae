//! World state and the read-only lookup catalogs.

pub mod catalog;
pub mod context;
pub mod inventory;
pub mod player;
pub mod registry;
pub mod resources;

pub use catalog::{Catalog, ItemCategory, ItemDef, Recipe, RecipeContext};
pub use context::{GameContext, SharedContext, HOME_PROMPT};
pub use inventory::{Inventory, InventoryResult, ItemStack};
pub use player::Player;
pub use registry::ConstructionRegistry;
pub use resources::{Land, Power};
