//! Item, recipe and gather table catalogs.
//!
//! The catalogs are read-only lookup services loaded once from JSON seed
//! files. The default seeds under `data/seeds/` are compiled into the binary;
//! `[data] seeds_dir` in the config points at a directory with replacements.
//!
//! Recipe `input`/`output` maps and gather sub-tables are JSON objects. Recipe
//! outputs are produced in the order they are written, so the maps are read
//! into ordered vectors rather than hash maps.

use log::{debug, warn};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;

use super::inventory::Inventory;
use crate::errors::EngineError;

/// Key reserved for comments inside seed JSON objects.
pub const COMMENT_KEY: &str = "//";
/// Gather table key used when no tool is in hand.
pub const HAND_SPEC: &str = "hand";

const EMBEDDED_ITEMS: &str = include_str!("../../data/seeds/items.json");
const EMBEDDED_RECIPES: &str = include_str!("../../data/seeds/recipes.json");
const EMBEDDED_GATHERS: &str = include_str!("../../data/seeds/gathers.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    #[default]
    Item,
    Support,
    Device,
}

/// Marks an item as usable for gathering. Each gather tick that uses the
/// tool removes `wear` from its stack, so the stack size is its durability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolProfile {
    #[serde(default = "default_wear")]
    pub wear: f64,
}

fn default_wear() -> f64 {
    1.0
}

fn default_interactive() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: ItemCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolProfile>,
    /// Tag name to level, matched by `tag:` gather specifiers.
    #[serde(default)]
    pub tags: HashMap<String, f64>,
    /// Land consumed by one built unit (devices only).
    #[serde(default)]
    pub land: f64,
    /// Devices only: whether crafting inside the device occupies the player.
    #[serde(default = "default_interactive")]
    pub interactive: bool,
}

impl ItemDef {
    pub fn is_tool(&self) -> bool {
        self.tool.is_some()
    }

    pub fn tag_level(&self, tag: &str) -> Option<f64> {
        self.tags.get(tag).copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<ItemDef>,
    by_id: HashMap<String, usize>,
}

impl ItemCatalog {
    pub fn new(items: Vec<ItemDef>) -> Result<Self, EngineError> {
        let mut by_id = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            if by_id.insert(item.id.clone(), idx).is_some() {
                return Err(EngineError::InvalidData(format!(
                    "duplicate item id '{}'",
                    item.id
                )));
            }
        }
        Ok(Self { items, by_id })
    }

    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.by_id.get(id).map(|&idx| &self.items[idx])
    }

    /// Resolve a player-typed name. Matches the display name or the id,
    /// case-insensitively, with spaces and underscores interchangeable.
    pub fn find(&self, name: &str) -> Option<&ItemDef> {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return None;
        }
        self.items
            .iter()
            .find(|item| normalize_name(&item.name) == wanted || normalize_name(&item.id) == wanted)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemDef> {
        self.items.iter()
    }

    pub fn devices(&self) -> impl Iterator<Item = &ItemDef> {
        self.items
            .iter()
            .filter(|item| item.category == ItemCategory::Device)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Where a recipe can be crafted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecipeContext {
    Hand,
    Device(String),
}

impl RecipeContext {
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() || raw == HAND_SPEC {
            RecipeContext::Hand
        } else {
            RecipeContext::Device(raw.to_string())
        }
    }
}

impl fmt::Display for RecipeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeContext::Hand => write!(f, "{}", HAND_SPEC),
            RecipeContext::Device(id) => write!(f, "{}", id),
        }
    }
}

/// One recipe. `time` is the number of ticks per crafted unit; inputs,
/// stamina and power are consumed in equal slices across those ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub context: RecipeContext,
    pub time: u32,
    pub stamina: f64,
    pub power: f64,
    pub input: Vec<(String, f64)>,
    pub output: Vec<(String, f64)>,
}

impl Recipe {
    /// Share of the recipe consumed by a single tick.
    pub fn tick_fraction(&self) -> f64 {
        1.0 / self.time as f64
    }

    pub fn stamina_per_tick(&self) -> f64 {
        self.stamina / self.time as f64
    }

    pub fn power_per_tick(&self) -> f64 {
        self.power / self.time as f64
    }

    /// True when the inventory holds `fraction` of every input.
    pub fn can_craft(&self, inventory: &Inventory, fraction: f64) -> bool {
        self.input
            .iter()
            .all(|(id, qty)| inventory.has(id, qty * fraction))
    }

    /// Remove `fraction` of every input. Call [`Recipe::can_craft`] first.
    pub fn pull_from_inventory(&self, inventory: &mut Inventory, fraction: f64) {
        for (id, qty) in &self.input {
            inventory.reduce(id, qty * fraction);
        }
    }

    pub fn produces(&self, item_id: &str) -> bool {
        self.output.iter().any(|(id, _)| id == item_id)
    }
}

#[derive(Debug, Deserialize)]
struct RecipeSeed {
    #[serde(default)]
    context: String,
    time: u32,
    #[serde(default)]
    stamina: f64,
    #[serde(default)]
    power: f64,
    #[serde(default, deserialize_with = "ordered_amounts")]
    input: Vec<(String, f64)>,
    #[serde(deserialize_with = "ordered_amounts")]
    output: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

impl RecipeBook {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// First recipe in `context` whose outputs include `item_id`.
    pub fn find_by_output(&self, context: &RecipeContext, item_id: &str) -> Option<&Recipe> {
        self.recipes
            .iter()
            .find(|r| &r.context == context && r.produces(item_id))
    }

    pub fn for_context<'a>(&'a self, context: &'a RecipeContext) -> impl Iterator<Item = &'a Recipe> {
        self.recipes.iter().filter(move |r| &r.context == context)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

/// Gather table entry: a chance, or a `"//"` comment string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GatherEntry {
    Chance(f64),
    Comment(String),
}

/// Static gather data: tool specifier to `item id -> chance per tick`.
///
/// Comment keys are dropped while loading, both at the top level and inside
/// each sub-table.
#[derive(Debug, Clone, Default)]
pub struct GatherTable {
    specs: BTreeMap<String, BTreeMap<String, f64>>,
}

impl GatherTable {
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let parsed: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw)?;
        let mut specs = BTreeMap::new();
        for (spec, value) in parsed {
            if spec == COMMENT_KEY {
                continue;
            }
            let entries: BTreeMap<String, GatherEntry> = serde_json::from_value(value)?;
            let mut table = BTreeMap::new();
            for (item_id, entry) in entries {
                match entry {
                    GatherEntry::Chance(chance) if item_id != COMMENT_KEY => {
                        table.insert(item_id, chance);
                    }
                    GatherEntry::Chance(_) | GatherEntry::Comment(_) => {}
                }
            }
            specs.insert(spec, table);
        }
        Ok(Self { specs })
    }

    pub fn from_specs(specs: BTreeMap<String, BTreeMap<String, f64>>) -> Self {
        Self { specs }
    }

    pub fn hand(&self) -> Option<&BTreeMap<String, f64>> {
        self.specs.get(HAND_SPEC)
    }

    /// Every specifier except `hand`, in key order.
    pub fn tool_specs(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, f64>)> {
        self.specs.iter().filter(|(spec, _)| spec.as_str() != HAND_SPEC)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// All lookup catalogs, shared read-only by every command.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub items: ItemCatalog,
    pub recipes: RecipeBook,
    pub gathers: GatherTable,
}

impl Catalog {
    /// Load the seed files compiled into the binary.
    pub fn embedded() -> Result<Self, EngineError> {
        Self::from_json(EMBEDDED_ITEMS, EMBEDDED_RECIPES, EMBEDDED_GATHERS)
    }

    /// Load `items.json`, `recipes.json` and `gathers.json` from a directory.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, EngineError> {
        let dir = dir.as_ref();
        debug!("Loading seed data from {}", dir.display());
        let items = fs::read_to_string(dir.join("items.json"))?;
        let recipes = fs::read_to_string(dir.join("recipes.json"))?;
        let gathers = fs::read_to_string(dir.join("gathers.json"))?;
        Self::from_json(&items, &recipes, &gathers)
    }

    pub fn from_json(items: &str, recipes: &str, gathers: &str) -> Result<Self, EngineError> {
        let items: Vec<ItemDef> = serde_json::from_str(items)?;
        let seeds: Vec<RecipeSeed> = serde_json::from_str(recipes)?;
        let recipes = seeds
            .into_iter()
            .map(|seed| Recipe {
                context: RecipeContext::parse(&seed.context),
                time: seed.time,
                stamina: seed.stamina,
                power: seed.power,
                input: seed.input,
                output: seed.output,
            })
            .collect();
        let catalog = Catalog {
            items: ItemCatalog::new(items)?,
            recipes: RecipeBook::new(recipes),
            gathers: GatherTable::from_json(gathers)?,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Cross-check references between the three catalogs.
    pub fn validate(&self) -> Result<(), EngineError> {
        for recipe in &self.recipes.recipes {
            if recipe.time == 0 {
                return Err(EngineError::InvalidData(format!(
                    "recipe for {:?} has zero time",
                    recipe.output
                )));
            }
            if recipe.output.is_empty() {
                return Err(EngineError::InvalidData(
                    "recipe without outputs".to_string(),
                ));
            }
            if let RecipeContext::Device(device) = &recipe.context {
                match self.items.get(device) {
                    Some(item) if item.category == ItemCategory::Device => {}
                    _ => {
                        return Err(EngineError::InvalidData(format!(
                            "recipe context '{}' is not a device",
                            device
                        )))
                    }
                }
            }
            for (id, qty) in recipe.input.iter().chain(recipe.output.iter()) {
                if self.items.get(id).is_none() {
                    return Err(EngineError::InvalidData(format!(
                        "recipe references unknown item '{}'",
                        id
                    )));
                }
                if !qty.is_finite() || *qty <= 0.0 {
                    return Err(EngineError::InvalidData(format!(
                        "recipe amount for '{}' must be positive",
                        id
                    )));
                }
            }
        }
        if self.gathers.hand().is_none() {
            return Err(EngineError::InvalidData(
                "gather table has no 'hand' entry".to_string(),
            ));
        }
        for (spec, table) in &self.gathers.specs {
            for (id, chance) in table {
                if self.items.get(id).is_none() {
                    return Err(EngineError::InvalidData(format!(
                        "gather spec '{}' references unknown item '{}'",
                        spec, id
                    )));
                }
                if !(0.0..=1.0).contains(chance) {
                    warn!("gather chance for {} under {} is outside 0..=1", id, spec);
                }
            }
        }
        Ok(())
    }
}

/// Deserialize a JSON object of amounts into `(key, amount)` pairs, keeping
/// the order the keys were written in and skipping comment keys.
fn ordered_amounts<'de, D>(deserializer: D) -> Result<Vec<(String, f64)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedAmounts;

    impl<'de> Visitor<'de> for OrderedAmounts {
        type Value = Vec<(String, f64)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object of item ids to amounts")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(key) = map.next_key::<String>()? {
                if key == COMMENT_KEY {
                    map.next_value::<serde::de::IgnoredAny>()?;
                    continue;
                }
                let amount = map.next_value::<f64>()?;
                out.push((key, amount));
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(OrderedAmounts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEMS: &str = r#"[
        {"id": "wood", "name": "Wood"},
        {"id": "stone", "name": "Stone"},
        {"id": "stone_axe", "name": "Stone Axe", "tool": {}, "tags": {"axe": 1}},
        {"id": "kiln", "name": "Kiln", "category": "device", "land": 2, "interactive": false}
    ]"#;

    #[test]
    fn embedded_seed_data_loads() {
        let catalog = Catalog::embedded().expect("embedded catalog");
        assert!(!catalog.items.is_empty());
        assert!(!catalog.recipes.is_empty());
        assert!(catalog.gathers.hand().is_some());
    }

    #[test]
    fn recipe_outputs_keep_declaration_order() {
        let recipes = r#"[{"time": 2, "output": {"wood": 1, "//": "note", "stone": 2}}]"#;
        let gathers = r#"{"hand": {"wood": 0.1}}"#;
        let catalog = Catalog::from_json(ITEMS, recipes, gathers).unwrap();
        let recipe = catalog
            .recipes
            .find_by_output(&RecipeContext::Hand, "stone")
            .unwrap();
        let ids: Vec<&str> = recipe.output.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["wood", "stone"]);
    }

    #[test]
    fn comment_keys_never_reach_gather_tables() {
        let gathers = r#"{
            "//": "top level comment",
            "hand": {"//": "bare hands", "wood": 0.5},
            "tag:axe": {"wood": 0.7, "//": "axes"}
        }"#;
        let table = GatherTable::from_json(gathers).unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table.hand().unwrap().contains_key(COMMENT_KEY));
        for (_, sub) in table.tool_specs() {
            assert!(!sub.contains_key(COMMENT_KEY));
        }
    }

    #[test]
    fn find_matches_names_and_ids() {
        let catalog = ItemCatalog::new(serde_json::from_str(ITEMS).unwrap()).unwrap();
        assert_eq!(catalog.find("stone axe").unwrap().id, "stone_axe");
        assert_eq!(catalog.find("STONE_AXE").unwrap().id, "stone_axe");
        assert!(catalog.find("bronze axe").is_none());
        assert!(catalog.find("   ").is_none());
    }

    #[test]
    fn device_context_must_name_a_device() {
        let recipes = r#"[{"context": "stone", "time": 1, "output": {"wood": 1}}]"#;
        let gathers = r#"{"hand": {}}"#;
        let err = Catalog::from_json(ITEMS, recipes, gathers).unwrap_err();
        assert!(err.to_string().contains("not a device"));
    }

    #[test]
    fn missing_hand_table_is_rejected() {
        let err = Catalog::from_json(ITEMS, "[]", r#"{"tag:axe": {}}"#).unwrap_err();
        assert!(matches!(err, EngineError::InvalidData(_)));
    }

    #[test]
    fn fractional_crafting_checks() {
        let recipe = Recipe {
            context: RecipeContext::Hand,
            time: 4,
            stamina: 2.0,
            power: 0.0,
            input: vec![("wood".to_string(), 2.0)],
            output: vec![("stone".to_string(), 1.0)],
        };
        let mut inv = Inventory::default();
        inv.add("wood", 0.5);
        assert!(recipe.can_craft(&inv, recipe.tick_fraction()));
        recipe.pull_from_inventory(&mut inv, recipe.tick_fraction());
        assert!(!recipe.can_craft(&inv, recipe.tick_fraction()));
        assert_eq!(recipe.stamina_per_tick(), 0.5);
    }
}
