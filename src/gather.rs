//! Resource gathering: the `gather` command and its per-tick session.
//!
//! Overview
//! - `gather` uses bare hands, `gather with a <tool>` uses a tool stack from the inventory
//! - One stamina per tick; each table entry is rolled independently, so a tick can find nothing or several items
//! - Tools lose their `wear` from the stack on every tick and break when the stack runs out
//! - Bare-hand gathering stops on its own after `hand_fatigue_ticks` tries
//!
//! Gather tables are keyed by tool specifier:
//! - `hand` - used when no tool is in hand, and as the fallback when no specifier matches the tool
//! - `<item id>` - matches exactly that tool
//! - `tag:<name>` - matches any tool carrying the tag
//! - `tag:<name>[min,max)` - matches tools whose tag level falls in the range; `[`/`]` are
//!   inclusive, `(`/`)` exclusive, and either bound may be left empty
//!
//! Every specifier matching the tool contributes its entries; an item listed under several
//! matching specifiers gets the highest chance among them.

use log::{debug, info, warn};
use rand::Rng;
use regex::Regex;
use std::collections::BTreeMap;
use std::ops::{Bound, RangeBounds};
use std::sync::OnceLock;

use crate::console::LineId;
use crate::engine::{
    ActionMode, Args, Command, CommandError, Output, PatternSet, RunResult, StopFlag, TickFlow,
    TimedAction,
};
use crate::errors::EngineError;
use crate::text::{format_qty, with_article};
use crate::world::catalog::{GatherTable, ItemDef, COMMENT_KEY, HAND_SPEC};
use crate::world::inventory::QTY_EPSILON;
use crate::world::GameContext;

const MSG_OUT_OF_STAMINA: &str = "Stopped gathering items because you ran out of stamina.";
const MSG_TOOL_BROKE: &str = "Your tool broke, stopped gathering items.";
const MSG_FATIGUE: &str = "Your hands are getting dirty and chapped, so you stopped.";
const MSG_STOPPED: &str = "You stopped gathering items.";

/// Level bounds of a `tag:` specifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelRange {
    pub min: Bound<f64>,
    pub max: Bound<f64>,
}

impl LevelRange {
    pub fn contains(&self, level: f64) -> bool {
        (self.min, self.max).contains(&level)
    }
}

/// A parsed gather table key.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolSpec {
    Hand,
    Item(String),
    Tag {
        name: String,
        range: Option<LevelRange>,
    },
}

fn tag_spec() -> Option<&'static Regex> {
    static TAG: OnceLock<Option<Regex>> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(
            r"^tag:([A-Za-z0-9_-]+)(?:([\[(])\s*(-?[0-9]*\.?[0-9]*)\s*,\s*(-?[0-9]*\.?[0-9]*)\s*([\])]))?$",
        )
        .map_err(|e| warn!("tag specifier pattern failed to compile: {}", e))
        .ok()
    })
    .as_ref()
}

fn parse_bound(raw: &str, inclusive: bool) -> Option<Bound<f64>> {
    if raw.is_empty() {
        return Some(Bound::Unbounded);
    }
    let value: f64 = raw.parse().ok()?;
    Some(if inclusive {
        Bound::Included(value)
    } else {
        Bound::Excluded(value)
    })
}

impl ToolSpec {
    /// Parse a gather table key. Malformed `tag:` keys yield `None`.
    pub fn parse(key: &str) -> Option<Self> {
        if key == HAND_SPEC {
            return Some(ToolSpec::Hand);
        }
        if !key.starts_with("tag:") {
            return Some(ToolSpec::Item(key.to_string()));
        }
        let caps = tag_spec()?.captures(key)?;
        let name = caps[1].to_string();
        let range = match (caps.get(2), caps.get(3), caps.get(4), caps.get(5)) {
            (Some(open), Some(min), Some(max), Some(close)) => Some(LevelRange {
                min: parse_bound(min.as_str(), open.as_str() == "[")?,
                max: parse_bound(max.as_str(), close.as_str() == "]")?,
            }),
            _ => None,
        };
        Some(ToolSpec::Tag { name, range })
    }

    pub fn matches(&self, tool: &ItemDef) -> bool {
        match self {
            ToolSpec::Hand => false,
            ToolSpec::Item(id) => *id == tool.id,
            ToolSpec::Tag { name, range } => match (tool.tag_level(name), range) {
                (Some(level), Some(range)) => range.contains(level),
                (Some(_), None) => true,
                (None, _) => false,
            },
        }
    }
}

/// Build the item -> chance table for one session.
pub fn effective_table(gathers: &GatherTable, tool: Option<&ItemDef>) -> BTreeMap<String, f64> {
    let hand = || {
        gathers
            .hand()
            .map(|table| without_comments(table.clone()))
            .unwrap_or_default()
    };
    let Some(tool) = tool else {
        return hand();
    };

    let mut merged: BTreeMap<String, f64> = BTreeMap::new();
    for (key, table) in gathers.tool_specs() {
        let Some(spec) = ToolSpec::parse(key) else {
            warn!("ignoring malformed gather specifier {}", key);
            continue;
        };
        if !spec.matches(tool) {
            continue;
        }
        for (item_id, chance) in table {
            if item_id == COMMENT_KEY {
                continue;
            }
            let entry = merged.entry(item_id.clone()).or_insert(*chance);
            *entry = entry.max(*chance);
        }
    }
    if merged.is_empty() {
        debug!("no gather specifier matches {}; using bare hands", tool.id);
        return hand();
    }
    merged
}

fn without_comments(mut table: BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    table.remove(COMMENT_KEY);
    table
}

/// The tool stack a session wears down.
#[derive(Debug, Clone, PartialEq)]
pub struct GatherTool {
    pub item_id: String,
    pub wear: f64,
}

#[derive(Debug)]
struct Found {
    item_id: String,
    quantity: f64,
    line: LineId,
}

/// State of one gathering run.
#[derive(Debug)]
pub struct GatherSession {
    tool: Option<GatherTool>,
    table: BTreeMap<String, f64>,
    tries: u32,
    found: Vec<Found>,
    header_shown: bool,
    stop: StopFlag,
}

impl GatherSession {
    pub fn new(table: BTreeMap<String, f64>, tool: Option<GatherTool>, stop: StopFlag) -> Self {
        Self {
            tool,
            table,
            tries: 0,
            found: Vec::new(),
            header_shown: false,
            stop,
        }
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    pub fn table(&self) -> &BTreeMap<String, f64> {
        &self.table
    }

    /// Quantity of `item_id` found so far in this session.
    pub fn found(&self, item_id: &str) -> f64 {
        self.found
            .iter()
            .find(|f| f.item_id == item_id)
            .map(|f| f.quantity)
            .unwrap_or(0.0)
    }

    fn credit(&mut self, ctx: &mut GameContext, item_id: &str) {
        ctx.inventory.add(item_id, 1.0);
        if !self.header_shown {
            ctx.console.append_line("Found:", "");
            self.header_shown = true;
        }
        let name = ctx
            .catalog
            .items
            .get(item_id)
            .map(|item| item.name.clone())
            .unwrap_or_else(|| item_id.to_string());
        match self.found.iter_mut().find(|f| f.item_id == item_id) {
            Some(found) => {
                found.quantity += 1.0;
                let text = found_line(&name, found.quantity);
                ctx.console.update_line(found.line, text);
            }
            None => {
                let line = ctx.console.append_line(found_line(&name, 1.0), "");
                self.found.push(Found {
                    item_id: item_id.to_string(),
                    quantity: 1.0,
                    line,
                });
            }
        }
    }
}

fn found_line(name: &str, quantity: f64) -> String {
    format!("  {} ({{!qty}}{}{{/}})", name, format_qty(quantity))
}

impl TimedAction for GatherSession {
    fn tick(&mut self, ctx: &mut GameContext) -> TickFlow {
        if self.stop.is_raised() {
            return TickFlow::Finish;
        }
        if ctx.player.stamina < 1.0 {
            ctx.console.append_line(MSG_OUT_OF_STAMINA, "tip");
            return TickFlow::Finish;
        }
        if let Some(tool) = &self.tool {
            if ctx.inventory.quantity(&tool.item_id) < 1.0 {
                ctx.console.append_line(MSG_TOOL_BROKE, "tip");
                return TickFlow::Finish;
            }
        }

        self.tries += 1;
        if self.tool.is_none() && self.tries >= ctx.hand_fatigue_ticks {
            ctx.console.append_line(MSG_FATIGUE, "tip");
            return TickFlow::Finish;
        }

        ctx.player.spend(1.0);
        let hits: Vec<String> = self
            .table
            .iter()
            .filter(|(_, chance)| ctx.rng.gen::<f64>() < **chance)
            .map(|(item_id, _)| item_id.clone())
            .collect();
        for item_id in &hits {
            self.credit(ctx, item_id);
        }
        debug!("gather try {}: {} hit(s)", self.tries, hits.len());

        if let Some(tool) = &self.tool {
            ctx.inventory.reduce(&tool.item_id, tool.wear);
            if ctx.inventory.quantity(&tool.item_id) <= QTY_EPSILON {
                ctx.console.append_line(MSG_TOOL_BROKE, "tip");
                return TickFlow::Finish;
            }
        }
        TickFlow::Continue
    }
}

/// `gather [with a <tool>]`
pub struct GatherCommand {
    patterns: PatternSet,
}

impl GatherCommand {
    pub fn new() -> Result<Self, EngineError> {
        let patterns = PatternSet::builder("gather")
            .regex(r"with\s+(?:a|an)\s+(?P<tool>.+)")
            .regex(r"with\s+(?P<tool>.+)")
            .regex(r"(?P<tool>.+)")
            .catch_all()
            .build()?;
        Ok(Self { patterns })
    }

    fn resolve_tool(ctx: &GameContext, name: &str) -> Result<ItemDef, CommandError> {
        let missing = || CommandError::user(format!("You don't have {}.", with_article(name)));
        let item = ctx.catalog.items.find(name).ok_or_else(missing)?;
        if ctx.inventory.find_stack(&item.id).is_none() {
            return Err(missing());
        }
        if !item.is_tool() {
            return Err(CommandError::user(format!("The {} is not a tool.", item.name)));
        }
        Ok(item.clone())
    }
}

impl Command for GatherCommand {
    fn name(&self) -> &str {
        "gather"
    }

    fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    fn run(&self, ctx: &mut GameContext, args: &Args) -> RunResult {
        let tool = match args.get("tool") {
            Some(name) => Some(Self::resolve_tool(ctx, name)?),
            None => None,
        };
        let table = effective_table(&ctx.catalog.gathers, tool.as_ref());
        let gather_tool = tool.as_ref().map(|item| GatherTool {
            item_id: item.id.clone(),
            wear: item.tool.as_ref().map(|t| t.wear).unwrap_or(1.0),
        });

        let stop = StopFlag::new();
        let session = GatherSession::new(table, gather_tool, stop.clone());
        let handle = ctx.new_handle("gather", stop, MSG_STOPPED);
        if !ctx.begin(handle, ActionMode::Foreground, 1.0, Box::new(session)) {
            return Err(CommandError::user("You are already busy."));
        }

        let opening = match &tool {
            Some(item) => format!(
                "Gathering materials with {}. Type {{!b}}stop{{/}} to finish.",
                with_article(&item.name)
            ),
            None => "Gathering materials with your bare hands. Type {!b}stop{/} to finish."
                .to_string(),
        };
        ctx.console.append_line(opening, "");
        info!(
            "gather started with {}",
            tool.as_ref().map(|t| t.id.as_str()).unwrap_or("bare hands")
        );
        Ok(Output::None)
    }

    fn help(&self) -> Option<String> {
        Some(
            "gather [with a <tool>] - search for materials until you stop, run out of \
             stamina or your tool breaks"
                .to_string(),
        )
    }
}
