use crate::console::ConsoleLine;
use crate::engine::{Args, Command, Output, PatternSet, RunResult};
use crate::text::format_qty;
use crate::world::{GameContext, ItemCategory};

/// `inventory`: list carried stacks.
pub struct InventoryCommand {
    patterns: PatternSet,
}

impl InventoryCommand {
    pub fn new() -> Self {
        Self {
            patterns: PatternSet::catch_all(),
        }
    }
}

impl Default for InventoryCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for InventoryCommand {
    fn name(&self) -> &str {
        "inventory"
    }

    fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    fn run(&self, ctx: &mut GameContext, _args: &Args) -> RunResult {
        if ctx.inventory.is_empty() {
            return Ok(Output::text("You aren't carrying anything."));
        }
        let mut lines = vec![ConsoleLine::plain("Inventory:")];
        for stack in ctx.inventory.stacks() {
            let item = ctx.catalog.items.get(&stack.item_id);
            let name = item.map(|i| i.name.as_str()).unwrap_or(&stack.item_id);
            let note = match item {
                Some(i) if i.is_tool() => " {!dim}tool{/}",
                Some(i) if i.category != ItemCategory::Item => " {!dim}structure{/}",
                _ => "",
            };
            lines.push(ConsoleLine::plain(format!(
                "  {{!item}}{}{{/}} ({{!qty}}{}{{/}}){}",
                name,
                format_qty(stack.quantity),
                note
            )));
        }
        Ok(Output::Lines(lines))
    }

    fn help(&self) -> Option<String> {
        Some("inventory - show what you are carrying".to_string())
    }
}
