use crate::console::ConsoleLine;
use crate::engine::{Args, Command, Output, PatternSet, RunResult};
use crate::text::format_qty;
use crate::world::{ConstructionRegistry, GameContext};

/// `status`: stamina, land, power and structures.
pub struct StatusCommand {
    patterns: PatternSet,
}

impl StatusCommand {
    pub fn new() -> Self {
        Self {
            patterns: PatternSet::catch_all(),
        }
    }
}

impl Default for StatusCommand {
    fn default() -> Self {
        Self::new()
    }
}

fn structure_lines(ctx: &GameContext, registry: &ConstructionRegistry, lines: &mut Vec<ConsoleLine>) {
    for (id, record) in registry.iter() {
        let name = ctx
            .catalog
            .items
            .get(id)
            .map(|item| item.name.as_str())
            .unwrap_or(id);
        let mut text = format!("  {{!item}}{}{{/}} x{}", name, record.built);
        if let Some(progress) = record.in_progress {
            let time = ctx
                .catalog
                .recipes
                .for_context(&crate::world::RecipeContext::Hand)
                .find(|r| r.produces(id))
                .map(|r| r.time);
            match time {
                Some(time) => text.push_str(&format!(" (one under construction, {}/{})", progress, time)),
                None => text.push_str(" (one under construction)"),
            }
        }
        lines.push(ConsoleLine::plain(text));
    }
}

impl Command for StatusCommand {
    fn name(&self) -> &str {
        "status"
    }

    fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    fn run(&self, ctx: &mut GameContext, _args: &Args) -> RunResult {
        let mut lines = vec![
            ConsoleLine::plain(format!(
                "Stamina: {{!qty}}{}{{/}}/{} ({:+} per second)",
                format_qty(ctx.player.stamina.floor()),
                format_qty(ctx.player.max_stamina),
                ctx.player.stamina_change
            )),
            ConsoleLine::plain(format!(
                "Land: {} free of {}",
                format_qty(ctx.land.free()),
                format_qty(ctx.land.total)
            )),
            ConsoleLine::plain(format!(
                "Power: {}/{}",
                format_qty(ctx.power.stored.floor()),
                format_qty(ctx.power.max)
            )),
        ];
        if let Some(holder) = ctx.lock.holder() {
            lines.push(ConsoleLine::new(format!("Busy: {}", holder.label), "dim"));
        }
        if ctx.support.iter().next().is_some() || ctx.devices.iter().next().is_some() {
            lines.push(ConsoleLine::plain("Structures:"));
            structure_lines(ctx, &ctx.support, &mut lines);
            structure_lines(ctx, &ctx.devices, &mut lines);
        }
        Ok(Output::Lines(lines))
    }

    fn help(&self) -> Option<String> {
        Some("status - stamina, land, power and what you have built".to_string())
    }
}
