use crate::console::ConsoleLine;
use crate::engine::{Args, Command, CommandError, Output, PatternSet, RunResult};
use crate::errors::EngineError;
use crate::text::{format_qty, with_article};
use crate::world::{GameContext, Recipe, RecipeContext};

fn amounts(ctx: &GameContext, amounts: &[(String, f64)]) -> String {
    amounts
        .iter()
        .map(|(id, qty)| {
            let name = ctx
                .catalog
                .items
                .get(id)
                .map(|item| item.name.as_str())
                .unwrap_or(id);
            format!("{} {}", format_qty(*qty), name)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn summary(ctx: &GameContext, recipe: &Recipe) -> String {
    let inputs = if recipe.input.is_empty() {
        "nothing".to_string()
    } else {
        amounts(ctx, &recipe.input)
    };
    format!(
        "  {{!item}}{}{{/}} {{!dim}}<- {}, {}s{{/}}",
        amounts(ctx, &recipe.output),
        inputs,
        recipe.time
    )
}

/// `recipes`: everything buildable in the current context.
pub struct RecipesCommand {
    context: RecipeContext,
    patterns: PatternSet,
}

impl RecipesCommand {
    pub fn new(context: RecipeContext) -> Self {
        Self {
            context,
            patterns: PatternSet::catch_all(),
        }
    }
}

impl Command for RecipesCommand {
    fn name(&self) -> &str {
        "recipes"
    }

    fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    fn run(&self, ctx: &mut GameContext, _args: &Args) -> RunResult {
        let ctx: &GameContext = ctx;
        let mut lines: Vec<ConsoleLine> = ctx
            .catalog
            .recipes
            .for_context(&self.context)
            .map(|recipe| ConsoleLine::plain(summary(ctx, recipe)))
            .collect();
        if lines.is_empty() {
            return Ok(Output::text("There is nothing you can build here."));
        }
        lines.insert(0, ConsoleLine::plain("You can build:"));
        Ok(Output::Lines(lines))
    }

    fn help(&self) -> Option<String> {
        Some("recipes - list what can be built here".to_string())
    }
}

/// `recipe <item>`: details of one recipe.
pub struct RecipeCommand {
    context: RecipeContext,
    patterns: PatternSet,
}

impl RecipeCommand {
    pub fn new(context: RecipeContext) -> Result<Self, EngineError> {
        let patterns = PatternSet::builder("recipe")
            .regex(r"(?:an?\s+)?(?P<name>.+)")
            .build()?;
        Ok(Self { context, patterns })
    }
}

impl Command for RecipeCommand {
    fn name(&self) -> &str {
        "recipe"
    }

    fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    fn run(&self, ctx: &mut GameContext, args: &Args) -> RunResult {
        let ctx: &GameContext = ctx;
        let name = args.get("name").ok_or(CommandError::Opaque)?;
        let unknown = || {
            CommandError::user(format!(
                "There is no recipe for {} here.",
                with_article(name)
            ))
        };
        let item = ctx.catalog.items.find(name).ok_or_else(unknown)?;
        let recipe = ctx
            .catalog
            .recipes
            .find_by_output(&self.context, &item.id)
            .ok_or_else(unknown)?;

        let mut lines = vec![
            ConsoleLine::plain(format!("{{!item}}{}{{/}}", item.name)),
            ConsoleLine::plain(format!("  Time: {}s per unit", recipe.time)),
        ];
        if recipe.stamina > 0.0 {
            lines.push(ConsoleLine::plain(format!(
                "  Stamina: {}",
                format_qty(recipe.stamina)
            )));
        }
        if recipe.power > 0.0 {
            lines.push(ConsoleLine::plain(format!(
                "  Power: {}",
                format_qty(recipe.power)
            )));
        }
        if !recipe.input.is_empty() {
            lines.push(ConsoleLine::plain(format!(
                "  Needs: {}",
                amounts(ctx, &recipe.input)
            )));
        }
        lines.push(ConsoleLine::plain(format!(
            "  Makes: {}",
            amounts(ctx, &recipe.output)
        )));
        if item.land > 0.0 {
            lines.push(ConsoleLine::plain(format!(
                "  Land: {}",
                format_qty(item.land)
            )));
        }
        Ok(Output::Lines(lines))
    }

    fn help(&self) -> Option<String> {
        Some("recipe <item> - show what building an item takes".to_string())
    }
}
