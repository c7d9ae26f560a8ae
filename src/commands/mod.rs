//! One-shot commands and the processors that group them.
//!
//! The root processor is active while the player is not inside a device.
//! Every device in the catalog gets its own processor, scoped to that
//! device's recipes.

pub mod device;
pub mod help;
pub mod inventory;
pub mod recipes;
pub mod status;

use std::sync::Arc;

use crate::construct::MakeCommand;
use crate::engine::{CommandProcessor, CommandRegistry};
use crate::errors::EngineError;
use crate::gather::GatherCommand;
use crate::world::{ItemDef, RecipeContext};

pub use device::{QuitCommand, UseCommand};
pub use help::HelpCommand;
pub use inventory::InventoryCommand;
pub use recipes::{RecipeCommand, RecipesCommand};
pub use status::StatusCommand;

/// Commands available outside of devices.
pub fn root_processor() -> Result<CommandProcessor, EngineError> {
    let help = Arc::new(HelpCommand::new()?);
    let mut registry = CommandRegistry::new();
    registry.add(help.clone());
    registry.alias("help", &["?", "h"])?;
    registry.add(Arc::new(GatherCommand::new()?));
    registry.add(Arc::new(MakeCommand::hand()?));
    registry.alias("make", &["build"])?;
    registry.add(Arc::new(InventoryCommand::new()));
    registry.alias("inventory", &["inv", "i"])?;
    registry.add(Arc::new(StatusCommand::new()));
    registry.add(Arc::new(RecipesCommand::new(RecipeContext::Hand)));
    registry.add(Arc::new(RecipeCommand::new(RecipeContext::Hand)?));
    registry.add(Arc::new(UseCommand::new()?));
    help.install(&registry);
    Ok(CommandProcessor::new(registry))
}

/// Commands available inside `device`.
pub fn device_processor(device: &ItemDef) -> Result<CommandProcessor, EngineError> {
    let context = RecipeContext::Device(device.id.clone());
    let help = Arc::new(HelpCommand::new()?);
    let mut registry = CommandRegistry::new();
    registry.add(help.clone());
    registry.alias("help", &["?", "h"])?;
    registry.add(Arc::new(QuitCommand::new()));
    registry.alias("quit", &["exit", "leave", "bye", "q"])?;
    registry.add(Arc::new(RecipesCommand::new(context.clone())));
    registry.add(Arc::new(RecipeCommand::new(context)?));
    registry.add(Arc::new(MakeCommand::for_device(device)?));
    registry.alias("make", &["build"])?;
    registry.add(Arc::new(InventoryCommand::new()));
    registry.alias("inventory", &["inv", "i"])?;
    help.install(&registry);
    Ok(CommandProcessor::new(registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CommandError, Output};
    use crate::world::{GameContext, HOME_PROMPT};

    fn texts(output: Output) -> Vec<String> {
        output.lines().into_iter().map(|line| line.text).collect()
    }

    #[test]
    fn help_lists_visible_commands() {
        let mut ctx = GameContext::for_tests();
        let root = root_processor().unwrap();
        let lines = texts(root.run(&mut ctx, "?").unwrap().unwrap());
        assert_eq!(lines[0], "Commands:");
        assert!(lines.contains(&"  {!b}gather{/}".to_string()));
        assert!(lines.contains(&"  {!b}use{/}".to_string()));

        let detail = texts(root.run(&mut ctx, "help build").unwrap().unwrap());
        assert!(detail[0].starts_with("make [qty] <item>"));
        assert_eq!(detail[1], "Also: build");
        assert_eq!(
            root.run(&mut ctx, "help dance"),
            Some(Err(CommandError::user("No help for 'dance'.")))
        );
    }

    #[test]
    fn use_requires_a_built_device() {
        let mut ctx = GameContext::for_tests();
        let root = root_processor().unwrap();
        assert_eq!(
            root.run(&mut ctx, "use the workbench"),
            Some(Err(CommandError::user("You don't have a workbench.")))
        );
        assert_eq!(
            root.run(&mut ctx, "use wood"),
            Some(Err(CommandError::user("You can't use the Wood like that.")))
        );

        ctx.devices.finish_construction("workbench");
        assert!(matches!(root.run(&mut ctx, "use workbench"), Some(Ok(_))));
        assert_eq!(ctx.current_device.as_deref(), Some("workbench"));
        assert_eq!(ctx.prompt, "workbench$");
    }

    #[test]
    fn device_quit_aliases_restore_home() {
        let mut ctx = GameContext::for_tests();
        let bench = ctx.catalog.items.get("workbench").cloned().unwrap();
        let device = device_processor(&bench).unwrap();
        for verb in ["quit", "exit", "leave", "bye", "q"] {
            ctx.set_current_device(Some("workbench".to_string()));
            let lines = texts(device.run(&mut ctx, verb).unwrap().unwrap());
            assert_eq!(lines, vec!["You stopped using the device."]);
            assert_eq!(ctx.prompt, HOME_PROMPT);
            assert!(ctx.current_device.is_none());
        }
    }

    #[test]
    fn recipes_follow_context() {
        let mut ctx = GameContext::for_tests();
        let kiln = ctx.catalog.items.get("kiln").cloned().unwrap();
        let device = device_processor(&kiln).unwrap();
        let lines = texts(device.run(&mut ctx, "recipes").unwrap().unwrap());
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("Brick"));

        let detail = texts(device.run(&mut ctx, "recipe brick").unwrap().unwrap());
        assert!(detail.contains(&"  Power: 5".to_string()));
        assert!(detail.contains(&"  Needs: 2 Clay".to_string()));
    }

    #[test]
    fn inventory_and_status_report_state() {
        let mut ctx = GameContext::for_tests();
        let root = root_processor().unwrap();
        assert_eq!(
            texts(root.run(&mut ctx, "i").unwrap().unwrap()),
            vec!["You aren't carrying anything."]
        );
        ctx.inventory.add("stone_axe", 20.0);
        let lines = texts(root.run(&mut ctx, "inv").unwrap().unwrap());
        assert_eq!(
            lines[1],
            "  {!item}Stone Axe{/} ({!qty}20{/}) {!dim}tool{/}"
        );

        ctx.support.start_construction("shelter");
        let status = texts(root.run(&mut ctx, "status").unwrap().unwrap());
        assert!(status[0].starts_with("Stamina: {!qty}50{/}/100"));
        assert!(status.contains(&"Structures:".to_string()));
        assert!(status
            .iter()
            .any(|line| line.contains("Shelter{/} x0 (one under construction, 0/10)")));
    }
}
