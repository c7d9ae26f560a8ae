// Build a device by hand, walk into it and craft with its recipes.

mod common;

use tickforge::console::{InputChannel, Submission};
use tickforge::world::{GameContext, HOME_PROMPT};

fn settle(ctx: &mut GameContext) -> u32 {
    let mut ticks = 0;
    for mut action in ctx.take_pending() {
        ticks += action.run_to_completion(ctx, 1000);
        assert!(action.is_finished());
    }
    ticks
}

#[test]
fn build_use_and_craft_at_workbench() {
    let config = common::test_config();
    let mut ctx = common::test_context(&config);
    let mut input = InputChannel::new(&ctx.catalog, 20).unwrap();
    ctx.inventory.add("wood", 10.0);
    ctx.inventory.add("stone", 2.0);
    ctx.inventory.add("rope", 1.0);

    assert_eq!(input.submit(&mut ctx, "build a workbench"), Submission::Dispatched);
    assert!(ctx.lock.is_locked());
    assert_eq!(settle(&mut ctx), 8);
    assert!(!ctx.lock.is_locked());
    assert_eq!(ctx.devices.built("workbench"), 1);
    assert_eq!(ctx.land.used, 1.0);
    assert_eq!(ctx.player.stamina, 46.0);
    assert_eq!(ctx.inventory.quantity("wood"), 4.0);
    assert!(!ctx.inventory.has("stone", 0.1));

    // not a recipe outside the workbench
    assert_eq!(input.submit(&mut ctx, "make plank"), Submission::Dispatched);
    assert_eq!(ctx.console.last().unwrap().text, "> You can't build a plank.");

    assert_eq!(input.submit(&mut ctx, "use workbench"), Submission::Dispatched);
    assert_eq!(ctx.prompt, "workbench$");

    assert_eq!(input.submit(&mut ctx, "make 2 plank"), Submission::Dispatched);
    assert_eq!(input.submit(&mut ctx, "inventory"), Submission::Busy);
    assert_eq!(settle(&mut ctx), 6);
    assert_eq!(ctx.inventory.quantity("plank"), 4.0);
    assert_eq!(ctx.inventory.quantity("stick"), 2.0);
    assert!(!ctx.inventory.has("wood", 0.1));
    assert_eq!(
        ctx.console.last().unwrap().text,
        "You've finished building the Plank!"
    );

    // device commands are gone once we leave
    assert_eq!(input.submit(&mut ctx, "quit"), Submission::Dispatched);
    assert_eq!(ctx.prompt, HOME_PROMPT);
    assert_eq!(input.submit(&mut ctx, "quit"), Submission::Unhandled);
}

#[test]
fn kiln_fires_bricks_in_the_background() {
    let mut config = common::test_config();
    config.world.power = 20.0;
    let mut ctx = common::test_context(&config);
    let mut input = InputChannel::new(&ctx.catalog, 20).unwrap();
    ctx.devices.finish_construction("kiln");
    ctx.inventory.add("clay", 4.0);

    assert_eq!(input.submit(&mut ctx, "use kiln"), Submission::Dispatched);
    assert_eq!(input.submit(&mut ctx, "make 2 brick"), Submission::Dispatched);
    assert!(!ctx.lock.is_locked());
    assert!(ctx.background_job("kiln").is_some());

    // the player is free while the kiln works
    assert_eq!(input.submit(&mut ctx, "make brick"), Submission::Dispatched);
    assert_eq!(
        ctx.console.last().unwrap().text,
        "> The Kiln is already working on something."
    );
    assert_eq!(settle(&mut ctx), 10);
    assert!(ctx.background_job("kiln").is_none());
    assert_eq!(ctx.inventory.quantity("brick"), 2.0);
    assert_eq!(ctx.power.stored, 10.0);
    assert_eq!(ctx.player.stamina, config.player.stamina);
}

#[test]
fn stop_then_resume_keeps_progress() {
    let config = common::test_config();
    let mut ctx = common::test_context(&config);
    let mut input = InputChannel::new(&ctx.catalog, 20).unwrap();
    ctx.inventory.add("wood", 10.0);
    ctx.inventory.add("stick", 5.0);
    ctx.inventory.add("rope", 2.0);

    assert_eq!(input.submit(&mut ctx, "build shelter"), Submission::Dispatched);
    let mut action = ctx.take_pending().remove(0);
    for _ in 0..4 {
        action.step(&mut ctx);
    }
    assert_eq!(input.submit(&mut ctx, "stop"), Submission::Stopped);
    action.step(&mut ctx);
    assert!(action.is_finished());
    assert_eq!(ctx.support.progress("shelter"), 4);
    assert_eq!(input.submit(&mut ctx, "status"), Submission::Dispatched);

    assert_eq!(input.submit(&mut ctx, "build shelter"), Submission::Dispatched);
    assert!(ctx
        .console
        .texts()
        .contains(&"You resumed construction of the Shelter.".to_string()));
    assert_eq!(settle(&mut ctx), 6);
    assert_eq!(ctx.support.built("shelter"), 1);
    assert!(!ctx.support.has_incomplete("shelter"));
}
