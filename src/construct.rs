//! Construction: `make`/`build` by hand and inside devices.
//!
//! A run crafts `qty` units of one recipe output, one tick at a time. Each
//! tick consumes `1/time` of the recipe's inputs, stamina and power; after
//! `time` productive ticks the outputs are credited in declared order and
//! the next unit starts.
//!
//! Supports and devices are tracked in the world's construction registries,
//! so a build interrupted by `stop` leaves an incomplete record behind. A
//! later `make` of the same id resumes from that record: progress is seeded
//! from it and no land is checked or allocated again.
//!
//! Shortfalls of stamina, power or inputs pause the run (the tick does
//! nothing and the loop keeps going). Running out of land for the next
//! device unit ends the run.

use log::{debug, info};

use crate::console::LineId;
use crate::engine::{
    ActionMode, Args, Command, CommandError, Output, PatternSet, RunResult, StopFlag, TickFlow,
    TimedAction,
};
use crate::errors::EngineError;
use crate::text::{progress_bar, with_article};
use crate::world::catalog::{ItemCategory, ItemDef, Recipe, RecipeContext};
use crate::world::{ConstructionRegistry, GameContext};

const BAR_WIDTH: usize = 20;
/// Largest batch a single `make` accepts.
pub const MAX_BATCH: u32 = 1000;
const MSG_TOO_MANY: &str = "That's too many to build at once.";
const MSG_STOPPED: &str = "You decided to take a break for now.";
const MSG_NO_ROOM: &str = "There's not enough room to build this.";
const MSG_OUT_OF_ROOM: &str = "You ran out of room, so you stopped building.";

/// How a make command runs its sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MakeMode {
    /// Locks input and drains the player's stamina.
    Interactive,
    /// Runs inside a device on stored power; input stays free.
    Background,
}

fn registry_mut(ctx: &mut GameContext, category: ItemCategory) -> Option<&mut ConstructionRegistry> {
    match category {
        ItemCategory::Item => None,
        ItemCategory::Support => Some(&mut ctx.support),
        ItemCategory::Device => Some(&mut ctx.devices),
    }
}

fn registry(ctx: &GameContext, category: ItemCategory) -> Option<&ConstructionRegistry> {
    match category {
        ItemCategory::Item => None,
        ItemCategory::Support => Some(&ctx.support),
        ItemCategory::Device => Some(&ctx.devices),
    }
}

/// State of one construction run.
#[derive(Debug)]
pub struct ConstructionSession {
    recipe: Recipe,
    item: ItemDef,
    desired: u32,
    crafted: u32,
    unit_progress: u32,
    progress: u32,
    stamina_drain: f64,
    power_drain: f64,
    resumed: bool,
    bar: Option<LineId>,
    stop: StopFlag,
}

impl ConstructionSession {
    pub fn item_id(&self) -> &str {
        &self.item.id
    }

    pub fn crafted(&self) -> u32 {
        self.crafted
    }

    pub fn desired(&self) -> u32 {
        self.desired
    }

    /// Ticks spent on the unit under construction.
    pub fn unit_progress(&self) -> u32 {
        self.unit_progress
    }

    /// Ticks spent across the whole run, seeded when resuming.
    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn stamina_drain(&self) -> f64 {
        self.stamina_drain
    }

    pub fn power_drain(&self) -> f64 {
        self.power_drain
    }

    pub fn is_resumed(&self) -> bool {
        self.resumed
    }

    fn bar_text(&self) -> String {
        format!(
            "{} {}/{}",
            progress_bar(
                u64::from(self.progress),
                u64::from(self.recipe.time) * u64::from(self.desired),
                BAR_WIDTH
            ),
            self.crafted,
            self.desired
        )
    }

    fn show_progress(&mut self, ctx: &mut GameContext) {
        let text = self.bar_text();
        match self.bar {
            Some(id) => ctx.console.update_line(id, text),
            None => self.bar = Some(ctx.console.append_line(text, "dim")),
        }
    }

    fn credit_outputs(&self, ctx: &mut GameContext) {
        for (id, qty) in &self.recipe.output {
            let category = ctx
                .catalog
                .items
                .get(id)
                .map(|item| item.category)
                .unwrap_or_default();
            match registry_mut(ctx, category) {
                Some(registry) => registry.finish_construction(id),
                None => {
                    ctx.inventory.add(id, *qty);
                }
            }
        }
    }

    /// Begin the next unit. Devices claim their land here; `false` means
    /// there was no room left.
    fn start_unit(&mut self, ctx: &mut GameContext) -> bool {
        let land = self.item.land;
        let category = self.item.category;
        if category == ItemCategory::Device {
            if !ctx.land.fits(land) {
                return false;
            }
            ctx.land.allocate(land);
        }
        if let Some(registry) = registry_mut(ctx, category) {
            registry.start_construction(&self.item.id);
        }
        true
    }
}

impl TimedAction for ConstructionSession {
    fn tick(&mut self, ctx: &mut GameContext) -> TickFlow {
        if self.stop.is_raised() {
            return TickFlow::Finish;
        }
        let fraction = self.recipe.tick_fraction();
        if ctx.player.stamina + 1e-9 < self.stamina_drain
            || !ctx.power.has(self.power_drain)
            || !self.recipe.can_craft(&ctx.inventory, fraction)
        {
            return TickFlow::Continue;
        }

        if self.stamina_drain > 0.0 {
            ctx.player.spend(self.stamina_drain);
        }
        if self.power_drain > 0.0 {
            ctx.power.draw(self.power_drain);
        }
        self.recipe.pull_from_inventory(&mut ctx.inventory, fraction);
        self.unit_progress += 1;
        self.progress += 1;
        if let Some(registry) = registry_mut(ctx, self.item.category) {
            registry.increment_progress(&self.item.id);
        }

        if self.unit_progress >= self.recipe.time {
            self.credit_outputs(ctx);
            self.crafted += 1;
            debug!(
                "crafted {} ({}/{})",
                self.item.id, self.crafted, self.desired
            );
            self.show_progress(ctx);
            if self.crafted >= self.desired {
                ctx.console.append_line(
                    format!("You've finished building the {}!", self.item.name),
                    "tip",
                );
                return TickFlow::Finish;
            }
            self.unit_progress = 0;
            if !self.start_unit(ctx) {
                ctx.console.append_line(MSG_OUT_OF_ROOM, "tip");
                return TickFlow::Finish;
            }
            return TickFlow::Continue;
        }
        self.show_progress(ctx);
        TickFlow::Continue
    }
}

/// `make [qty] <item>`, also reachable as `build`.
pub struct MakeCommand {
    context: RecipeContext,
    mode: MakeMode,
    patterns: PatternSet,
}

impl MakeCommand {
    fn with(context: RecipeContext, mode: MakeMode) -> Result<Self, EngineError> {
        let patterns = PatternSet::builder("make")
            .regex(r"(?P<qty>\d+)\s+(?P<name>.+)")
            .regex(r"(?:an?\s+)?(?P<name>.+)")
            .build()?;
        Ok(Self {
            context,
            mode,
            patterns,
        })
    }

    /// Crafting by hand, outside any device.
    pub fn hand() -> Result<Self, EngineError> {
        Self::with(RecipeContext::Hand, MakeMode::Interactive)
    }

    /// Crafting inside `device`. Non-interactive devices work in the
    /// background on stored power.
    pub fn for_device(device: &ItemDef) -> Result<Self, EngineError> {
        let mode = if device.interactive {
            MakeMode::Interactive
        } else {
            MakeMode::Background
        };
        Self::with(RecipeContext::Device(device.id.clone()), mode)
    }

    pub fn mode(&self) -> MakeMode {
        self.mode
    }

    fn action_mode(&self) -> ActionMode {
        match (&self.context, self.mode) {
            (RecipeContext::Device(device), MakeMode::Background) => ActionMode::Background {
                device: device.clone(),
            },
            _ => ActionMode::Foreground,
        }
    }

    /// Check that a run may start and set it up: resolve the item and
    /// recipe, decide between a new build and a resume, check land for new
    /// device builds and claim the first unit's land and registry record.
    ///
    /// Nothing is mutated when an error is returned.
    pub fn admit(
        &self,
        ctx: &mut GameContext,
        name: &str,
        qty: u32,
        stop: StopFlag,
    ) -> Result<ConstructionSession, CommandError> {
        match self.action_mode() {
            ActionMode::Foreground if ctx.lock.is_locked() => {
                return Err(CommandError::user("You are already busy."));
            }
            ActionMode::Background { device } if ctx.background_job(&device).is_some() => {
                return Err(CommandError::user(format!(
                    "The {} is already working on something.",
                    device_name(ctx, &device)
                )));
            }
            _ => {}
        }
        if qty == 0 {
            return Err(CommandError::user("You need to build at least one."));
        }
        if qty > MAX_BATCH {
            return Err(CommandError::user(MSG_TOO_MANY));
        }

        let cant_build = || CommandError::user(format!("You can't build {}.", with_article(name)));
        let item = ctx.catalog.items.find(name).cloned().ok_or_else(cant_build)?;
        let recipe = ctx
            .catalog
            .recipes
            .find_by_output(&self.context, &item.id)
            .cloned()
            .ok_or_else(cant_build)?;

        let make_new = !registry(ctx, item.category)
            .map(|registry| registry.has_incomplete(&item.id))
            .unwrap_or(false);
        if make_new
            && item.category == ItemCategory::Device
            && item.land * qty as f64 > ctx.land.free()
        {
            return Err(CommandError::user(MSG_NO_ROOM));
        }

        let seeded = if make_new {
            0
        } else {
            registry(ctx, item.category)
                .map(|registry| registry.progress(&item.id))
                .unwrap_or(0)
        };
        let (stamina_drain, power_drain) = match self.mode {
            MakeMode::Interactive => (recipe.stamina_per_tick(), recipe.power_per_tick()),
            MakeMode::Background => (0.0, recipe.power_per_tick()),
        };
        let mut session = ConstructionSession {
            recipe,
            item,
            desired: qty,
            crafted: 0,
            unit_progress: seeded,
            progress: seeded,
            stamina_drain,
            power_drain,
            resumed: !make_new,
            bar: None,
            stop,
        };
        if make_new {
            // land was checked for the whole batch above
            session.start_unit(ctx);
        }
        Ok(session)
    }
}

fn device_name(ctx: &GameContext, id: &str) -> String {
    ctx.catalog
        .items
        .get(id)
        .map(|item| item.name.clone())
        .unwrap_or_else(|| id.to_string())
}

impl Command for MakeCommand {
    fn name(&self) -> &str {
        "make"
    }

    fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    fn run(&self, ctx: &mut GameContext, args: &Args) -> RunResult {
        let name = args.get("name").ok_or(CommandError::Opaque)?;
        let qty = match args.get("qty") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| CommandError::user(MSG_TOO_MANY))?,
            None => 1,
        };

        let stop = StopFlag::new();
        let mut session = self.admit(ctx, name, qty, stop.clone())?;
        let opening = if session.is_resumed() {
            format!("You resumed construction of the {}.", session.item.name)
        } else {
            format!("You started building {}.", with_article(&session.item.name))
        };
        ctx.console.append_line(opening, "");
        session.show_progress(ctx);

        let label = format!("make {}", session.item.id);
        info!(
            "{} x{} ({}, resumed={})",
            label,
            qty,
            self.context,
            session.is_resumed()
        );
        let offset = session.stamina_drain;
        let handle = ctx.new_handle(&label, stop, MSG_STOPPED);
        if !ctx.begin(handle, self.action_mode(), offset, Box::new(session)) {
            return Err(CommandError::Opaque);
        }
        Ok(Output::None)
    }

    fn help(&self) -> Option<String> {
        let place = match &self.context {
            RecipeContext::Hand => "by hand".to_string(),
            RecipeContext::Device(device) => format!("in the {}", device),
        };
        Some(format!(
            "make [qty] <item> - build items {}; type stop to take a break and make it again to resume",
            place
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ScheduledAction;

    fn stocked() -> GameContext {
        let mut ctx = GameContext::for_tests();
        ctx.player.stamina = 100.0;
        ctx.player.stamina_change = 0.0;
        ctx
    }

    fn start(ctx: &mut GameContext, cmd: &MakeCommand, input: &str) -> RunResult {
        let args = cmd.patterns().matches(input).unwrap();
        cmd.run(ctx, &args)
    }

    fn single(ctx: &mut GameContext) -> ScheduledAction {
        let mut pending = ctx.take_pending();
        assert_eq!(pending.len(), 1);
        pending.remove(0)
    }

    #[test]
    fn three_units_take_six_ticks() {
        let mut ctx = stocked();
        ctx.inventory.add("wood", 3.0);
        let cmd = MakeCommand::hand().unwrap();
        assert_eq!(
            start(&mut ctx, &cmd, "3 sticks"),
            Err(CommandError::user("You can't build a sticks."))
        );
        assert_eq!(start(&mut ctx, &cmd, "3 stick"), Ok(Output::None));
        let mut action = single(&mut ctx);

        let mut credited = Vec::new();
        let mut tick = 0;
        loop {
            tick += 1;
            let before = ctx.inventory.quantity("stick");
            let flow = action.step(&mut ctx);
            if ctx.inventory.quantity("stick") > before {
                credited.push(tick);
            }
            if flow == TickFlow::Finish {
                break;
            }
        }
        assert_eq!(tick, 6);
        assert_eq!(credited, vec![2, 4, 6]);
        assert_eq!(ctx.inventory.quantity("stick"), 6.0);
        assert_eq!(ctx.inventory.quantity("wood"), 0.0);
        assert!(!ctx.lock.is_locked());
        assert_eq!(
            ctx.console.last().unwrap().text,
            "You've finished building the Stick!"
        );
    }

    #[test]
    fn shortfalls_pause_without_consuming() {
        let mut ctx = stocked();
        ctx.inventory.add("wood", 1.0);
        let cmd = MakeCommand::hand().unwrap();
        let mut session = cmd.admit(&mut ctx, "stick", 1, StopFlag::new()).unwrap();

        ctx.player.stamina = 0.1;
        assert_eq!(session.tick(&mut ctx), TickFlow::Continue);
        assert_eq!(session.unit_progress(), 0);
        assert_eq!(ctx.inventory.quantity("wood"), 1.0);

        ctx.player.stamina = 10.0;
        ctx.inventory.reduce("wood", 1.0);
        assert_eq!(session.tick(&mut ctx), TickFlow::Continue);
        assert_eq!(session.unit_progress(), 0);
        assert_eq!(ctx.player.stamina, 10.0);

        ctx.inventory.add("wood", 1.0);
        assert_eq!(session.tick(&mut ctx), TickFlow::Continue);
        assert_eq!(session.unit_progress(), 1);
        assert_eq!(ctx.player.stamina, 9.5);
        assert_eq!(ctx.inventory.quantity("wood"), 0.5);
    }

    #[test]
    fn batch_land_is_checked_up_front() {
        let mut ctx = stocked();
        ctx.land = crate::world::Land::new(1.0);
        let cmd = MakeCommand::hand().unwrap();
        assert_eq!(
            start(&mut ctx, &cmd, "2 workbench"),
            Err(CommandError::user(MSG_NO_ROOM))
        );
        assert_eq!(ctx.land.used, 0.0);
        assert!(!ctx.devices.has_incomplete("workbench"));
        assert!(!ctx.lock.is_locked());
    }

    #[test]
    fn land_shortfall_mid_batch_ends_the_run() {
        let mut ctx = stocked();
        ctx.land = crate::world::Land::new(2.0);
        ctx.inventory.add("wood", 12.0);
        ctx.inventory.add("stone", 4.0);
        ctx.inventory.add("rope", 2.0);
        let cmd = MakeCommand::hand().unwrap();
        let mut session = cmd.admit(&mut ctx, "workbench", 2, StopFlag::new()).unwrap();
        assert_eq!(ctx.land.used, 1.0);

        // something else claims the remaining land
        ctx.land.allocate(1.0);
        let mut flow = TickFlow::Continue;
        for _ in 0..8 {
            flow = session.tick(&mut ctx);
        }
        assert_eq!(flow, TickFlow::Finish);
        assert_eq!(session.crafted(), 1);
        assert_eq!(ctx.devices.built("workbench"), 1);
        assert!(!ctx.devices.has_incomplete("workbench"));
        // unit 2 never pulled its inputs
        assert_eq!(ctx.inventory.quantity("wood"), 6.0);
        assert_eq!(ctx.console.last().unwrap().text, MSG_OUT_OF_ROOM);
    }

    #[test]
    fn resume_seeds_progress_without_land_check() {
        let mut ctx = stocked();
        ctx.land = crate::world::Land::new(0.0);
        ctx.devices.start_construction("workbench");
        ctx.devices.increment_progress("workbench");
        ctx.devices.increment_progress("workbench");

        let cmd = MakeCommand::hand().unwrap();
        let session = cmd.admit(&mut ctx, "workbench", 1, StopFlag::new()).unwrap();
        assert!(session.is_resumed());
        assert_eq!(session.unit_progress(), 2);
        assert_eq!(session.progress(), 2);
        assert_eq!(ctx.land.used, 0.0);
        assert_eq!(ctx.devices.progress("workbench"), 2);
    }

    #[test]
    fn resume_uses_the_support_registry_for_supports() {
        let mut ctx = stocked();
        ctx.support.start_construction("shelter");
        ctx.support.increment_progress("shelter");
        let cmd = MakeCommand::hand().unwrap();
        let session = cmd.admit(&mut ctx, "shelter", 1, StopFlag::new()).unwrap();
        assert!(session.is_resumed());
        assert_eq!(session.progress(), 1);
    }

    #[test]
    fn stop_keeps_partial_progress_for_later() {
        let mut ctx = stocked();
        ctx.inventory.add("wood", 10.0);
        ctx.inventory.add("stick", 5.0);
        ctx.inventory.add("rope", 2.0);
        let cmd = MakeCommand::hand().unwrap();
        start(&mut ctx, &cmd, "shelter").unwrap();
        let mut action = single(&mut ctx);
        for _ in 0..3 {
            action.step(&mut ctx);
        }
        assert!(ctx.lock.stop_holder(&mut ctx.console));
        assert_eq!(action.step(&mut ctx), TickFlow::Finish);
        assert_eq!(ctx.support.progress("shelter"), 3);

        start(&mut ctx, &cmd, "shelter").unwrap();
        assert_eq!(
            ctx.console.texts().iter().rev().nth(1).map(String::as_str),
            Some("You resumed construction of the Shelter.")
        );
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut ctx = stocked();
        let cmd = MakeCommand::hand().unwrap();
        assert_eq!(
            start(&mut ctx, &cmd, "0 stick"),
            Err(CommandError::user("You need to build at least one."))
        );
    }

    #[test]
    fn oversized_batches_are_rejected() {
        let mut ctx = stocked();
        ctx.inventory.add("wood", 1.0);
        let cmd = MakeCommand::hand().unwrap();
        for input in ["3000000000 stick", "1001 stick", "99999999999 stick"] {
            assert_eq!(
                start(&mut ctx, &cmd, input),
                Err(CommandError::user(MSG_TOO_MANY))
            );
        }
        assert!(!ctx.lock.is_locked());
        assert!(ctx.take_pending().is_empty());

        assert_eq!(
            start(&mut ctx, &cmd, &format!("{} stick", MAX_BATCH)),
            Ok(Output::None)
        );
        let bar = ctx.console.last().unwrap().text.clone();
        assert_eq!(bar, format!("[--------------------] 0% 0/{}", MAX_BATCH));
    }

    /// Steps `session` once and checks the per-unit and cumulative counters.
    fn step_checked(session: &mut ConstructionSession, ctx: &mut GameContext) -> TickFlow {
        let time = session.recipe.time;
        let flow = session.tick(ctx);
        assert!(session.unit_progress() <= time);
        let expected = match flow {
            TickFlow::Finish => session.crafted() * time,
            TickFlow::Continue => session.crafted() * time + session.unit_progress(),
        };
        assert_eq!(session.progress(), expected);
        flow
    }

    #[test]
    fn progress_counts_whole_and_partial_units() {
        let mut ctx = stocked();
        ctx.inventory.add("wood", 3.0);
        let cmd = MakeCommand::hand().unwrap();
        let mut session = cmd.admit(&mut ctx, "stick", 3, StopFlag::new()).unwrap();
        assert_eq!(session.progress(), 0);

        // time 2: ends of units land on ticks 2, 4 and 6
        let mut seen = Vec::new();
        for _ in 0..6 {
            let flow = step_checked(&mut session, &mut ctx);
            seen.push((session.crafted(), session.unit_progress(), session.progress()));
            if flow == TickFlow::Finish {
                break;
            }
        }
        assert_eq!(
            seen,
            vec![(0, 1, 1), (1, 0, 2), (1, 1, 3), (2, 0, 4), (2, 1, 5), (3, 2, 6)]
        );
    }

    #[test]
    fn resumed_progress_counts_from_the_seed() {
        let mut ctx = stocked();
        ctx.inventory.add("wood", 20.0);
        ctx.inventory.add("stick", 10.0);
        ctx.inventory.add("rope", 4.0);
        ctx.support.start_construction("shelter");
        for _ in 0..4 {
            ctx.support.increment_progress("shelter");
        }
        let cmd = MakeCommand::hand().unwrap();
        let mut session = cmd.admit(&mut ctx, "shelter", 2, StopFlag::new()).unwrap();
        assert!(session.is_resumed());
        assert_eq!((session.unit_progress(), session.progress()), (4, 4));

        for _ in 0..6 {
            assert_eq!(step_checked(&mut session, &mut ctx), TickFlow::Continue);
        }
        assert_eq!(session.crafted(), 1);
        assert_eq!(session.progress(), 10);
        assert_eq!(ctx.support.built("shelter"), 1);

        for _ in 0..3 {
            assert_eq!(step_checked(&mut session, &mut ctx), TickFlow::Continue);
        }
        assert_eq!(session.progress(), 13);
        assert_eq!(session.unit_progress(), 3);
        assert_eq!(ctx.support.progress("shelter"), 3);
    }

    #[test]
    fn recipes_are_scoped_to_their_context() {
        let mut ctx = stocked();
        let hand = MakeCommand::hand().unwrap();
        assert_eq!(
            start(&mut ctx, &hand, "plank"),
            Err(CommandError::user("You can't build a plank."))
        );
        let bench = ctx.catalog.items.get("workbench").cloned().unwrap();
        let in_bench = MakeCommand::for_device(&bench).unwrap();
        ctx.inventory.add("wood", 2.0);
        assert_eq!(start(&mut ctx, &in_bench, "plank"), Ok(Output::None));
        assert!(ctx.lock.is_locked());
    }

    #[test]
    fn background_device_runs_on_power_without_lock() {
        let mut ctx = stocked();
        ctx.power.stored = 3.0;
        ctx.inventory.add("clay", 2.0);
        let kiln = ctx.catalog.items.get("kiln").cloned().unwrap();
        let cmd = MakeCommand::for_device(&kiln).unwrap();
        assert_eq!(cmd.mode(), MakeMode::Background);
        assert_eq!(start(&mut ctx, &cmd, "brick"), Ok(Output::None));
        assert!(!ctx.lock.is_locked());
        assert!(ctx.background_job("kiln").is_some());
        assert_eq!(
            start(&mut ctx, &cmd, "brick"),
            Err(CommandError::user("The Kiln is already working on something."))
        );

        let mut action = single(&mut ctx);
        let stamina = ctx.player.stamina;
        for _ in 0..3 {
            action.step(&mut ctx);
        }
        // 1 power per tick; the fourth tick waits for power
        assert_eq!(ctx.power.stored, 0.0);
        assert_eq!(action.step(&mut ctx), TickFlow::Continue);
        ctx.power.stored = 2.0;
        assert_eq!(action.step(&mut ctx), TickFlow::Continue);
        assert_eq!(action.step(&mut ctx), TickFlow::Finish);
        assert_eq!(ctx.inventory.quantity("brick"), 1.0);
        assert_eq!(ctx.player.stamina, stamina);
        assert!(ctx.background_job("kiln").is_none());
    }
}
