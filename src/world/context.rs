//! Process-wide game state threaded into every command run and tick.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::catalog::Catalog;
use super::inventory::Inventory;
use super::player::Player;
use super::registry::ConstructionRegistry;
use super::resources::{Land, Power};
use crate::config::Config;
use crate::console::Console;
use crate::engine::{ActionHandle, ActionId, ActionLock, ActionMode, ScheduledAction, StopFlag, TimedAction};

pub const HOME_PROMPT: &str = "home$";

/// Shared handle used by the shell and the tick tasks.
pub type SharedContext = Arc<Mutex<GameContext>>;

pub struct GameContext {
    pub player: Player,
    pub inventory: Inventory,
    pub land: Land,
    pub power: Power,
    /// Built and partially built supports.
    pub support: ConstructionRegistry,
    /// Built and partially built devices.
    pub devices: ConstructionRegistry,
    /// Device the player is currently inside, if any.
    pub current_device: Option<String>,
    pub prompt: String,
    pub catalog: Arc<Catalog>,
    pub console: Console,
    pub lock: ActionLock,
    pub rng: StdRng,
    /// Bare-hand gathering stops after this many tries.
    pub hand_fatigue_ticks: u32,
    background: HashMap<String, ActionHandle>,
    pending: Vec<ScheduledAction>,
    next_action: u64,
}

impl GameContext {
    pub fn new(config: &Config, catalog: Arc<Catalog>) -> Self {
        let rng = match config.engine.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            player: Player::from_config(&config.player),
            inventory: Inventory::new(),
            land: Land::new(config.world.land),
            power: Power::from_config(&config.world),
            support: ConstructionRegistry::new(),
            devices: ConstructionRegistry::new(),
            current_device: None,
            prompt: HOME_PROMPT.to_string(),
            catalog,
            console: Console::new(config.console.wrap_width),
            lock: ActionLock::new(),
            rng,
            hand_fatigue_ticks: config.engine.hand_fatigue_ticks,
            background: HashMap::new(),
            pending: Vec::new(),
            next_action: 1,
        }
    }

    pub fn into_shared(self) -> SharedContext {
        Arc::new(Mutex::new(self))
    }

    /// Allocate a handle for a new action.
    pub fn new_handle(&mut self, label: &str, stop: StopFlag, stop_message: &str) -> ActionHandle {
        let id = ActionId(self.next_action);
        self.next_action += 1;
        ActionHandle::new(id, label, stop, stop_message)
    }

    /// Register an action and queue it for scheduling.
    ///
    /// Foreground actions take the action lock; background actions claim
    /// their device's slot. Returns false, queueing nothing, when the lock or
    /// the slot is already taken. `stamina_offset` is subtracted from the
    /// passive regeneration now and given back when the action finishes.
    pub fn begin(
        &mut self,
        handle: ActionHandle,
        mode: ActionMode,
        stamina_offset: f64,
        action: Box<dyn TimedAction>,
    ) -> bool {
        match &mode {
            ActionMode::Foreground => {
                if !self.lock.lock(handle.clone()) {
                    return false;
                }
            }
            ActionMode::Background { device } => {
                if self.background.contains_key(device) {
                    return false;
                }
                self.background.insert(device.clone(), handle.clone());
            }
        }
        info!("action {} started ({:?})", handle.label, mode);
        self.player.stamina_change -= stamina_offset;
        self.pending
            .push(ScheduledAction::new(handle, mode, stamina_offset, action));
        true
    }

    /// Actions queued since the last call, ready to hand to a scheduler.
    pub fn take_pending(&mut self) -> Vec<ScheduledAction> {
        std::mem::take(&mut self.pending)
    }

    pub fn background_job(&self, device: &str) -> Option<&ActionHandle> {
        self.background.get(device)
    }

    /// Stop the background job running in `device`, if any.
    pub fn stop_background(&mut self, device: &str) -> bool {
        match self.background.remove(device) {
            Some(handle) => {
                handle.stop(&mut self.console);
                true
            }
            None => false,
        }
    }

    /// Free the device slot if it is still held by `id`.
    pub fn release_background(&mut self, device: &str, id: ActionId) {
        if self.background.get(device).map(|h| h.id) == Some(id) {
            debug!("device {} is idle again", device);
            self.background.remove(device);
        }
    }

    /// Enter or leave a device and update the prompt to match.
    pub fn set_current_device(&mut self, device: Option<String>) {
        self.prompt = match &device {
            Some(id) => format!("{}$", id),
            None => HOME_PROMPT.to_string(),
        };
        self.current_device = device;
        self.console.set_prompt(&self.prompt);
    }

    /// Deterministic context over the embedded seed data.
    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        let mut config = Config::default();
        config.engine.rng_seed = Some(7);
        let catalog = Catalog::embedded().expect("embedded catalog");
        Self::new(&config, Arc::new(catalog))
    }
}
