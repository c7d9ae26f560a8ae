use crate::config::PlayerConfig;

/// The player's stamina pool.
///
/// `stamina_change` is the passive regeneration applied once per tick by the
/// world clock. Timed actions lower it while they run and restore it when
/// they end, so a gathering player does not also regenerate at full rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub stamina: f64,
    pub max_stamina: f64,
    pub stamina_change: f64,
}

impl Player {
    pub fn new(stamina: f64, max_stamina: f64, stamina_change: f64) -> Self {
        Self {
            stamina,
            max_stamina,
            stamina_change,
        }
    }

    pub fn from_config(config: &PlayerConfig) -> Self {
        Self::new(config.stamina, config.max_stamina, config.stamina_regen)
    }

    /// Apply one tick of passive regeneration, clamped to `0..=max_stamina`.
    pub fn regenerate(&mut self) {
        self.stamina = (self.stamina + self.stamina_change).clamp(0.0, self.max_stamina);
    }

    pub fn spend(&mut self, amount: f64) {
        self.stamina = (self.stamina - amount).max(0.0);
    }
}
