//! Finite world resources: land for devices and the shared power pool.

use crate::config::WorldConfig;

/// Land accounting. `used` grows by a device's land cost each time
/// construction of one unit of that device begins.
#[derive(Debug, Clone, PartialEq)]
pub struct Land {
    pub total: f64,
    pub used: f64,
}

impl Land {
    pub fn new(total: f64) -> Self {
        Self { total, used: 0.0 }
    }

    pub fn free(&self) -> f64 {
        (self.total - self.used).max(0.0)
    }

    pub fn fits(&self, amount: f64) -> bool {
        amount <= self.free()
    }

    pub fn allocate(&mut self, amount: f64) {
        self.used += amount;
    }
}

/// Stored power drained by background device work.
#[derive(Debug, Clone, PartialEq)]
pub struct Power {
    pub stored: f64,
    pub max: f64,
    pub regen: f64,
}

impl Power {
    pub fn from_config(config: &WorldConfig) -> Self {
        Self {
            stored: config.power,
            max: config.max_power,
            regen: config.power_regen,
        }
    }

    pub fn regenerate(&mut self) {
        self.stored = (self.stored + self.regen).clamp(0.0, self.max);
    }

    pub fn has(&self, amount: f64) -> bool {
        self.stored + 1e-9 >= amount
    }

    pub fn draw(&mut self, amount: f64) {
        self.stored = (self.stored - amount).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn land_free_and_fits() {
        let mut land = Land::new(5.0);
        assert!(land.fits(5.0));
        land.allocate(3.0);
        assert_eq!(land.free(), 2.0);
        assert!(!land.fits(2.5));
    }

    #[test]
    fn power_regenerates_to_max() {
        let mut power = Power {
            stored: 9.0,
            max: 10.0,
            regen: 4.0,
        };
        power.regenerate();
        assert_eq!(power.stored, 10.0);
        power.draw(12.0);
        assert_eq!(power.stored, 0.0);
    }
}
