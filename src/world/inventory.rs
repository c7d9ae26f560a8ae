//! Inventory management for the player.
//!
//! Quantities are fractional: construction pulls `amount / time` of every
//! input on each tick, and tool stacks lose their `wear` per gather tick.

use serde::{Deserialize, Serialize};

/// Amounts closer to zero than this are treated as an empty stack.
pub const QTY_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item_id: String,
    pub quantity: f64,
}

impl ItemStack {
    pub fn new(item_id: impl Into<String>, quantity: f64) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }
}

/// Result of an inventory mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryResult {
    Added { quantity: f64, stacked: bool },
    Removed { quantity: f64, remaining: f64 },
    Failed { reason: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    stacks: Vec<ItemStack>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stacks(&self) -> &[ItemStack] {
        &self.stacks
    }

    pub fn find_stack(&self, item_id: &str) -> Option<&ItemStack> {
        self.stacks.iter().find(|s| s.item_id == item_id)
    }

    /// Quantity held, zero when there is no stack.
    pub fn quantity(&self, item_id: &str) -> f64 {
        self.find_stack(item_id).map(|s| s.quantity).unwrap_or(0.0)
    }

    pub fn has(&self, item_id: &str, quantity: f64) -> bool {
        self.quantity(item_id) + QTY_EPSILON >= quantity
    }

    /// Add to an existing stack or start a new one.
    pub fn add(&mut self, item_id: &str, quantity: f64) -> InventoryResult {
        if quantity <= 0.0 || !quantity.is_finite() {
            return InventoryResult::Failed {
                reason: "Cannot add a non-positive amount".to_string(),
            };
        }

        if let Some(stack) = self.stacks.iter_mut().find(|s| s.item_id == item_id) {
            stack.quantity += quantity;
            return InventoryResult::Added {
                quantity,
                stacked: true,
            };
        }

        self.stacks.push(ItemStack::new(item_id, quantity));
        InventoryResult::Added {
            quantity,
            stacked: false,
        }
    }

    /// Take up to `quantity` from a stack. A stack that reaches zero is
    /// removed; the returned `remaining` may be zero in that case.
    pub fn reduce(&mut self, item_id: &str, quantity: f64) -> InventoryResult {
        if quantity <= 0.0 || !quantity.is_finite() {
            return InventoryResult::Failed {
                reason: "Cannot remove a non-positive amount".to_string(),
            };
        }

        let Some(index) = self.stacks.iter().position(|s| s.item_id == item_id) else {
            return InventoryResult::Failed {
                reason: "Item not in inventory".to_string(),
            };
        };

        let stack = &mut self.stacks[index];
        if quantity + QTY_EPSILON >= stack.quantity {
            let removed = stack.quantity;
            self.stacks.remove(index);
            InventoryResult::Removed {
                quantity: removed,
                remaining: 0.0,
            }
        } else {
            stack.quantity -= quantity;
            InventoryResult::Removed {
                quantity,
                remaining: stack.quantity,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}
