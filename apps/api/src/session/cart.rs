use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// A purchasable plan (job-posting package, featured slot, ...) in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub plan_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

impl CartItem {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents.saturating_mul(i64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Adds an item. A plan already in the cart has its quantity increased;
    /// the stored name and price are kept.
    pub fn add(&mut self, item: CartItem) -> Result<(), AppError> {
        if item.plan_id.trim().is_empty() {
            return Err(AppError::Validation("plan_id must not be empty".to_string()));
        }
        if item.quantity == 0 {
            return Err(AppError::Validation("quantity must be at least 1".to_string()));
        }
        if item.unit_price_cents < 0 {
            return Err(AppError::Validation(
                "unit_price_cents must not be negative".to_string(),
            ));
        }

        match self.items.iter_mut().find(|i| i.plan_id == item.plan_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
        Ok(())
    }

    /// Removes a plan entirely. Returns `false` when it was not in the cart.
    pub fn remove(&mut self, plan_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.plan_id != plan_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn total_cents(&self) -> i64 {
        self.items
            .iter()
            .fold(0_i64, |acc, i| acc.saturating_add(i.line_total_cents()))
    }

    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, i| acc.saturating_add(i.quantity))
    }
}
