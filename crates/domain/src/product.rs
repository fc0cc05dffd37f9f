//! Product rows and the stock reservation rule.

use chrono::{DateTime, Utc};
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, Result};

/// A product as stored in `products`.
///
/// `quantity` is the number of units on hand. Storage does not constrain it;
/// [`Product::reserve`] is the only path that lowers it and never lets it
/// drop below zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub quantity: i32,
    pub category: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns true if at least `requested` units are on hand.
    pub fn has_stock_for(&self, requested: u32) -> bool {
        i64::from(self.quantity) >= i64::from(requested)
    }

    /// Returns a copy of this product with `requested` units taken out of stock.
    ///
    /// Every other field is carried over unchanged, so the result can be
    /// written back as a full-row replace.
    pub fn reserve(&self, requested: u32) -> Result<Product> {
        if !self.has_stock_for(requested) {
            return Err(DomainError::InsufficientStock {
                product_id: self.id,
                product_name: self.name.clone(),
                available: self.quantity,
                requested,
            });
        }

        // has_stock_for bounds requested by quantity, which fits in i32
        let remaining = self.quantity - requested as i32;
        Ok(Product {
            quantity: remaining,
            ..self.clone()
        })
    }
}

/// Fields for inserting a new product; id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Money,
    pub quantity: i32,
    pub category: String,
}

impl NewProduct {
    /// Creates a product payload with an empty description.
    pub fn new(
        name: impl Into<String>,
        price: Money,
        quantity: i32,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            quantity,
            category: category.into(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
