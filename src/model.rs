//! Data models for box recommendation.
//!
//! This module defines the inputs the solver works on:
//! - `ShippingBox`: one stock box from the inventory
//! - `ItemDimensions`: the possibly incomplete measurements of an item
//! - `ItemEnvelope`: a validated item plus the padding it needs
//!
//! Validation happens here, at the boundary. The solver itself never rejects input;
//! it skips what it cannot use.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{Dimensional, Dims};

/// Validation error for inventory and item data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Invalid cost: {0}")]
    InvalidCost(String),
    #[error("Invalid padding: {0}")]
    InvalidPadding(String),
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),
}

fn validate_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidDimension(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

fn validate_dims(dims: &Dims, owner: &str) -> Result<(), ValidationError> {
    validate_dimension(dims.length, &format!("{owner} length"))?;
    validate_dimension(dims.width, &format!("{owner} width"))?;
    validate_dimension(dims.height, &format!("{owner} height"))?;
    Ok(())
}

/// Validates a weight in pounds.
pub fn validate_weight(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidWeight(format!(
            "Weight must be positive, got: {}",
            value
        )));
    }
    Ok(())
}

fn default_active() -> bool {
    true
}

/// A stock shipping box.
///
/// Dimensions are inner dimensions in inches. Inactive boxes stay in the inventory
/// but are never recommended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "medium",
    "name": "Medium",
    "length": 12.0,
    "width": 10.0,
    "height": 8.0,
    "cost": 1.25,
    "is_active": true
}))]
pub struct ShippingBox {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ShippingBox {
    /// Creates an active box after validating its dimensions.
    ///
    /// # Examples
    /// ```
    /// use boxfit::model::ShippingBox;
    ///
    /// assert!(ShippingBox::new("m", 12.0, 10.0, 8.0).is_ok());
    /// assert!(ShippingBox::new("m", -12.0, 10.0, 8.0).is_err());
    /// ```
    pub fn new(
        id: impl Into<String>,
        length: f64,
        width: f64,
        height: f64,
    ) -> Result<Self, ValidationError> {
        let b = Self {
            id: id.into(),
            name: None,
            length,
            width,
            height,
            cost: None,
            is_active: true,
        };
        b.validate()?;
        Ok(b)
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Full boundary check: positive finite dimensions and a non-negative cost.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_dims(&self.dimensions(), &format!("Box '{}'", self.id))?;
        if let Some(cost) = self.cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(ValidationError::InvalidCost(format!(
                    "Box '{}' cost must be non-negative, got: {}",
                    self.id, cost
                )));
            }
        }
        Ok(())
    }

    /// Whether the solver may consider this box at all.
    ///
    /// Malformed entries are skipped rather than failing the whole search.
    pub fn is_usable(&self) -> bool {
        self.is_active && self.dimensions().is_valid_dimension()
    }

    /// Cost used for scoring; absent or unusable costs count as zero.
    pub fn cost_or_zero(&self) -> f64 {
        match self.cost {
            Some(cost) if cost.is_finite() => cost,
            _ => 0.0,
        }
    }
}

impl Dimensional for ShippingBox {
    fn dimensions(&self) -> Dims {
        Dims::new(self.length, self.width, self.height)
    }
}

/// Measured item dimensions, any of which may still be missing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "length": 10.0, "width": 8.0, "height": 6.0 }))]
pub struct ItemDimensions {
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl ItemDimensions {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length: Some(length),
            width: Some(width),
            height: Some(height),
        }
    }

    /// All three dimensions, if present, finite and positive.
    pub fn complete(&self) -> Option<Dims> {
        let dims = Dims::new(self.length?, self.width?, self.height?);
        dims.is_valid_dimension().then_some(dims)
    }

    /// Like [`complete`](Self::complete) but says which dimension is wrong.
    pub fn validate(&self) -> Result<Dims, ValidationError> {
        let pick = |value: Option<f64>, name: &str| -> Result<f64, ValidationError> {
            let value = value.ok_or_else(|| {
                ValidationError::InvalidDimension(format!("Item {name} is missing"))
            })?;
            validate_dimension(value, &format!("Item {name}"))?;
            Ok(value)
        };
        Ok(Dims::new(
            pick(self.length, "length")?,
            pick(self.width, "width")?,
            pick(self.height, "height")?,
        ))
    }
}

/// An item with complete dimensions and the clearance it needs on every side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemEnvelope {
    item: Dims,
    padding_per_side: f64,
}

impl ItemEnvelope {
    /// Returns `None` when the item is incomplete. Negative or non-finite padding is
    /// treated as no padding.
    pub fn new(item: &ItemDimensions, padding_per_side: f64) -> Option<Self> {
        let item = item.complete()?;
        let padding_per_side = if padding_per_side.is_finite() {
            padding_per_side.max(0.0)
        } else {
            0.0
        };
        Some(Self {
            item,
            padding_per_side,
        })
    }

    /// Inner space the packaging must provide: item plus padding on both sides.
    pub fn required(&self) -> Dims {
        self.item + Dims::splat(self.padding_per_side * 2.0)
    }
}
