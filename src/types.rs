//! Common types and traits for box geometry.
//!
//! Everything here is measured in inches. `Dims` is deliberately plain data so the
//! solver can permute, subtract and compare it freely.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Decimal places kept when a derived measurement is shown to a packer.
pub const DISPLAY_DECIMALS: i32 = 2;

/// Three-dimensional extent (length, width, height) in inches.
///
/// # Examples
/// ```
/// use boxfit::types::Dims;
///
/// let item = Dims::new(10.0, 8.0, 6.0);
/// assert_eq!(item.volume(), 480.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dims {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl Dims {
    #[inline]
    pub const fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Uniform extent on all three axes.
    #[inline]
    pub const fn splat(value: f64) -> Self {
        Self::new(value, value, value)
    }

    #[inline]
    pub const fn as_array(&self) -> [f64; 3] {
        [self.length, self.width, self.height]
    }

    /// Product of all three components.
    #[inline]
    pub fn volume(&self) -> f64 {
        self.length * self.width * self.height
    }

    /// Largest of the three components.
    #[inline]
    pub fn max_component(&self) -> f64 {
        self.length.max(self.width).max(self.height)
    }

    /// Checks if all components are positive and finite.
    #[inline]
    pub fn is_valid_dimension(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite() && *v > 0.0)
    }

    /// Checks if `self` fits inside `container` axis by axis, without rotation.
    ///
    /// Equality counts as a fit: a 12" requirement fits a 12" box side.
    #[inline]
    pub fn fits_within(&self, container: &Self) -> bool {
        self.length <= container.length
            && self.width <= container.width
            && self.height <= container.height
    }
}

impl Add for Dims {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.length + rhs.length,
            self.width + rhs.width,
            self.height + rhs.height,
        )
    }
}

impl Sub for Dims {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(
            self.length - rhs.length,
            self.width - rhs.width,
            self.height - rhs.height,
        )
    }
}

/// Trait for anything with a physical inner extent.
pub trait Dimensional {
    fn dimensions(&self) -> Dims;

    fn volume(&self) -> f64 {
        self.dimensions().volume()
    }
}

/// Rounds `value` to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rounds `value` up to `decimals` places. The result is never below `value`.
pub fn round_up_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    ((value * factor).ceil() / factor).max(value)
}
