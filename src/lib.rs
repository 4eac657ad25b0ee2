//! Shipping box recommendation engine.
//!
//! Given an inventory of boxes and an item's dimensions plus required padding, finds
//! the best fitting box, suggests a height cut-down, or falls back to a two-box
//! telescoping construction.

pub mod api;
pub mod config;
pub mod geometry;
pub mod guidelines;
pub mod model;
pub mod optimizer;
pub mod store;
pub mod telescoping;
pub mod types;
