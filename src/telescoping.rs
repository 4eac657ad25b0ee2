//! Two-box telescoping search.
//!
//! When the padded item is longer than every box, two boxes with a compatible
//! cross-section can be slid into each other. The combined length is the sum of
//! both lengths minus the overlap.

use std::cmp::Ordering;

use log::debug;
use serde::Serialize;
use utoipa::ToSchema;

use crate::geometry::{
    Orientation, cross_section, cross_sections_nest, outer_cross_section, permutations,
};
use crate::model::ShippingBox;
use crate::optimizer::COST_WEIGHT;
use crate::types::{DISPLAY_DECIMALS, Dimensional, Dims, round_to, round_up_to};

/// Penalty per inch of overlap; longer overlaps waste inner length.
pub const OVERLAP_WEIGHT: f64 = 2.0;

/// Length kept free on the shorter box beyond the overlap.
const OVERLAP_MARGIN: f64 = 1.0;

const TELESCOPING_NOTE: &str =
    "Telescoping solution (two boxes). Ensure strong overlap and tape reinforcement along seam.";

/// One half of a telescoping pair.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct TelescopingBox {
    #[serde(rename = "box")]
    pub shipping_box: ShippingBox,
    pub rotation: Orientation,
    /// Box dimensions as laid out: length first, then the cross-section
    pub orientation: Dims,
}

/// Two boxes nested along their length axis.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct TelescopingSolution {
    /// Requirement in the rotation used: length along the seam, then cross-section
    pub required: Dims,
    #[schema(value_type = Vec<TelescopingBox>)]
    pub boxes: [TelescopingBox; 2],
    pub overlap: f64,
    pub combined_length_possible: f64,
    pub score: f64,
    pub note: String,
}

/// Best pair and the next best ones, ordered by score.
#[derive(Clone, Debug, PartialEq)]
pub struct TelescopingResult {
    pub best: TelescopingSolution,
    pub alternates: Vec<TelescopingSolution>,
}

/// Keeps the lowest-scoring entries seen so far, up to a fixed capacity.
///
/// Entries with equal scores stay in insertion order, so the first one found wins.
#[derive(Debug)]
pub struct RunnerUps<T> {
    capacity: usize,
    entries: Vec<(f64, T)>,
}

impl<T> RunnerUps<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity.saturating_add(1).min(64)),
        }
    }

    /// Whether an entry with `score` would currently be kept.
    pub fn admits(&self, score: f64) -> bool {
        self.entries.len() < self.capacity
            || self
                .entries
                .last()
                .is_some_and(|(worst, _)| score < *worst)
    }

    pub fn insert(&mut self, score: f64, value: T) {
        if self.capacity == 0 || !self.admits(score) {
            return;
        }
        let idx = self
            .entries
            .partition_point(|(existing, _)| {
                existing.partial_cmp(&score).unwrap_or(Ordering::Less) != Ordering::Greater
            });
        self.entries.insert(idx, (score, value));
        self.entries.truncate(self.capacity);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries best first.
    pub fn into_sorted_vec(self) -> Vec<T> {
        self.entries.into_iter().map(|(_, value)| value).collect()
    }
}

/// A box turned so that `dims.length` runs along the seam.
#[derive(Clone, Copy)]
struct OrientedBox<'a> {
    shipping_box: &'a ShippingBox,
    rotation: Orientation,
    dims: Dims,
}

impl OrientedBox<'_> {
    fn to_output(self) -> TelescopingBox {
        TelescopingBox {
            shipping_box: self.shipping_box.clone(),
            rotation: self.rotation,
            orientation: self.dims,
        }
    }
}

/// Every usable box in every rotation whose cross-section covers the requirement's.
fn oriented_candidates<'a>(boxes: &'a [ShippingBox], required: &Dims) -> Vec<OrientedBox<'a>> {
    let mut oriented = Vec::new();
    for shipping_box in boxes.iter().filter(|b| b.is_usable()) {
        for (rotation, dims) in permutations(shipping_box.dimensions()) {
            if dims.width >= required.width && dims.height >= required.height {
                oriented.push(OrientedBox {
                    shipping_box,
                    rotation,
                    dims,
                });
            }
        }
    }
    oriented
}

/// Scores one pair, or `None` if it cannot telescope to the required length.
fn evaluate_pair(
    a: &OrientedBox<'_>,
    b: &OrientedBox<'_>,
    required: &Dims,
    min_overlap: f64,
) -> Option<TelescopingSolution> {
    let section_a = cross_section(&a.dims);
    let section_b = cross_section(&b.dims);
    if !cross_sections_nest(section_a, section_b) {
        return None;
    }

    let overlap_cap = a.dims.length.min(b.dims.length) - OVERLAP_MARGIN;
    let overlap = min_overlap.min(overlap_cap);
    if !overlap.is_finite() || overlap < min_overlap {
        return None;
    }

    let max_combined_length = a.dims.length + b.dims.length - overlap;
    if max_combined_length < required.length {
        return None;
    }

    // The finished package only has to span the required length
    let (outer_a, outer_b) = outer_cross_section(section_a, section_b);
    let waste = required.length * outer_a * outer_b - required.volume();
    let cost_penalty = (a.shipping_box.cost_or_zero() + b.shipping_box.cost_or_zero()) * COST_WEIGHT;
    let score = waste + cost_penalty + overlap * OVERLAP_WEIGHT;

    Some(TelescopingSolution {
        required: *required,
        boxes: [a.to_output(), b.to_output()],
        overlap: round_to(overlap, DISPLAY_DECIMALS),
        combined_length_possible: round_up_to(max_combined_length, DISPLAY_DECIMALS),
        score,
        note: TELESCOPING_NOTE.to_string(),
    })
}

/// Searches all box pairs over all six choices of the length axis.
///
/// The overlap is always exactly `min_overlap`; longer overlaps are not explored.
/// Returns `None` when no pair reaches the required length.
pub fn find_telescoping_solution(
    boxes: &[ShippingBox],
    required: Dims,
    min_overlap: f64,
    max_alternates: usize,
) -> Option<TelescopingResult> {
    if !boxes.iter().any(ShippingBox::is_usable) {
        return None;
    }

    let mut ranked = RunnerUps::with_capacity(max_alternates.saturating_add(1));
    let mut pairs_checked = 0usize;

    for (_, req) in permutations(required) {
        let oriented = oriented_candidates(boxes, &req);
        for (i, a) in oriented.iter().enumerate() {
            for b in &oriented[i..] {
                pairs_checked += 1;
                if let Some(solution) = evaluate_pair(a, b, &req, min_overlap) {
                    if ranked.admits(solution.score) {
                        ranked.insert(solution.score, solution);
                    }
                }
            }
        }
    }

    debug!(
        "telescoping search: {} pairs checked, {} kept",
        pairs_checked,
        ranked.len()
    );

    let mut ordered = ranked.into_sorted_vec().into_iter();
    let best = ordered.next()?;
    Some(TelescopingResult {
        best,
        alternates: ordered.collect(),
    })
}
