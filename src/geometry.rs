//! Orientation and containment helpers for rectangular boxes.
//!
//! A box can be turned so that any of its sides becomes the "length". Instead of
//! rotating every box the single-box search rotates the requirement, which covers the
//! same six cases.

use serde::Serialize;
use utoipa::ToSchema;

use crate::types::Dims;

/// Axis index triples for all six permutations of a 3-tuple, in enumeration order.
const AXIS_ORDER: [[usize; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// One of the six axis permutations of a box or requirement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Lwh,
    Lhw,
    Wlh,
    Whl,
    Hlw,
    Hwl,
}

impl Orientation {
    /// All orientations in enumeration order; ties in the searches resolve in this order.
    pub const ALL: [Orientation; 6] = [
        Orientation::Lwh,
        Orientation::Lhw,
        Orientation::Wlh,
        Orientation::Whl,
        Orientation::Hlw,
        Orientation::Hwl,
    ];

    fn axes(self) -> [usize; 3] {
        AXIS_ORDER[self as usize]
    }

    /// Reorders `dims` according to this permutation.
    pub fn apply(self, dims: Dims) -> Dims {
        let src = dims.as_array();
        let [a, b, c] = self.axes();
        Dims::new(src[a], src[b], src[c])
    }
}

/// Every permutation of `dims`, paired with the orientation that produced it.
pub fn permutations(dims: Dims) -> impl Iterator<Item = (Orientation, Dims)> {
    Orientation::ALL
        .into_iter()
        .map(move |orientation| (orientation, orientation.apply(dims)))
}

/// Per-axis remaining space when `required` sits inside `container` unrotated.
///
/// Returns `None` if any axis is too short.
pub fn slack(container: &Dims, required: &Dims) -> Option<Dims> {
    if required.fits_within(container) {
        Some(*container - *required)
    } else {
        None
    }
}

/// Cross-section of a box lying along its length axis: (width, height).
pub fn cross_section(dims: &Dims) -> (f64, f64) {
    (dims.width, dims.height)
}

/// Sorts a cross-section so the larger side comes first.
fn sorted_desc(section: (f64, f64)) -> (f64, f64) {
    if section.0 >= section.1 {
        section
    } else {
        (section.1, section.0)
    }
}

/// Checks whether one cross-section can slide inside the other, in either direction.
pub fn cross_sections_nest(a: (f64, f64), b: (f64, f64)) -> bool {
    let a = sorted_desc(a);
    let b = sorted_desc(b);
    let a_in_b = a.0 <= b.0 && a.1 <= b.1;
    let b_in_a = b.0 <= a.0 && b.1 <= a.1;
    a_in_b || b_in_a
}

/// Element-wise maximum of two cross-sections.
pub fn outer_cross_section(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    (a.0.max(b.0), a.1.max(b.1))
}
