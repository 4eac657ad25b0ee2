//! Box recommendation logic.
//!
//! Picks the box that holds a padded item with the least waste:
//! - rotation-aware single-box fit and scoring
//! - a height cut-down suggestion for the chosen box
//! - a two-box telescoping fallback when nothing fits on its own
//!
//! Every function here is pure. The inventory is read as a snapshot and nothing is
//! retained between calls.

use std::cmp::Ordering;

use log::debug;
use serde::Serialize;
use utoipa::ToSchema;

use crate::geometry::{Orientation, permutations, slack};
use crate::model::{ItemDimensions, ItemEnvelope, ShippingBox};
use crate::telescoping::{TelescopingSolution, find_telescoping_solution};
use crate::types::{DISPLAY_DECIMALS, Dimensional, Dims, round_to};

/// Weight of the largest single-axis slack in the single-box score.
pub const SLACK_WEIGHT: f64 = 10.0;
/// Weight of box cost in every score. Cost only breaks near-ties.
pub const COST_WEIGHT: f64 = 50.0;

const CUT_DOWN_NOTE: &str =
    "Suggested cut-down (height). Leave enough material for proper closure and taping.";

/// Settings for a single recommendation run.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolverOptions {
    /// Maximum number of alternatives returned next to the best solution
    pub max_alternates: usize,
    /// Whether a height cut-down may be suggested for the chosen box
    pub allow_cut_down: bool,
    /// Whether the two-box fallback runs when no single box fits
    pub allow_telescoping: bool,
    /// Length both telescoping boxes overlap by, in inches
    pub telescoping_min_overlap: f64,
    /// Extra height left above the requirement for the flaps when cutting down
    pub flap_tolerance: f64,
    /// Smallest height reduction worth cutting
    pub min_cut_excess: f64,
}

impl SolverOptions {
    pub const DEFAULT_MAX_ALTERNATES: usize = 2;
    pub const DEFAULT_ALLOW_CUT_DOWN: bool = true;
    pub const DEFAULT_ALLOW_TELESCOPING: bool = true;
    pub const DEFAULT_TELESCOPING_MIN_OVERLAP: f64 = 6.0;
    pub const DEFAULT_FLAP_TOLERANCE: f64 = 0.25;
    pub const DEFAULT_MIN_CUT_EXCESS: f64 = 0.75;

    pub fn builder() -> SolverOptionsBuilder {
        SolverOptionsBuilder::default()
    }
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_alternates: Self::DEFAULT_MAX_ALTERNATES,
            allow_cut_down: Self::DEFAULT_ALLOW_CUT_DOWN,
            allow_telescoping: Self::DEFAULT_ALLOW_TELESCOPING,
            telescoping_min_overlap: Self::DEFAULT_TELESCOPING_MIN_OVERLAP,
            flap_tolerance: Self::DEFAULT_FLAP_TOLERANCE,
            min_cut_excess: Self::DEFAULT_MIN_CUT_EXCESS,
        }
    }
}

/// Builder for [`SolverOptions`].
#[derive(Clone, Debug, Default)]
pub struct SolverOptionsBuilder {
    options: SolverOptions,
}

impl SolverOptionsBuilder {
    pub fn max_alternates(mut self, count: usize) -> Self {
        self.options.max_alternates = count;
        self
    }

    pub fn allow_cut_down(mut self, allow: bool) -> Self {
        self.options.allow_cut_down = allow;
        self
    }

    pub fn allow_telescoping(mut self, allow: bool) -> Self {
        self.options.allow_telescoping = allow;
        self
    }

    pub fn telescoping_min_overlap(mut self, overlap: f64) -> Self {
        self.options.telescoping_min_overlap = overlap;
        self
    }

    pub fn flap_tolerance(mut self, tolerance: f64) -> Self {
        self.options.flap_tolerance = tolerance;
        self
    }

    pub fn min_cut_excess(mut self, excess: f64) -> Self {
        self.options.min_cut_excess = excess;
        self
    }

    pub fn build(self) -> SolverOptions {
        self.options
    }
}

/// Rotation used for a fit: the permuted requirement against the box as stocked.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct FitOrientation {
    pub rotation: Orientation,
    pub required: Dims,
    #[serde(rename = "box")]
    pub box_dims: Dims,
}

/// A successful match of one box against the required envelope.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct Fit {
    pub orientation: FitOrientation,
    /// Slack per box axis in the chosen rotation
    pub remaining_space: Dims,
    /// Required volume as a percentage of box volume
    pub efficiency: f64,
    /// Ranking value, lower is better. Only comparable within one search.
    pub score: f64,
}

/// A box together with its best fit.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct BoxCandidate {
    #[serde(rename = "box")]
    pub shipping_box: ShippingBox,
    pub fit: Fit,
}

/// Reduced-height version of the chosen box.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct CutDownSuggestion {
    pub from: Dims,
    pub to: Dims,
    pub note: String,
}

/// Best single box plus the ranked runners-up.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleBoxSolution {
    pub best: BoxCandidate,
    /// All other fitting boxes, best first
    pub alternatives: Vec<BoxCandidate>,
}

/// Outcome of a recommendation run.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum Recommendation {
    Single {
        required_dims: Dims,
        #[serde(rename = "box")]
        shipping_box: ShippingBox,
        fit: Fit,
        cut_down: Option<CutDownSuggestion>,
        alternatives: Vec<BoxCandidate>,
    },
    Telescoping {
        required_dims: Dims,
        telescoping: TelescopingSolution,
        alternatives: Vec<TelescopingSolution>,
    },
    NoFit {
        required_dims: Dims,
    },
}

impl Recommendation {
    /// The padded envelope every variant carries.
    pub fn required_dims(&self) -> Dims {
        match self {
            Recommendation::Single { required_dims, .. }
            | Recommendation::Telescoping { required_dims, .. }
            | Recommendation::NoFit { required_dims } => *required_dims,
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Recommendation::Single { .. } => "single",
            Recommendation::Telescoping { .. } => "telescoping",
            Recommendation::NoFit { .. } => "no-fit",
        }
    }

    pub fn is_no_fit(&self) -> bool {
        matches!(self, Recommendation::NoFit { .. })
    }
}

/// Item dimensions plus padding on both sides of every axis.
///
/// Returns `None` if any item dimension is missing or not positive; negative padding
/// counts as zero.
///
/// # Examples
/// ```
/// use boxfit::model::ItemDimensions;
/// use boxfit::optimizer::required_dimensions;
/// use boxfit::types::Dims;
///
/// let req = required_dimensions(&ItemDimensions::new(10.0, 8.0, 6.0), 1.0);
/// assert_eq!(req, Some(Dims::new(12.0, 10.0, 8.0)));
/// ```
pub fn required_dimensions(item: &ItemDimensions, padding_per_side: f64) -> Option<Dims> {
    ItemEnvelope::new(item, padding_per_side).map(|envelope| envelope.required())
}

fn compare_scores(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Best rotation of `required` inside one box, if any.
///
/// On equal scores the earlier rotation is kept.
fn best_fit_for_box(shipping_box: &ShippingBox, required: Dims) -> Option<Fit> {
    let box_dims = shipping_box.dimensions();
    let box_volume = box_dims.volume();
    let required_volume = required.volume();
    let cost_penalty = shipping_box.cost_or_zero() * COST_WEIGHT;

    let mut best: Option<Fit> = None;
    for (rotation, permuted) in permutations(required) {
        let Some(remaining) = slack(&box_dims, &permuted) else {
            continue;
        };

        let wasted_volume = box_volume - required_volume;
        let efficiency = if required_volume > 0.0 {
            required_volume / box_volume * 100.0
        } else {
            0.0
        };
        let score = wasted_volume + remaining.max_component() * SLACK_WEIGHT + cost_penalty;

        let fit = Fit {
            orientation: FitOrientation {
                rotation,
                required: permuted,
                box_dims,
            },
            remaining_space: remaining,
            efficiency,
            score,
        };

        match best {
            Some(current) if current.score <= fit.score => {}
            _ => best = Some(fit),
        }
    }
    best
}

/// Searches the inventory for the best single box holding `required`.
///
/// Each usable box contributes at most one fit. Boxes with equal scores keep their
/// inventory order. Returns `None` if no box fits, including for an empty inventory.
pub fn best_single_box_fit(boxes: &[ShippingBox], required: Dims) -> Option<SingleBoxSolution> {
    let mut candidates: Vec<BoxCandidate> = boxes
        .iter()
        .filter(|b| b.is_usable())
        .filter_map(|b| {
            best_fit_for_box(b, required).map(|fit| BoxCandidate {
                shipping_box: b.clone(),
                fit,
            })
        })
        .collect();

    debug!(
        "single-box search: {} of {} boxes fit {:?}",
        candidates.len(),
        boxes.len(),
        required
    );

    if candidates.is_empty() {
        return None;
    }

    // Stable sort so equal scores resolve by inventory order
    candidates.sort_by(|a, b| compare_scores(a.fit.score, b.fit.score));
    let mut ranked = candidates.into_iter();
    let best = ranked.next()?;
    Some(SingleBoxSolution {
        best,
        alternatives: ranked.collect(),
    })
}

/// Suggests trimming the box height down to what the fit actually needs.
///
/// `box_dims` and `required` must be in the same rotation. Only the height is ever
/// cut; the suggestion is dropped when the saving is below `options.min_cut_excess`.
pub fn cut_down_suggestion(
    box_dims: Dims,
    required: Dims,
    options: &SolverOptions,
) -> Option<CutDownSuggestion> {
    let target_height = box_dims.height.min(required.height + options.flap_tolerance);
    if box_dims.height - target_height < options.min_cut_excess {
        return None;
    }

    Some(CutDownSuggestion {
        from: box_dims,
        to: Dims::new(
            box_dims.length,
            box_dims.width,
            round_to(target_height, DISPLAY_DECIMALS),
        ),
        note: CUT_DOWN_NOTE.to_string(),
    })
}

/// Main entry: best single box with an optional cut-down, otherwise a telescoping
/// pair, otherwise a no-fit result carrying the required envelope.
///
/// Returns `None` when the item dimensions are incomplete; callers should treat that
/// as a validation failure, not as "nothing fits".
pub fn find_best_packaging_solution(
    boxes: &[ShippingBox],
    item: &ItemDimensions,
    padding_per_side: f64,
    options: &SolverOptions,
) -> Option<Recommendation> {
    let required_dims = required_dimensions(item, padding_per_side)?;

    if let Some(single) = best_single_box_fit(boxes, required_dims) {
        let SingleBoxSolution {
            best,
            mut alternatives,
        } = single;
        let cut_down = if options.allow_cut_down {
            cut_down_suggestion(
                best.fit.orientation.box_dims,
                best.fit.orientation.required,
                options,
            )
        } else {
            None
        };
        alternatives.truncate(options.max_alternates);

        debug!(
            "recommending box '{}' ({:.1}% efficiency)",
            best.shipping_box.id, best.fit.efficiency
        );
        return Some(Recommendation::Single {
            required_dims,
            shipping_box: best.shipping_box,
            fit: best.fit,
            cut_down,
            alternatives,
        });
    }

    if options.allow_telescoping {
        if let Some(result) = find_telescoping_solution(
            boxes,
            required_dims,
            options.telescoping_min_overlap,
            options.max_alternates,
        ) {
            return Some(Recommendation::Telescoping {
                required_dims,
                telescoping: result.best,
                alternatives: result.alternates,
            });
        }
    }

    debug!("no packaging fits {:?}", required_dims);
    Some(Recommendation::NoFit { required_dims })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn sbox(id: &str, l: f64, w: f64, h: f64) -> ShippingBox {
        ShippingBox::new(id, l, w, h).unwrap()
    }

    fn solve(boxes: &[ShippingBox], item: (f64, f64, f64), padding: f64) -> Recommendation {
        find_best_packaging_solution(
            boxes,
            &ItemDimensions::new(item.0, item.1, item.2),
            padding,
            &SolverOptions::default(),
        )
        .expect("item dimensions are complete")
    }

    #[test]
    fn required_dimensions_add_padding_on_both_sides() {
        let req = required_dimensions(&ItemDimensions::new(3.5, 7.25, 1.0), 1.5).unwrap();
        assert_eq!(req, Dims::new(6.5, 10.25, 4.0));
        assert_eq!(
            required_dimensions(&ItemDimensions::new(3.0, 0.0, 1.0), 1.0),
            None
        );
    }

    #[test]
    fn exact_box_wins_over_larger_box() {
        let boxes = vec![sbox("large", 16.0, 12.0, 10.0), sbox("exact", 12.0, 10.0, 8.0)];
        let rec = solve(&boxes, (10.0, 8.0, 6.0), 1.0);

        match rec {
            Recommendation::Single {
                required_dims,
                shipping_box,
                fit,
                cut_down,
                alternatives,
            } => {
                assert_eq!(required_dims, Dims::new(12.0, 10.0, 8.0));
                assert_eq!(shipping_box.id, "exact");
                assert!((fit.efficiency - 100.0).abs() < EPS);
                assert!(fit.score.abs() < EPS);
                assert_eq!(fit.remaining_space, Dims::splat(0.0));
                assert!(cut_down.is_none());
                assert_eq!(alternatives.len(), 1);
                assert_eq!(alternatives[0].shipping_box.id, "large");
            }
            other => panic!("expected single-box result, got {}", other.method()),
        }
    }

    #[test]
    fn fit_is_found_through_rotation() {
        let boxes = vec![sbox("flat", 4.0, 20.0, 10.0)];
        let solution = best_single_box_fit(&boxes, Dims::new(18.0, 9.0, 3.0)).unwrap();
        let fit = solution.best.fit;
        assert_eq!(fit.orientation.required, Dims::new(3.0, 18.0, 9.0));
        assert_eq!(fit.remaining_space, Dims::new(1.0, 2.0, 1.0));
    }

    #[test]
    fn best_rotation_minimises_largest_slack() {
        let boxes = vec![sbox("b", 16.0, 12.0, 14.0)];
        let fit = best_single_box_fit(&boxes, Dims::new(14.0, 11.0, 10.0))
            .unwrap()
            .best
            .fit;
        assert_eq!(fit.orientation.required, Dims::new(14.0, 10.0, 11.0));
        assert_eq!(fit.remaining_space.max_component(), 3.0);
        let expected = 16.0 * 12.0 * 14.0 - 14.0 * 11.0 * 10.0 + 3.0 * SLACK_WEIGHT;
        assert!((fit.score - expected).abs() < EPS);
    }

    #[test]
    fn best_score_never_exceeds_alternatives() {
        let boxes = vec![
            sbox("a", 30.0, 20.0, 20.0),
            sbox("b", 14.0, 12.0, 10.0),
            sbox("c", 20.0, 14.0, 12.0),
            sbox("d", 13.0, 11.0, 9.0),
        ];
        let solution = best_single_box_fit(&boxes, Dims::new(12.0, 10.0, 8.0)).unwrap();
        assert_eq!(solution.alternatives.len(), 3);
        for alt in &solution.alternatives {
            assert!(solution.best.fit.score <= alt.fit.score);
        }
        let scores: Vec<f64> = solution.alternatives.iter().map(|c| c.fit.score).collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn efficiency_matches_volume_ratio() {
        let boxes = vec![sbox("a", 20.0, 10.0, 10.0)];
        let fit = best_single_box_fit(&boxes, Dims::new(10.0, 10.0, 10.0))
            .unwrap()
            .best
            .fit;
        assert!((fit.efficiency - 50.0).abs() < EPS);
        assert!((0.0..=100.0).contains(&fit.efficiency));
    }

    #[test]
    fn cheaper_box_ranks_first_on_identical_geometry() {
        let boxes = vec![
            sbox("pricey", 12.0, 10.0, 8.0).with_cost(2.0),
            sbox("cheap", 12.0, 10.0, 8.0).with_cost(0.5),
        ];
        let solution = best_single_box_fit(&boxes, Dims::new(11.0, 9.0, 7.0)).unwrap();
        assert_eq!(solution.best.shipping_box.id, "cheap");
        assert_eq!(solution.alternatives[0].shipping_box.id, "pricey");
        let gap = solution.alternatives[0].fit.score - solution.best.fit.score;
        assert!((gap - 1.5 * COST_WEIGHT).abs() < EPS);
    }

    #[test]
    fn equal_scores_keep_inventory_order() {
        let boxes = vec![sbox("first", 12.0, 10.0, 8.0), sbox("second", 8.0, 10.0, 12.0)];
        let solution = best_single_box_fit(&boxes, Dims::new(12.0, 10.0, 8.0)).unwrap();
        assert_eq!(solution.best.shipping_box.id, "first");
    }

    #[test]
    fn inactive_and_malformed_boxes_are_skipped() {
        let broken = ShippingBox {
            id: "broken".into(),
            name: None,
            length: f64::NAN,
            width: 50.0,
            height: 50.0,
            cost: None,
            is_active: true,
        };
        let boxes = vec![
            sbox("off", 12.0, 10.0, 8.0).inactive(),
            broken,
            sbox("ok", 20.0, 20.0, 20.0),
        ];
        let solution = best_single_box_fit(&boxes, Dims::new(12.0, 10.0, 8.0)).unwrap();
        assert_eq!(solution.best.shipping_box.id, "ok");
        assert!(solution.alternatives.is_empty());
    }

    #[test]
    fn no_single_box_for_oversized_item() {
        let boxes = vec![sbox("small", 12.0, 10.0, 8.0)];
        assert!(best_single_box_fit(&boxes, Dims::new(14.0, 12.0, 10.0)).is_none());
        assert!(best_single_box_fit(&[], Dims::new(1.0, 1.0, 1.0)).is_none());
    }

    #[test]
    fn cut_down_trims_height_to_requirement_plus_flaps() {
        let options = SolverOptions::default();
        let cut = cut_down_suggestion(
            Dims::new(16.0, 12.0, 14.0),
            Dims::new(14.0, 11.0, 10.0),
            &options,
        )
        .expect("4 inches of excess height");
        assert_eq!(cut.from, Dims::new(16.0, 12.0, 14.0));
        assert_eq!(cut.to, Dims::new(16.0, 12.0, 10.25));
    }

    #[test]
    fn cut_down_needs_minimum_excess() {
        let options = SolverOptions::default();
        // 10.9 - (10.0 + 0.25) = 0.65 < 0.75
        assert!(
            cut_down_suggestion(Dims::new(12.0, 12.0, 10.9), Dims::new(12.0, 12.0, 10.0), &options)
                .is_none()
        );
        // exactly at the threshold
        assert!(
            cut_down_suggestion(Dims::new(12.0, 12.0, 11.0), Dims::new(12.0, 12.0, 10.0), &options)
                .is_some()
        );
    }

    #[test]
    fn orchestration_attaches_cut_down_for_chosen_rotation() {
        let boxes = vec![sbox("tall", 16.0, 12.0, 14.0)];
        let rec = solve(&boxes, (14.0, 11.0, 10.0), 0.0);
        let Recommendation::Single { cut_down, .. } = rec else {
            panic!("expected single-box result");
        };
        let cut = cut_down.expect("box is taller than needed");
        assert_eq!(cut.to, Dims::new(16.0, 12.0, 11.25));
    }

    #[test]
    fn cut_down_can_be_disabled() {
        let boxes = vec![sbox("tall", 16.0, 12.0, 14.0)];
        let options = SolverOptions::builder().allow_cut_down(false).build();
        let rec = find_best_packaging_solution(
            &boxes,
            &ItemDimensions::new(14.0, 11.0, 10.0),
            0.0,
            &options,
        )
        .unwrap();
        assert!(matches!(rec, Recommendation::Single { cut_down: None, .. }));
    }

    #[test]
    fn alternatives_are_capped() {
        let boxes: Vec<ShippingBox> = (0..6)
            .map(|i| sbox(&format!("b{i}"), 12.0 + i as f64, 10.0, 8.0))
            .collect();
        let rec = solve(&boxes, (10.0, 8.0, 6.0), 1.0);
        let Recommendation::Single { alternatives, .. } = rec else {
            panic!("expected single-box result");
        };
        assert_eq!(alternatives.len(), SolverOptions::DEFAULT_MAX_ALTERNATES);
    }

    #[test]
    fn oversized_item_without_telescoping_is_no_fit() {
        let boxes = vec![sbox("small", 12.0, 10.0, 8.0)];
        let options = SolverOptions::builder().allow_telescoping(false).build();
        let rec = find_best_packaging_solution(
            &boxes,
            &ItemDimensions::new(10.0, 8.0, 6.0),
            2.0,
            &options,
        )
        .unwrap();
        assert_eq!(
            rec,
            Recommendation::NoFit {
                required_dims: Dims::new(14.0, 12.0, 10.0)
            }
        );
    }

    #[test]
    fn telescoping_used_when_no_single_box_fits() {
        let boxes = vec![sbox("a", 12.0, 12.0, 10.0), sbox("b", 12.0, 10.0, 10.0)];
        let rec = solve(&boxes, (10.0, 8.0, 6.0), 2.0);
        match rec {
            Recommendation::Telescoping {
                required_dims,
                telescoping,
                ..
            } => {
                assert_eq!(required_dims, Dims::new(14.0, 12.0, 10.0));
                assert!(telescoping.combined_length_possible >= telescoping.required.length);
            }
            other => panic!("expected telescoping result, got {}", other.method()),
        }
    }

    #[test]
    fn empty_inventory_is_no_fit_with_envelope() {
        let rec = solve(&[], (5.0, 4.0, 3.0), 1.5);
        assert!(rec.is_no_fit());
        assert_eq!(rec.required_dims(), Dims::new(8.0, 7.0, 6.0));
    }

    #[test]
    fn incomplete_item_skips_search() {
        let boxes = vec![sbox("a", 12.0, 10.0, 8.0)];
        let item = ItemDimensions {
            length: Some(4.0),
            width: None,
            height: Some(2.0),
        };
        assert!(
            find_best_packaging_solution(&boxes, &item, 1.0, &SolverOptions::default()).is_none()
        );
    }

    #[test]
    fn solving_twice_gives_identical_results() {
        let boxes = vec![
            sbox("a", 16.0, 12.0, 10.0).with_cost(1.0),
            sbox("b", 12.0, 10.0, 8.0),
            sbox("c", 18.0, 14.0, 12.0),
        ];
        let first = solve(&boxes, (9.0, 7.0, 5.0), 1.0);
        let second = solve(&boxes, (9.0, 7.0, 5.0), 1.0);
        assert_eq!(first, second);
    }

    #[test]
    fn recommendation_serializes_with_method_tag() {
        let rec = Recommendation::NoFit {
            required_dims: Dims::new(14.0, 12.0, 10.0),
        };
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["method"], "no-fit");
        assert_eq!(value["required_dims"]["length"], 14.0);

        let boxes = vec![sbox("exact", 12.0, 10.0, 8.0)];
        let value = serde_json::to_value(solve(&boxes, (10.0, 8.0, 6.0), 1.0)).unwrap();
        assert_eq!(value["method"], "single");
        assert_eq!(value["box"]["id"], "exact");
        assert_eq!(value["fit"]["orientation"]["rotation"], "lwh");
    }
}
