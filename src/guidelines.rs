//! Minimum packaging guidelines.
//!
//! Maps an item's sensitivity tier and weight to the padding it needs, the box
//! strength to use and the materials to pack with. The solver only ever sees the
//! resolved padding.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

/// Fragility tier of an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    /// Employee choice, void fill only
    Basic,
    Standard,
    Fragile,
    /// Irregular or high-value items
    Custom,
}

impl Sensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Basic => "basic",
            Sensitivity::Standard => "standard",
            Sensitivity::Fragile => "fragile",
            Sensitivity::Custom => "custom",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Sensitivity::Basic => "Basic",
            Sensitivity::Standard => "Standard",
            Sensitivity::Fragile => "Fragile",
            Sensitivity::Custom => "Custom",
        }
    }

    fn materials(&self) -> &'static [&'static str] {
        match self {
            Sensitivity::Basic => &[
                "Appropriate corrugated box for the item weight",
                "Void fill as needed to prevent movement",
                "3\" carton tape using six-strip (H-taping) method",
            ],
            Sensitivity::Standard => &[
                "Appropriate corrugated box for the item weight",
                "Two layers of large bubble wrap or inflatable air cushioning",
                "Void fill as needed to prevent movement",
                "3\" carton tape using six-strip (H-taping) method",
            ],
            Sensitivity::Fragile => &[
                "Appropriate corrugated box for the item weight",
                "One layer of small bubble wrap or foamwrap",
                "Two layers of large bubble wrap or inflatable air cushioning",
                "Void fill as needed to prevent movement",
                "Corrugate dividers if packing multiple items/layers",
                "3\" carton tape using six-strip (H-taping) method",
            ],
            Sensitivity::Custom => &[
                "Appropriate corrugated box for the item weight",
                "1\" foam plank on all six sides (inside the box)",
                "One layer of small bubble wrap or foamwrap",
                "Two layers of large bubble wrap or inflatable air cushioning",
                "Void fill as needed to prevent movement",
                "3\" carton tape using six-strip (H-taping) method",
            ],
        }
    }
}

impl std::fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weight range in pounds that shares one box strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightBand {
    UpTo10,
    UpTo40,
    UpTo70,
    UpTo150,
    Over150,
}

impl WeightBand {
    const BOUNDED: [WeightBand; 4] = [
        WeightBand::UpTo10,
        WeightBand::UpTo40,
        WeightBand::UpTo70,
        WeightBand::UpTo150,
    ];

    /// Band containing `weight`, if any.
    ///
    /// Bands are whole-pound ranges (1-10, 11-40, ...). Weights below 1 lb or between
    /// two ranges, such as 10.5, belong to no band.
    pub fn for_weight(weight: f64) -> Option<Self> {
        let weight = if weight.is_finite() { weight } else { 0.0 };
        Self::BOUNDED
            .into_iter()
            .find(|band| {
                let (min, max) = band.range();
                weight >= min && weight <= max
            })
            .or((weight > 150.0).then_some(WeightBand::Over150))
    }

    /// Inclusive pound range of the band.
    pub fn range(&self) -> (f64, f64) {
        match self {
            WeightBand::UpTo10 => (1.0, 10.0),
            WeightBand::UpTo40 => (11.0, 40.0),
            WeightBand::UpTo70 => (41.0, 70.0),
            WeightBand::UpTo150 => (71.0, 150.0),
            WeightBand::Over150 => (151.0, 9999.0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeightBand::UpTo10 => "1-10",
            WeightBand::UpTo40 => "11-40",
            WeightBand::UpTo70 => "41-70",
            WeightBand::UpTo150 => "71-150",
            WeightBand::Over150 => "150+",
        }
    }

    /// Burst strength rating and whether a double-wall box is required.
    pub fn box_strength(&self) -> (&'static str, bool) {
        match self {
            WeightBand::UpTo10 => ("150-lb", false),
            WeightBand::UpTo40 => ("200-lb", false),
            WeightBand::UpTo70 => ("275-lb", false),
            WeightBand::UpTo150 | WeightBand::Over150 => ("350-lb", true),
        }
    }
}

fn default_active() -> bool {
    true
}

/// Packaging requirements for one sensitivity tier and weight range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "name": "Fragile 11-40 lbs",
    "sensitivity": "fragile",
    "weight_min": 11.0,
    "weight_max": 40.0,
    "min_padding": 2.0,
    "box_strength": "200-lb",
    "double_wall": false,
    "materials": ["One layer of small bubble wrap or foamwrap"],
    "notes": "Minimum 2\" clearance on all sides for fragile items.",
    "is_active": true
}))]
pub struct Guideline {
    pub name: String,
    pub sensitivity: Sensitivity,
    pub weight_min: f64,
    pub weight_max: f64,
    /// Padding per side in inches
    pub min_padding: f64,
    pub box_strength: String,
    #[serde(default)]
    pub double_wall: bool,
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Guideline {
    /// Whether this guideline covers `sensitivity` at `weight`.
    pub fn applies_to(&self, sensitivity: Sensitivity, weight: f64) -> bool {
        self.is_active
            && self.sensitivity == sensitivity
            && weight >= self.weight_min
            && weight <= self.weight_max
    }
}

/// Padding per side for a tier and weight.
///
/// Basic items only get the optional extra padding the packer asked for.
pub fn padding_per_side(sensitivity: Sensitivity, weight: f64, basic_extra_padding: f64) -> f64 {
    let band = WeightBand::for_weight(weight).unwrap_or(WeightBand::UpTo10);
    match sensitivity {
        Sensitivity::Basic => {
            if basic_extra_padding.is_finite() {
                basic_extra_padding.max(0.0)
            } else {
                0.0
            }
        }
        Sensitivity::Standard if band == WeightBand::UpTo10 => 1.0,
        Sensitivity::Standard => 2.0,
        Sensitivity::Fragile => 2.0,
        Sensitivity::Custom => 3.0,
    }
}

fn notes_for(sensitivity: Sensitivity, band: WeightBand) -> &'static str {
    match sensitivity {
        Sensitivity::Basic => {
            "Employee choice / void fill only. Ensure the item cannot shift inside the box."
        }
        Sensitivity::Fragile => "Minimum 2\" clearance on all sides for fragile items.",
        Sensitivity::Custom => {
            "Minimum 3\" clearance on all sides. Custom packing may be required for irregular or high-value items."
        }
        Sensitivity::Standard if band != WeightBand::UpTo10 => {
            "Minimum 2\" clearance on all sides for this weight range."
        }
        Sensitivity::Standard => "",
    }
}

/// Default guideline for a tier and weight, or `None` if the weight is in no band.
pub fn make_guideline(
    sensitivity: Sensitivity,
    weight: f64,
    basic_extra_padding: f64,
) -> Option<Guideline> {
    let band = WeightBand::for_weight(weight)?;
    let (min, max) = band.range();
    let (strength, double_wall) = band.box_strength();

    Some(Guideline {
        name: format!("{} {} lbs", sensitivity.title(), band.label()),
        sensitivity,
        weight_min: min,
        weight_max: max,
        min_padding: padding_per_side(sensitivity, weight, basic_extra_padding),
        box_strength: strength.to_string(),
        double_wall,
        materials: sensitivity
            .materials()
            .iter()
            .map(|m| m.to_string())
            .collect(),
        notes: notes_for(sensitivity, band).to_string(),
        is_active: true,
    })
}

/// Picks the stored guideline for a tier and weight, falling back to the default one.
pub fn resolve_guideline(
    stored: &[Guideline],
    sensitivity: Sensitivity,
    weight: f64,
    basic_extra_padding: f64,
) -> Option<Guideline> {
    stored
        .iter()
        .find(|g| g.applies_to(sensitivity, weight))
        .cloned()
        .or_else(|| make_guideline(sensitivity, weight, basic_extra_padding))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_bands_follow_whole_pound_ranges() {
        assert_eq!(WeightBand::for_weight(1.0), Some(WeightBand::UpTo10));
        assert_eq!(WeightBand::for_weight(10.0), Some(WeightBand::UpTo10));
        assert_eq!(WeightBand::for_weight(11.0), Some(WeightBand::UpTo40));
        assert_eq!(WeightBand::for_weight(70.0), Some(WeightBand::UpTo70));
        assert_eq!(WeightBand::for_weight(150.0), Some(WeightBand::UpTo150));
        assert_eq!(WeightBand::for_weight(150.5), Some(WeightBand::Over150));
        assert_eq!(WeightBand::for_weight(0.5), None);
        assert_eq!(WeightBand::for_weight(10.5), None);
        assert_eq!(WeightBand::for_weight(f64::NAN), None);
    }

    #[test]
    fn padding_depends_on_tier_and_weight() {
        assert_eq!(padding_per_side(Sensitivity::Standard, 5.0, 0.0), 1.0);
        assert_eq!(padding_per_side(Sensitivity::Standard, 25.0, 0.0), 2.0);
        assert_eq!(padding_per_side(Sensitivity::Fragile, 5.0, 0.0), 2.0);
        assert_eq!(padding_per_side(Sensitivity::Custom, 200.0, 0.0), 3.0);
        assert_eq!(padding_per_side(Sensitivity::Basic, 5.0, 1.5), 1.5);
        assert_eq!(padding_per_side(Sensitivity::Basic, 5.0, -2.0), 0.0);
    }

    #[test]
    fn standard_padding_without_band_uses_lightest_band() {
        assert_eq!(padding_per_side(Sensitivity::Standard, 10.5, 0.0), 1.0);
    }

    #[test]
    fn heavy_items_need_double_wall() {
        let g = make_guideline(Sensitivity::Standard, 100.0, 0.0).unwrap();
        assert_eq!(g.name, "Standard 71-150 lbs");
        assert_eq!(g.box_strength, "350-lb");
        assert!(g.double_wall);
        assert_eq!(g.min_padding, 2.0);
        assert!(g.notes.contains("2\""));

        let over = make_guideline(Sensitivity::Custom, 300.0, 0.0).unwrap();
        assert_eq!(over.weight_min, 151.0);
        assert!(over.double_wall);
    }

    #[test]
    fn light_standard_items_have_no_notes() {
        let g = make_guideline(Sensitivity::Standard, 4.0, 0.0).unwrap();
        assert_eq!(g.box_strength, "150-lb");
        assert!(!g.double_wall);
        assert!(g.notes.is_empty());
        assert_eq!(g.materials.len(), 4);
    }

    #[test]
    fn no_guideline_outside_bands() {
        assert!(make_guideline(Sensitivity::Fragile, 0.2, 0.0).is_none());
    }

    #[test]
    fn stored_guideline_takes_precedence() {
        let mut custom = make_guideline(Sensitivity::Fragile, 20.0, 0.0).unwrap();
        custom.min_padding = 2.5;
        custom.name = "Warehouse fragile".into();

        let resolved = resolve_guideline(&[custom.clone()], Sensitivity::Fragile, 20.0, 0.0);
        assert_eq!(resolved, Some(custom.clone()));

        custom.is_active = false;
        let fallback = resolve_guideline(&[custom], Sensitivity::Fragile, 20.0, 0.0).unwrap();
        assert_eq!(fallback.name, "Fragile 11-40 lbs");
        assert_eq!(fallback.min_padding, 2.0);
    }

    #[test]
    fn sensitivity_parses_from_snake_case() {
        let s: Sensitivity = serde_json::from_str("\"fragile\"").unwrap();
        assert_eq!(s, Sensitivity::Fragile);
        assert_eq!(s.to_string(), "fragile");
    }
}
