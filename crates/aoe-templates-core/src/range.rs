//! Range checks between a source token and a template's center.

use crate::grid::Grid;
use crate::i18n::Localizer;
use crate::settings::Units;
use crate::square::GridSquare;
use crate::token::Token;
use kurbo::Point;

/// Where a distance falls relative to a min/max range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStatus {
    InRange,
    TooClose,
    TooFar,
}

impl RangeStatus {
    /// Classify a distance. Unset bounds are not enforced.
    pub fn classify(distance: f64, min: Option<f64>, max: Option<f64>) -> Self {
        if min.is_some_and(|min| distance < min) {
            RangeStatus::TooClose
        } else if max.is_some_and(|max| distance > max) {
            RangeStatus::TooFar
        } else {
            RangeStatus::InRange
        }
    }

    pub fn is_in_range(self) -> bool {
        self == RangeStatus::InRange
    }
}

/// Configured range limits, in scene units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeLimits {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeLimits {
    /// Check whether any bound is configured.
    pub fn is_constrained(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// Outcome of one range evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeReport {
    pub distance: f64,
    pub status: RangeStatus,
    /// Status lines shown next to the control icon.
    pub text: Vec<String>,
}

/// Measure the range from a token to a template center and build its status text.
///
/// The range line is left out while an origin is still being selected and
/// the distance is zero.
pub fn evaluate_range(
    grid: &Grid,
    token: &Token,
    center: Point,
    limits: RangeLimits,
    selecting_origin: bool,
    units: Units,
    i18n: &Localizer,
) -> RangeReport {
    let distance = GridSquare::from_token(grid, token).distance_to_point(grid, center);
    let status = RangeStatus::classify(distance, limits.min, limits.max);

    let mut text = Vec::new();
    if distance != 0.0 || !selecting_origin {
        let unit = i18n.localize(units.short_label_key());
        text.push(i18n.format("range", &[("range", format_distance(distance)), ("unit", unit)]));
    }
    if !status.is_in_range() {
        text.push(i18n.localize("errors.outOfRange"));
    }

    RangeReport { distance, status, text }
}

fn format_distance(distance: f64) -> String {
    if distance.fract() == 0.0 {
        format!("{}", distance as i64)
    } else {
        format!("{:.1}", distance)
    }
}
