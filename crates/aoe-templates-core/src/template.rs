//! Measured template documents and their geometry.

use crate::expiration::{DeletionInterval, DeletionPolicy, Expiration};
use crate::grid::{Grid, angle_between, angular_distance, normalize_degrees};
use crate::token::TokenId;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a persisted template.
pub type TemplateId = Uuid;

/// Default cone aperture in degrees.
pub const DEFAULT_CONE_ANGLE: f64 = 90.0;

/// Slack applied to containment tests so points on the boundary count as inside.
const CONTAINS_EPSILON: f64 = 1e-6;

/// Kind of area-of-effect shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Circle,
    Cone,
    #[serde(alias = "line")]
    Ray,
    Rect,
}

impl ShapeKind {
    /// Localization key for the shape's display name.
    pub fn label_key(self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Cone => "cone",
            ShapeKind::Ray => "ray",
            ShapeKind::Rect => "rect",
        }
    }
}

/// Metadata carried by a template document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateFlags {
    /// Skip range validation entirely.
    pub ignore_range: bool,
    /// Token the template originates from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<TokenId>,
    /// Placement sub-type selector (`self`, `splash`, `useSystem`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
    /// Auto-deletion policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion: Option<DeletionPolicy>,
    /// Number of intervals for timespan deletion. Numbers or numeric strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_unit: Option<serde_json::Value>,
    /// Interval unit for timespan deletion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_interval: Option<DeletionInterval>,
    /// Computed once when the template is placed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<Expiration>,
    /// Anything else attached by other systems.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A measured template document, edited in place while being placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    /// Set once the document has been persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TemplateId>,
    #[serde(rename = "t")]
    pub shape: ShapeKind,
    pub x: f64,
    pub y: f64,
    /// Degrees, `[0, 360)`.
    #[serde(default)]
    pub direction: f64,
    /// Size in scene units (radius, length or diagonal).
    pub distance: f64,
    /// Ray width in scene units.
    #[serde(default)]
    pub width: f64,
    /// Cone aperture in degrees.
    #[serde(default = "default_cone_angle")]
    pub angle: f64,
    #[serde(default)]
    pub flags: TemplateFlags,
}

fn default_cone_angle() -> f64 {
    DEFAULT_CONE_ANGLE
}

impl TemplateDocument {
    /// Create an unpersisted document at the origin.
    pub fn new(shape: ShapeKind, distance: f64) -> Self {
        Self {
            id: None,
            shape,
            x: 0.0,
            y: 0.0,
            direction: 0.0,
            distance,
            width: 0.0,
            angle: DEFAULT_CONE_ANGLE,
            flags: TemplateFlags::default(),
        }
    }

    /// Template origin.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the template origin.
    pub fn set_origin(&mut self, point: Point) {
        self.x = point.x;
        self.y = point.y;
    }

    /// Set the direction, normalized to `[0, 360)`.
    pub fn set_direction(&mut self, direction: f64) {
        self.direction = normalize_degrees(direction);
    }

    /// Check whether the template has no size.
    pub fn is_empty(&self) -> bool {
        self.distance == 0.0
    }

    /// Unit vector along the template direction.
    fn heading(&self) -> Vec2 {
        let radians = self.direction.to_radians();
        Vec2::new(radians.cos(), radians.sin())
    }

    /// Check whether a point lies inside the template's shape.
    pub fn contains_point(&self, grid: &Grid, point: Point) -> bool {
        let origin = self.origin();
        let reach = grid.units_to_pixels(self.distance);
        let offset = point - origin;

        match self.shape {
            ShapeKind::Circle => offset.hypot() <= reach + CONTAINS_EPSILON,
            ShapeKind::Cone => {
                let length = offset.hypot();
                if length <= CONTAINS_EPSILON {
                    return true;
                }
                length <= reach + CONTAINS_EPSILON
                    && angular_distance(angle_between(origin, point), self.direction)
                        <= self.angle / 2.0 + CONTAINS_EPSILON
            }
            ShapeKind::Ray => {
                let heading = self.heading();
                let along = offset.dot(heading);
                let across = offset.cross(heading).abs();
                let half_width = grid.units_to_pixels(self.width) / 2.0;
                along >= -CONTAINS_EPSILON
                    && along <= reach + CONTAINS_EPSILON
                    && across <= half_width + CONTAINS_EPSILON
            }
            ShapeKind::Rect => self
                .rect_bounds(grid)
                .inflate(CONTAINS_EPSILON, CONTAINS_EPSILON)
                .contains(point),
        }
    }

    /// Axis-aligned extent of a rect template: `distance` is its diagonal,
    /// running from the origin along `direction`.
    pub fn rect_bounds(&self, grid: &Grid) -> Rect {
        let diagonal = self.heading() * grid.units_to_pixels(self.distance);
        Rect::from_points(self.origin(), self.origin() + diagonal)
    }

    /// Pixel bounds enclosing the whole shape.
    pub fn bounding_box(&self, grid: &Grid) -> Rect {
        let reach = grid.units_to_pixels(self.distance);
        match self.shape {
            ShapeKind::Rect => self.rect_bounds(grid),
            ShapeKind::Circle | ShapeKind::Cone | ShapeKind::Ray => {
                let margin = reach.max(grid.units_to_pixels(self.width));
                Rect::from_center_size(self.origin(), (margin * 2.0, margin * 2.0))
            }
        }
    }
}
