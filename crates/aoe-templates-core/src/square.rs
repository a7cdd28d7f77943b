//! Grid squares and token footprints used as angle origins.

use crate::grid::{Grid, GridKind, angle_between, angular_distance, snap_angle};
use crate::token::Token;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Directions snap to the rotational symmetry of a square grid.
pub const SQUARE_DIRECTION_SNAP: f64 = 45.0;

/// Which points of a square may serve as a template's start point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnglePoints {
    /// Corners and edge midpoints.
    #[default]
    All,
    /// Corners only.
    Vertices,
    /// Edge midpoints only.
    Cardinal,
    /// The center of the square.
    Center,
}

/// Where a template should sit to follow a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowPosition {
    pub x: f64,
    pub y: f64,
    /// Direction in degrees, `[0, 360)`.
    pub direction: f64,
    /// Override for the control icon position, when the origin sits on the square's edge.
    pub icon: Option<Point>,
}

impl FollowPosition {
    /// Template origin as a point.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A single grid cell, a token's footprint, or a bare grid intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSquare {
    /// Bounds in pixels. Zero-sized for a grid intersection.
    pub bounds: Rect,
    /// Center point.
    pub center: Point,
}

impl GridSquare {
    fn from_bounds(bounds: Rect) -> Self {
        Self {
            bounds,
            center: bounds.center(),
        }
    }

    /// A grid intersection: the nearest vertex to `point`, with no extent.
    pub fn from_grid_point(grid: &Grid, point: Point) -> Self {
        let vertex = Point::new(
            (point.x / grid.size).round() * grid.size,
            (point.y / grid.size).round() * grid.size,
        );
        Self::from_bounds(Rect::from_points(vertex, vertex))
    }

    /// The cell containing `point`.
    pub fn from_grid_square(grid: &Grid, point: Point) -> Self {
        let origin = grid.cell_origin(point);
        Self::from_bounds(Rect::new(origin.x, origin.y, origin.x + grid.size, origin.y + grid.size))
    }

    /// The footprint of a token.
    pub fn from_token(grid: &Grid, token: &Token) -> Self {
        Self::from_bounds(token.bounds(grid))
    }

    /// Check whether this square has no extent (a grid intersection).
    pub fn is_point(&self) -> bool {
        self.bounds.width() <= f64::EPSILON && self.bounds.height() <= f64::EPSILON
    }

    /// Candidate start points with the outward direction each one faces.
    fn start_points(&self, points: AnglePoints) -> Vec<(Point, f64)> {
        let Rect { x0, y0, x1, y1 } = self.bounds;
        let c = self.center;
        let cardinal = [
            (Point::new(x1, c.y), 0.0),
            (Point::new(c.x, y1), 90.0),
            (Point::new(x0, c.y), 180.0),
            (Point::new(c.x, y0), 270.0),
        ];
        let vertices = [
            (Point::new(x1, y1), 45.0),
            (Point::new(x0, y1), 135.0),
            (Point::new(x0, y0), 225.0),
            (Point::new(x1, y0), 315.0),
        ];
        match points {
            AnglePoints::All => cardinal.into_iter().chain(vertices).collect(),
            AnglePoints::Vertices => vertices.to_vec(),
            AnglePoints::Cardinal => cardinal.to_vec(),
            AnglePoints::Center => Vec::new(),
        }
    }

    /// Pick the start point facing `target` and the snapped direction towards it.
    ///
    /// The chosen candidate is the one whose outward direction is closest to
    /// the direction from the square's center to `target`; that outward
    /// direction becomes the template direction. Centers and bare
    /// intersections aim straight at the target, snapped to 45 degrees.
    pub fn follow_position_for_coords(&self, points: AnglePoints, target: Point) -> FollowPosition {
        let aim = angle_between(self.center, target);
        let candidates = if self.is_point() {
            Vec::new()
        } else {
            self.start_points(points)
        };

        let best = candidates.into_iter().min_by(|(_, a), (_, b)| {
            angular_distance(*a, aim).total_cmp(&angular_distance(*b, aim))
        });

        match best {
            Some((point, direction)) => FollowPosition {
                x: point.x,
                y: point.y,
                direction,
                icon: Some(self.center),
            },
            None => FollowPosition {
                x: self.center.x,
                y: self.center.y,
                direction: snap_angle(aim, SQUARE_DIRECTION_SNAP),
                icon: None,
            },
        }
    }

    /// Grid distance from the square's edge to `point`, in scene units.
    pub fn distance_to_point(&self, grid: &Grid, point: Point) -> f64 {
        let gap_x = (self.bounds.x0 - point.x).max(point.x - self.bounds.x1).max(0.0);
        let gap_y = (self.bounds.y0 - point.y).max(point.y - self.bounds.y1).max(0.0);
        if grid.kind == GridKind::Gridless {
            return grid.pixels_to_units(gap_x.hypot(gap_y));
        }
        grid.measure_cells((gap_x / grid.size).round(), (gap_y / grid.size).round())
    }
}
