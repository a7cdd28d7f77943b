//! Grid description: point snapping, angle helpers and the distance metric.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Default cell size in pixels.
pub const DEFAULT_GRID_SIZE: f64 = 100.0;

/// Default scene units covered by one cell (5 ft).
pub const DEFAULT_GRID_DISTANCE: f64 = 5.0;

/// Tolerance (in pixels) used when deciding whether a point sits on a grid vertex.
const GRID_POINT_TOLERANCE: f64 = 2.0;

/// Layout of the play grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GridKind {
    /// No grid, positions are free.
    Gridless,
    /// Square cells.
    #[default]
    Square,
    /// Pointy-top hexes laid out in offset rows.
    HexRows,
    /// Flat-top hexes laid out in offset columns.
    HexColumns,
}

impl GridKind {
    /// Check if this is a square grid.
    pub fn is_square(self) -> bool {
        self == GridKind::Square
    }

    /// Check if this is a hexagonal grid.
    pub fn is_hexagonal(self) -> bool {
        matches!(self, GridKind::HexRows | GridKind::HexColumns)
    }
}

/// Which grid features a point snaps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SnapMode {
    /// No snapping.
    None,
    /// Snap to grid intersections.
    #[default]
    Vertex,
    /// Snap to cell centers.
    Center,
    /// Snap to whichever of intersection or center is closer.
    VertexOrCenter,
}

/// How diagonal steps are counted when measuring distance on a square grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagonalRule {
    /// Every diagonal step costs one cell.
    #[default]
    Chebyshev,
    /// Every second diagonal step costs two cells (5/10/5).
    Alternating,
    /// Straight-line distance in cells.
    Euclidean,
}

impl DiagonalRule {
    /// Measure a displacement of whole cells, returning a cell count.
    pub fn measure(self, dx: f64, dy: f64) -> f64 {
        let (dx, dy) = (dx.abs(), dy.abs());
        match self {
            DiagonalRule::Chebyshev => dx.max(dy),
            DiagonalRule::Alternating => dx.max(dy) + (dx.min(dy) / 2.0).floor(),
            DiagonalRule::Euclidean => (dx * dx + dy * dy).sqrt(),
        }
    }
}

/// The play grid of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    /// Grid layout.
    #[serde(default)]
    pub kind: GridKind,
    /// Cell size in pixels.
    pub size: f64,
    /// Scene units (ft or m) covered by one cell.
    pub distance: f64,
    /// Diagonal measurement rule.
    #[serde(default)]
    pub diagonals: DiagonalRule,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            kind: GridKind::Square,
            size: DEFAULT_GRID_SIZE,
            distance: DEFAULT_GRID_DISTANCE,
            diagonals: DiagonalRule::Chebyshev,
        }
    }
}

impl Grid {
    /// Create a grid.
    pub fn new(kind: GridKind, size: f64, distance: f64) -> Self {
        Self {
            kind,
            size,
            distance,
            diagonals: DiagonalRule::default(),
        }
    }

    /// Create a square grid with Chebyshev diagonals.
    pub fn square(size: f64, distance: f64) -> Self {
        Self::new(GridKind::Square, size, distance)
    }

    /// Set the diagonal rule.
    pub fn with_diagonals(mut self, diagonals: DiagonalRule) -> Self {
        self.diagonals = diagonals;
        self
    }

    /// Convert scene units to pixels.
    pub fn units_to_pixels(&self, units: f64) -> f64 {
        units / self.distance * self.size
    }

    /// Convert pixels to scene units.
    pub fn pixels_to_units(&self, pixels: f64) -> f64 {
        pixels / self.size * self.distance
    }

    /// Snap a point according to the given mode.
    ///
    /// Hex grids only expose cell centers, so every mode other than
    /// [`SnapMode::None`] resolves to the nearest hex center there.
    pub fn snap_point(&self, point: Point, mode: SnapMode) -> Point {
        if mode == SnapMode::None || self.kind == GridKind::Gridless {
            return point;
        }
        if self.kind.is_hexagonal() {
            return self.nearest_hex_center(point);
        }
        match mode {
            SnapMode::None => point,
            SnapMode::Vertex => self.nearest_vertex(point),
            SnapMode::Center => self.containing_center(point),
            SnapMode::VertexOrCenter => {
                let vertex = self.nearest_vertex(point);
                let center = self.containing_center(point);
                if point.distance_squared(vertex) <= point.distance_squared(center) {
                    vertex
                } else {
                    center
                }
            }
        }
    }

    /// Center of the cell containing `point` (the point itself when gridless).
    pub fn cell_center(&self, point: Point) -> Point {
        match self.kind {
            GridKind::Gridless => point,
            GridKind::Square => self.containing_center(point),
            GridKind::HexRows | GridKind::HexColumns => self.nearest_hex_center(point),
        }
    }

    /// Top-left corner of the square cell containing `point`.
    pub fn cell_origin(&self, point: Point) -> Point {
        Point::new(
            (point.x / self.size).floor() * self.size,
            (point.y / self.size).floor() * self.size,
        )
    }

    /// Check whether a point lies on a grid intersection (within a couple of pixels).
    pub fn is_grid_point(&self, point: Point) -> bool {
        ((point.x % self.size) + 1.0).abs() <= GRID_POINT_TOLERANCE
            && ((point.y % self.size) + 1.0).abs() <= GRID_POINT_TOLERANCE
    }

    /// Convert a displacement in whole cells to scene units.
    pub fn measure_cells(&self, dx: f64, dy: f64) -> f64 {
        self.diagonals.measure(dx, dy) * self.distance
    }

    fn nearest_vertex(&self, point: Point) -> Point {
        Point::new(
            (point.x / self.size).round() * self.size,
            (point.y / self.size).round() * self.size,
        )
    }

    fn containing_center(&self, point: Point) -> Point {
        let half = self.size / 2.0;
        let origin = self.cell_origin(point);
        Point::new(origin.x + half, origin.y + half)
    }

    /// Centers are laid out on offset rows (or columns): every odd row is
    /// shifted by half a cell, and rows are `size * sqrt(3) / 2` apart.
    fn nearest_hex_center(&self, point: Point) -> Point {
        let columns = self.kind == GridKind::HexColumns;
        // Work in row-major space, transposing for column layouts.
        let p = if columns { Point::new(point.y, point.x) } else { point };
        let half = self.size / 2.0;
        let row_step = self.size * 3f64.sqrt() / 2.0;

        let base_row = ((p.y - half) / row_step).round() as i64;
        let mut best = p;
        let mut best_dist = f64::MAX;
        for row in (base_row - 1)..=(base_row + 1) {
            let shift = if row.rem_euclid(2) == 1 { half } else { 0.0 };
            let base_col = ((p.x - half - shift) / self.size).round() as i64;
            for col in (base_col - 1)..=(base_col + 1) {
                let candidate = Point::new(
                    col as f64 * self.size + half + shift,
                    row as f64 * row_step + half,
                );
                let dist = p.distance_squared(candidate);
                if dist < best_dist {
                    best_dist = dist;
                    best = candidate;
                }
            }
        }

        if columns { Point::new(best.y, best.x) } else { best }
    }
}

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 { 0.0 } else { normalized }
}

/// Snap an angle to the nearest increment, normalized to `[0, 360)`.
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    normalize_degrees((angle_degrees / increment).round() * increment)
}

/// Angle of the ray `from -> to`, in degrees normalized to `[0, 360)`.
pub fn angle_between(from: Point, to: Point) -> f64 {
    normalize_degrees((to.y - from.y).atan2(to.x - from.x).to_degrees())
}

/// Smallest absolute difference between two angles, in degrees.
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let diff = normalize_degrees(a - b);
    diff.min(360.0 - diff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_vertex() {
        let grid = Grid::square(100.0, 5.0);
        assert_eq!(grid.snap_point(Point::new(140.0, 260.0), SnapMode::Vertex), Point::new(100.0, 300.0));
    }

    #[test]
    fn test_snap_to_center() {
        let grid = Grid::square(100.0, 5.0);
        assert_eq!(grid.snap_point(Point::new(140.0, 260.0), SnapMode::Center), Point::new(150.0, 250.0));
    }

    #[test]
    fn test_snap_vertex_or_center_picks_closest() {
        let grid = Grid::square(100.0, 5.0);
        assert_eq!(
            grid.snap_point(Point::new(108.0, 195.0), SnapMode::VertexOrCenter),
            Point::new(100.0, 200.0)
        );
        assert_eq!(
            grid.snap_point(Point::new(140.0, 160.0), SnapMode::VertexOrCenter),
            Point::new(150.0, 150.0)
        );
    }

    #[test]
    fn test_gridless_never_snaps() {
        let grid = Grid::new(GridKind::Gridless, 100.0, 5.0);
        let p = Point::new(123.4, 56.7);
        assert_eq!(grid.snap_point(p, SnapMode::Vertex), p);
        assert_eq!(grid.snap_point(p, SnapMode::Center), p);
    }

    #[test]
    fn test_hex_snap_lands_on_center() {
        let grid = Grid::new(GridKind::HexRows, 100.0, 5.0);
        // First row center, second row is shifted by half a cell.
        assert_eq!(grid.snap_point(Point::new(55.0, 45.0), SnapMode::Vertex), Point::new(50.0, 50.0));
        let row_step = 100.0 * 3f64.sqrt() / 2.0;
        let snapped = grid.snap_point(Point::new(98.0, 50.0 + row_step + 3.0), SnapMode::Center);
        assert!((snapped.x - 100.0).abs() < 1e-9);
        assert!((snapped.y - (50.0 + row_step)).abs() < 1e-9);
    }

    #[test]
    fn test_is_grid_point() {
        let grid = Grid::square(100.0, 5.0);
        assert!(grid.is_grid_point(Point::new(200.0, 300.0)));
        assert!(grid.is_grid_point(Point::new(201.0, 300.0)));
        assert!(!grid.is_grid_point(Point::new(250.0, 250.0)));
    }

    #[test]
    fn test_diagonal_rules() {
        assert_eq!(DiagonalRule::Chebyshev.measure(3.0, 2.0), 3.0);
        assert_eq!(DiagonalRule::Alternating.measure(3.0, 2.0), 4.0);
        assert!((DiagonalRule::Euclidean.measure(3.0, 4.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(0.0), 0.0);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        let tiny = normalize_degrees(-1e-14);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_snap_angle() {
        assert_eq!(snap_angle(7.0, 15.0), 0.0);
        assert_eq!(snap_angle(8.0, 15.0), 15.0);
        assert_eq!(snap_angle(359.0, 15.0), 0.0);
        assert_eq!(snap_angle(-44.0, 45.0), 315.0);
    }

    #[test]
    fn test_angle_helpers() {
        let o = Point::new(0.0, 0.0);
        assert_eq!(angle_between(o, Point::new(0.0, 10.0)), 90.0);
        assert_eq!(angle_between(o, Point::new(0.0, -10.0)), 270.0);
        assert_eq!(angular_distance(350.0, 10.0), 20.0);
        assert_eq!(angular_distance(90.0, 270.0), 180.0);
    }
}
