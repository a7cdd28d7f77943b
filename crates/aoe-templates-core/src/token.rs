//! Tokens placed on the scene.

use crate::grid::Grid;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a token.
pub type TokenId = Uuid;

/// Creature size category of the actor behind a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SizeCategory {
    Fine,
    Diminutive,
    Tiny,
    Small,
    #[default]
    Medium,
    Large,
    Huge,
    Gargantuan,
    Colossal,
}

impl SizeCategory {
    /// Creatures above medium are tested cell by cell when targeting.
    pub fn occupies_multiple_cells(self) -> bool {
        self > SizeCategory::Medium
    }
}

/// A token on the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    #[serde(default = "Uuid::new_v4")]
    pub id: TokenId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Top-left corner x in pixels.
    pub x: f64,
    /// Top-left corner y in pixels.
    pub y: f64,
    /// Width in grid cells.
    #[serde(default = "one")]
    pub width: f64,
    /// Height in grid cells.
    #[serde(default = "one")]
    pub height: f64,
    /// Size category of the creature.
    #[serde(default)]
    pub size: SizeCategory,
}

fn one() -> f64 {
    1.0
}

impl Token {
    /// Create a token of the given footprint at a pixel position.
    pub fn new(name: impl Into<String>, position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            x: position.x,
            y: position.y,
            width,
            height,
            size: SizeCategory::default(),
        }
    }

    /// Set the size category.
    pub fn with_size(mut self, size: SizeCategory) -> Self {
        self.size = size;
        self
    }

    /// Width in pixels.
    pub fn pixel_width(&self, grid: &Grid) -> f64 {
        self.width * grid.size
    }

    /// Height in pixels.
    pub fn pixel_height(&self, grid: &Grid) -> f64 {
        self.height * grid.size
    }

    /// Footprint rectangle in pixels.
    pub fn bounds(&self, grid: &Grid) -> Rect {
        Rect::new(
            self.x,
            self.y,
            self.x + self.pixel_width(grid),
            self.y + self.pixel_height(grid),
        )
    }

    /// Center of the footprint.
    pub fn center(&self, grid: &Grid) -> Point {
        self.bounds(grid).center()
    }

    /// Centers of every cell the token covers.
    pub fn occupied_cell_centers(&self, grid: &Grid) -> Vec<Point> {
        let half = grid.size / 2.0;
        let columns = self.width.ceil().max(1.0) as usize;
        let rows = self.height.ceil().max(1.0) as usize;
        let mut centers = Vec::with_capacity(columns * rows);
        for col in 0..columns {
            for row in 0..rows {
                centers.push(Point::new(
                    self.x + half + col as f64 * grid.size,
                    self.y + half + row as f64 * grid.size,
                ));
            }
        }
        centers
    }

    /// Points tested for containment when auto-targeting.
    pub fn targeting_points(&self, grid: &Grid) -> Vec<Point> {
        if self.size.occupies_multiple_cells() {
            self.occupied_cell_centers(grid)
        } else {
            vec![self.center(grid)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_and_bounds() {
        let grid = Grid::default();
        let token = Token::new("Ogre", Point::new(200.0, 100.0), 2.0, 2.0);
        assert_eq!(token.bounds(&grid), Rect::new(200.0, 100.0, 400.0, 300.0));
        assert_eq!(token.center(&grid), Point::new(300.0, 200.0));
    }

    #[test]
    fn test_occupied_cells() {
        let grid = Grid::default();
        let token = Token::new("Ogre", Point::new(0.0, 0.0), 2.0, 2.0);
        let centers = token.occupied_cell_centers(&grid);
        assert_eq!(centers.len(), 4);
        assert!(centers.contains(&Point::new(150.0, 150.0)));
    }

    #[test]
    fn test_targeting_points_by_size() {
        let grid = Grid::default();
        let medium = Token::new("Guard", Point::new(0.0, 0.0), 1.0, 1.0);
        assert_eq!(medium.targeting_points(&grid), vec![Point::new(50.0, 50.0)]);

        let large = Token::new("Ogre", Point::new(0.0, 0.0), 2.0, 2.0).with_size(SizeCategory::Large);
        assert_eq!(large.targeting_points(&grid).len(), 4);
    }
}
