//! Which tokens a template covers.

use crate::grid::{Grid, GridKind};
use crate::template::TemplateDocument;
use crate::token::{Token, TokenId};
use kurbo::Point;

/// The grid region a template highlights: every cell whose center lies in
/// the shape. Gridless scenes use the shape itself.
#[derive(Debug, Clone, Copy)]
pub struct HighlightRegion<'a> {
    document: &'a TemplateDocument,
    grid: &'a Grid,
}

impl<'a> HighlightRegion<'a> {
    pub fn new(document: &'a TemplateDocument, grid: &'a Grid) -> Self {
        Self { document, grid }
    }

    /// Check whether a point falls inside a highlighted cell.
    pub fn contains_point(&self, point: Point) -> bool {
        let sample = match self.grid.kind {
            GridKind::Gridless => point,
            _ => self.grid.cell_center(point),
        };
        self.document.contains_point(self.grid, sample)
    }

    /// Centers of the highlighted cells on a square grid.
    pub fn cells(&self) -> Vec<Point> {
        if !self.grid.kind.is_square() {
            return Vec::new();
        }
        let bounds = self.document.bounding_box(self.grid);
        let size = self.grid.size;
        let first = self.grid.cell_center(Point::new(bounds.x0, bounds.y0));
        let mut cells = Vec::new();
        let mut y = first.y;
        while y <= bounds.y1 + size {
            let mut x = first.x;
            while x <= bounds.x1 + size {
                let center = Point::new(x, y);
                if self.document.contains_point(self.grid, center) {
                    cells.push(center);
                }
                x += size;
            }
            y += size;
        }
        cells
    }
}

/// Ids of the tokens inside a region, in token order and without duplicates.
///
/// Medium and smaller creatures are tested at their center; larger
/// creatures match if any occupied cell's center is inside.
pub fn tokens_in_region(tokens: &[Token], grid: &Grid, region: &HighlightRegion<'_>) -> Vec<TokenId> {
    tokens
        .iter()
        .filter(|token| {
            token
                .targeting_points(grid)
                .into_iter()
                .any(|point| region.contains_point(point))
        })
        .map(|token| token.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ShapeKind;
    use crate::token::SizeCategory;

    fn circle(distance: f64, origin: Point) -> TemplateDocument {
        let mut doc = TemplateDocument::new(ShapeKind::Circle, distance);
        doc.set_origin(origin);
        doc
    }

    #[test]
    fn test_region_samples_cell_center() {
        let grid = Grid::default();
        let doc = circle(5.0, Point::new(100.0, 100.0));
        let region = HighlightRegion::new(&doc, &grid);
        // Probed at the cell center (50, 50), ~70px from the origin.
        assert!(region.contains_point(Point::new(10.0, 10.0)));
        // Cell (250, 50) center is 158px away.
        assert!(!region.contains_point(Point::new(210.0, 10.0)));
    }

    #[test]
    fn test_cells_of_small_burst() {
        let grid = Grid::default();
        let doc = circle(5.0, Point::new(100.0, 100.0));
        let cells = HighlightRegion::new(&doc, &grid).cells();
        assert_eq!(cells.len(), 4);
        assert!(cells.contains(&Point::new(50.0, 50.0)));
        assert!(cells.contains(&Point::new(150.0, 150.0)));
    }

    #[test]
    fn test_large_creature_counted_once() {
        let grid = Grid::default();
        // Covers the cell centered at (250, 250) only.
        let doc = circle(2.5, Point::new(250.0, 250.0));
        let region = HighlightRegion::new(&doc, &grid);

        let small = Token::new("Goblin", Point::new(600.0, 600.0), 1.0, 1.0).with_size(SizeCategory::Small);
        let ogre = Token::new("Ogre", Point::new(200.0, 200.0), 2.0, 2.0).with_size(SizeCategory::Large);
        let tokens = vec![small, ogre.clone()];

        assert_eq!(tokens_in_region(&tokens, &grid, &region), vec![ogre.id]);
    }

    #[test]
    fn test_medium_token_tested_at_center_only() {
        let grid = Grid::default();
        let doc = circle(2.5, Point::new(250.0, 250.0));
        let region = HighlightRegion::new(&doc, &grid);

        // Same 2x2 footprint, but a medium creature is only tested at its center (300, 300).
        let wide = Token::new("Horse", Point::new(200.0, 200.0), 2.0, 2.0);
        assert!(tokens_in_region(&[wide], &grid, &region).is_empty());
    }
}
