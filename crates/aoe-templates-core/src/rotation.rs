//! Mouse-wheel rotation policies.

use crate::grid::{Grid, normalize_degrees};
use crate::input::WheelInput;
use crate::template::{ShapeKind, TemplateDocument};

/// Distance added to a rect per wheel notch: the diagonal of a 5x5 square.
pub const RECT_RESIZE_STEP: f64 = 7.0710678118654755;

/// Rotation step and shift-free snap for host-native rotation.
fn system_increments(shape: ShapeKind, grid: &Grid, measure_style: bool) -> (f64, f64) {
    let hex = grid.kind.is_hexagonal();
    if measure_style && shape == ShapeKind::Cone {
        if hex { (60.0, 30.0) } else { (90.0, 45.0) }
    } else if hex {
        (30.0, 5.0)
    } else {
        (15.0, 5.0)
    }
}

/// Host-native rotation.
///
/// Ctrl resizes by one cell per notch (never below zero). Otherwise the
/// template rotates by a shape and grid dependent increment, larger with
/// shift held; rects grow or shrink along their diagonal instead.
pub fn system_rotation(
    document: &mut TemplateDocument,
    wheel: &WheelInput,
    grid: &Grid,
    measure_style: bool,
) {
    let sign = wheel.sign();

    if wheel.modifiers.ctrl {
        document.distance = (document.distance + grid.distance * -sign).max(0.0);
        return;
    }

    let (delta, fine) = system_increments(document.shape, grid, measure_style);
    let snap = if wheel.modifiers.shift { delta } else { fine };

    if document.shape == ShapeKind::Rect {
        document.distance = (document.distance + RECT_RESIZE_STEP * -sign).max(0.0);
    } else {
        document.direction += snap * sign;
    }
    document.set_direction(document.direction);
}

/// Advanced rotation by the configured snap angle.
///
/// Returns `false` when rotation is disabled (snap of zero). The applied
/// delta accumulates in `offset` so angle-following keeps it.
pub fn advanced_rotation(
    document: &mut TemplateDocument,
    wheel: &WheelInput,
    snap: f64,
    offset: &mut f64,
) -> bool {
    if snap == 0.0 {
        return false;
    }

    let delta = snap * wheel.sign();
    *offset += delta;
    document.direction = normalize_degrees(document.direction + delta);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridKind;
    use crate::input::Modifiers;

    fn doc(shape: ShapeKind, direction: f64) -> TemplateDocument {
        let mut doc = TemplateDocument::new(shape, 30.0);
        doc.set_direction(direction);
        doc
    }

    #[test]
    fn test_ctrl_resizes_and_floors_at_zero() {
        let grid = Grid::default();
        let mut cone = doc(ShapeKind::Cone, 0.0);
        system_rotation(&mut cone, &WheelInput::notch(-100.0, Modifiers::ctrl()), &grid, true);
        assert_eq!(cone.distance, 35.0);

        cone.distance = 2.0;
        system_rotation(&mut cone, &WheelInput::notch(100.0, Modifiers::ctrl()), &grid, true);
        assert_eq!(cone.distance, 0.0);
        assert_eq!(cone.direction, 0.0);
    }

    #[test]
    fn test_measure_style_cone_snaps() {
        let square = Grid::default();
        let hex = Grid::new(GridKind::HexRows, 100.0, 5.0);

        let mut cone = doc(ShapeKind::Cone, 0.0);
        system_rotation(&mut cone, &WheelInput::notch(100.0, Modifiers::default()), &square, true);
        assert_eq!(cone.direction, 45.0);
        system_rotation(&mut cone, &WheelInput::notch(100.0, Modifiers::shift()), &square, true);
        assert_eq!(cone.direction, 135.0);

        let mut hex_cone = doc(ShapeKind::Cone, 0.0);
        system_rotation(&mut hex_cone, &WheelInput::notch(-100.0, Modifiers::default()), &hex, true);
        assert_eq!(hex_cone.direction, 330.0);
        system_rotation(&mut hex_cone, &WheelInput::notch(-100.0, Modifiers::shift()), &hex, true);
        assert_eq!(hex_cone.direction, 270.0);
    }

    #[test]
    fn test_default_snaps() {
        let square = Grid::default();
        let mut ray = doc(ShapeKind::Ray, 358.0);
        system_rotation(&mut ray, &WheelInput::notch(100.0, Modifiers::default()), &square, true);
        assert_eq!(ray.direction, 3.0);
        system_rotation(&mut ray, &WheelInput::notch(100.0, Modifiers::shift()), &square, true);
        assert_eq!(ray.direction, 18.0);

        let mut cone = doc(ShapeKind::Cone, 0.0);
        system_rotation(&mut cone, &WheelInput::notch(-100.0, Modifiers::default()), &square, false);
        assert_eq!(cone.direction, 355.0);
    }

    #[test]
    fn test_rect_resizes_instead_of_rotating() {
        let grid = Grid::default();
        let mut rect = doc(ShapeKind::Rect, 45.0);
        system_rotation(&mut rect, &WheelInput::notch(-100.0, Modifiers::default()), &grid, true);
        assert!((rect.distance - (30.0 + RECT_RESIZE_STEP)).abs() < 1e-9);
        assert_eq!(rect.direction, 45.0);
    }

    #[test]
    fn test_rect_shrink_floors_at_zero() {
        let grid = Grid::default();
        let mut rect = doc(ShapeKind::Rect, 45.0);
        for _ in 0..5 {
            system_rotation(&mut rect, &WheelInput::notch(100.0, Modifiers::default()), &grid, true);
        }
        assert_eq!(rect.distance, 0.0);
        assert!(rect.is_empty());
    }

    #[test]
    fn test_advanced_rotation_accumulates() {
        let mut cone = doc(ShapeKind::Cone, 10.0);
        let mut offset = 0.0;
        assert!(advanced_rotation(&mut cone, &WheelInput::notch(-1.0, Modifiers::default()), 15.0, &mut offset));
        assert!(advanced_rotation(&mut cone, &WheelInput::notch(-1.0, Modifiers::default()), 15.0, &mut offset));
        assert_eq!(cone.direction, 340.0);
        assert_eq!(offset, -30.0);
    }

    #[test]
    fn test_advanced_rotation_disabled() {
        let mut cone = doc(ShapeKind::Cone, 10.0);
        let mut offset = 0.0;
        assert!(!advanced_rotation(&mut cone, &WheelInput::notch(1.0, Modifiers::default()), 0.0, &mut offset));
        assert_eq!(cone.direction, 10.0);
        assert_eq!(offset, 0.0);
    }

    #[test]
    fn test_directions_stay_normalized() {
        let grid = Grid::default();
        let mut cone = doc(ShapeKind::Cone, 0.0);
        let mut offset = 0.0;
        for i in 0..50 {
            let wheel = WheelInput::notch(if i % 3 == 0 { 1.0 } else { -1.0 }, Modifiers::default());
            system_rotation(&mut cone, &wheel, &grid, i % 2 == 0);
            advanced_rotation(&mut cone, &wheel, 22.5, &mut offset);
            assert!((0.0..360.0).contains(&cone.direction));
        }
    }
}
