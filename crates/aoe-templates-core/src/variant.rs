//! Placement variants: the policy table selected per shape and placement sub-type.

use crate::error::{PlacementError, PlacementResult};
use crate::grid::{Grid, GridKind, SnapMode};
use crate::square::AnglePoints;
use crate::template::{ShapeKind, TemplateDocument};
use crate::token::Token;
use serde::{Deserialize, Serialize};

/// Where a template's orientation is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AngleOrigin {
    /// Not anchored; the template is placed freely.
    None,
    /// Anchored to the source token's footprint.
    Token,
    /// Anchored to a point the user picks first.
    Current,
}

/// What pointer movement updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlacementType {
    /// Position follows the snapped pointer.
    SetXy,
    /// Position and direction follow the token edge facing the pointer.
    SetXyFromToken,
    /// Only the direction follows the pointer.
    SetAngle,
}

/// Wheel behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RotationType {
    /// Wheel does nothing.
    None,
    /// Host-native: rotate by fixed increments, ctrl resizes.
    System,
    /// Rotate by the configured snap angle, remembering the offset.
    Advanced,
}

/// Placement sub-type requested by the ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementSubType {
    #[serde(rename = "useSystem")]
    UseSystem,
    #[serde(rename = "self")]
    FromSelf,
    #[serde(rename = "splash")]
    Splash,
    #[serde(rename = "grid")]
    Grid,
    #[serde(rename = "selectTargetSquare")]
    SelectTargetSquare,
}

impl PlacementSubType {
    /// Parse the flag value. Unknown values yield `None` and fall through to defaults.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "useSystem" => Some(Self::UseSystem),
            "self" => Some(Self::FromSelf),
            "splash" => Some(Self::Splash),
            "grid" => Some(Self::Grid),
            "selectTargetSquare" => Some(Self::SelectTargetSquare),
            _ => None,
        }
    }
}

/// Concrete placement variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariantKind {
    CircleSelf,
    CircleGridIntersection,
    CircleSplash,
    CircleSystem,
    ConeFromSelf,
    ConeFromTargetSquare,
    ConeSystem,
    LineFromSelf,
    LineFromSquare,
    LineSystem,
    RectCentered,
}

impl VariantKind {
    /// Select the variant for an ability.
    ///
    /// Rectangles only exist on square grids; elsewhere they become a
    /// host-rotated line (see [`convert_rect_to_ray`]).
    pub fn lookup(
        shape: ShapeKind,
        sub_type: Option<PlacementSubType>,
        has_token: bool,
        grid: GridKind,
    ) -> Self {
        use PlacementSubType as Sub;
        match shape {
            ShapeKind::Circle => match sub_type {
                Some(Sub::FromSelf) if has_token => VariantKind::CircleSelf,
                Some(Sub::Splash) => VariantKind::CircleSplash,
                Some(Sub::UseSystem) => VariantKind::CircleSystem,
                _ => VariantKind::CircleGridIntersection,
            },
            ShapeKind::Cone => match sub_type {
                Some(Sub::SelectTargetSquare) => VariantKind::ConeFromTargetSquare,
                Some(Sub::UseSystem) => VariantKind::ConeSystem,
                _ if has_token => VariantKind::ConeFromSelf,
                _ => VariantKind::ConeFromTargetSquare,
            },
            ShapeKind::Ray => match sub_type {
                Some(Sub::SelectTargetSquare) => VariantKind::LineFromSquare,
                Some(Sub::UseSystem) => VariantKind::LineSystem,
                _ if has_token => VariantKind::LineFromSelf,
                _ => VariantKind::LineFromSquare,
            },
            ShapeKind::Rect if grid.is_square() => VariantKind::RectCentered,
            ShapeKind::Rect => VariantKind::LineSystem,
        }
    }

    /// The policy values for this variant.
    pub fn variant(self) -> PlacementVariant {
        use AngleOrigin as O;
        use PlacementType as P;
        use RotationType as R;
        let base = PlacementVariant {
            kind: self,
            angle_origin: O::None,
            placement_type: P::SetXy,
            angle_points: AnglePoints::All,
            rotation: R::System,
            snap_mode: SnapMode::VertexOrCenter,
            selects_origin: false,
            select_origin_text: "",
            finalize: None,
        };
        match self {
            VariantKind::CircleSelf => PlacementVariant {
                angle_origin: O::Token,
                placement_type: P::SetXyFromToken,
                angle_points: AnglePoints::Center,
                rotation: R::None,
                snap_mode: SnapMode::Vertex,
                finalize: Some(finalize_emanation),
                ..base
            },
            VariantKind::CircleGridIntersection => PlacementVariant {
                rotation: R::None,
                snap_mode: SnapMode::Vertex,
                ..base
            },
            VariantKind::CircleSplash => PlacementVariant {
                rotation: R::None,
                snap_mode: SnapMode::Center,
                ..base
            },
            VariantKind::CircleSystem | VariantKind::ConeSystem => base,
            VariantKind::ConeFromSelf => PlacementVariant {
                angle_origin: O::Token,
                placement_type: P::SetXyFromToken,
                rotation: R::Advanced,
                snap_mode: SnapMode::Vertex,
                ..base
            },
            VariantKind::ConeFromTargetSquare => PlacementVariant {
                angle_origin: O::Current,
                placement_type: P::SetAngle,
                rotation: R::Advanced,
                selects_origin: true,
                select_origin_text: "selectOrigin.square",
                ..base
            },
            VariantKind::LineFromSelf => PlacementVariant {
                angle_origin: O::Token,
                placement_type: P::SetXyFromToken,
                rotation: R::Advanced,
                snap_mode: SnapMode::Vertex,
                finalize: Some(finalize_line_width),
                ..base
            },
            VariantKind::LineFromSquare => PlacementVariant {
                angle_origin: O::Current,
                placement_type: P::SetAngle,
                rotation: R::Advanced,
                selects_origin: true,
                select_origin_text: "selectOrigin.square",
                finalize: Some(finalize_line_width),
                ..base
            },
            VariantKind::LineSystem => PlacementVariant {
                finalize: Some(finalize_line_width),
                ..base
            },
            VariantKind::RectCentered => PlacementVariant {
                snap_mode: SnapMode::Center,
                finalize: Some(finalize_centered_rect),
                ..base
            },
        }
    }
}

/// Context handed to finalize hooks.
#[derive(Debug, Clone, Copy)]
pub struct FinalizeContext<'a> {
    pub grid: &'a Grid,
    pub token: Option<&'a Token>,
}

/// Last chance for a variant to adjust the document before it is resolved.
/// Returning `false` rejects the placement.
pub type FinalizeHook = fn(&mut TemplateDocument, &FinalizeContext<'_>) -> bool;

/// Fixed policy values for one kind of placement.
#[derive(Debug, Clone, Copy)]
pub struct PlacementVariant {
    pub kind: VariantKind,
    pub angle_origin: AngleOrigin,
    pub placement_type: PlacementType,
    pub angle_points: AnglePoints,
    pub rotation: RotationType,
    /// How the pointer is snapped before it is used.
    pub snap_mode: SnapMode,
    /// The user picks an origin before orienting the shape.
    pub selects_origin: bool,
    /// Localization key shown while the origin is being picked.
    pub select_origin_text: &'static str,
    pub finalize: Option<FinalizeHook>,
}

impl PlacementVariant {
    /// Reject policy combinations the session cannot run.
    pub fn validate(&self, has_token: bool) -> PlacementResult<()> {
        match (self.angle_origin, self.placement_type) {
            (AngleOrigin::None, PlacementType::SetAngle) => {
                return Err(PlacementError::InvalidVariant(format!(
                    "{:?}: angle-only placement needs an angle origin",
                    self.kind
                )));
            }
            (AngleOrigin::Token, _) if !has_token => {
                return Err(PlacementError::InvalidVariant(format!(
                    "{:?}: token origin without a bound token",
                    self.kind
                )));
            }
            _ => {}
        }
        if self.selects_origin != (self.angle_origin == AngleOrigin::Current) {
            return Err(PlacementError::InvalidVariant(format!(
                "{:?}: origin selection requires a current-position origin",
                self.kind
            )));
        }
        Ok(())
    }

    /// Run the finalize hook, if any.
    pub fn finalize(&self, document: &mut TemplateDocument, context: &FinalizeContext<'_>) -> bool {
        self.finalize.is_none_or(|hook| hook(document, context))
    }
}

/// Turn a rect into a line as wide as it is long, for grids rects cannot rotate on.
pub fn convert_rect_to_ray(document: &mut TemplateDocument) {
    document.shape = ShapeKind::Ray;
    document.width = document.distance;
}

/// Emanations are measured from the token's edge rather than its center.
fn finalize_emanation(document: &mut TemplateDocument, context: &FinalizeContext<'_>) -> bool {
    let Some(token) = context.token else {
        return false;
    };
    document.distance += token.width.max(token.height) * context.grid.distance / 2.0;
    true
}

/// Lines without a width are one cell wide.
fn finalize_line_width(document: &mut TemplateDocument, context: &FinalizeContext<'_>) -> bool {
    if document.width <= 0.0 {
        document.width = context.grid.distance;
    }
    true
}

/// Shift a rect so the chosen cell sits at its center.
fn finalize_centered_rect(document: &mut TemplateDocument, context: &FinalizeContext<'_>) -> bool {
    let bounds = document.rect_bounds(context.grid);
    let center = bounds.center();
    document.x -= center.x - document.x;
    document.y -= center.y - document.y;
    true
}
