//! The host canvas a placement session runs inside.

use crate::error::{PlacementError, PlacementResult};
use crate::grid::Grid;
use crate::takeover::{InteractionLayer, SharedLayer};
use crate::template::{TemplateDocument, TemplateId};
use crate::token::{Token, TokenId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canvas layers a user can have active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CanvasLayer {
    #[default]
    Tokens,
    Templates,
    Drawings,
    Walls,
    Lighting,
    Notes,
}

/// What a renderer needs to draw the template preview.
#[derive(Debug, Clone, Copy)]
pub struct PreviewFrame<'a> {
    pub document: &'a TemplateDocument,
    pub preview_visible: bool,
    pub error_icon_visible: bool,
    /// Control icon override, when the origin sits on a square's edge.
    pub icon: Option<Point>,
    /// Text lines shown next to the control icon.
    pub status_text: &'a [String],
    /// Centers of the grid cells to highlight. Empty off square grids.
    pub highlighted_cells: &'a [Point],
}

/// Everything a placement session needs from the canvas it runs on.
pub trait PlacementHost {
    /// The scene's grid, or `None` when no scene is active.
    fn grid(&self) -> Option<&Grid>;

    /// Tokens on the scene.
    fn tokens(&self) -> &[Token];

    /// Find a token by id.
    fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens().iter().find(|token| token.id == id)
    }

    /// Current pointer position in canvas coordinates.
    fn pointer_position(&self) -> Point;

    /// The currently active layer.
    fn active_layer(&self) -> CanvasLayer;

    /// Activate a layer.
    fn activate_layer(&mut self, layer: CanvasLayer);

    /// The template layer's interaction surface.
    fn template_layer(&self) -> SharedLayer;

    /// Show the placement hint.
    fn show_hint(&mut self, title: &str, hint: &str);

    /// Close the placement hint.
    fn close_hint(&mut self);

    /// Show an error notification.
    fn notify_error(&mut self, message: &str);

    /// Replace the user's target selection.
    fn update_targets(&mut self, ids: &[TokenId]);

    /// Redraw the template preview.
    fn refresh_preview(&mut self, frame: &PreviewFrame<'_>);

    /// Tear down the preview (the layer's drag-cancel cleanup).
    fn cancel_preview(&mut self);

    /// Persist a new template document, returning it with its id.
    fn create_template(&mut self, document: &TemplateDocument) -> PlacementResult<TemplateDocument>;

    /// Delete a persisted template.
    fn delete_template(&mut self, id: TemplateId) -> PlacementResult<()>;

    /// Current world time in seconds.
    fn world_time(&self) -> f64;

    /// Initiative of the current combatant, if a combat is running.
    fn current_initiative(&self) -> Option<f64>;

    /// Finish the teardown of a session that was dropped before it settled.
    ///
    /// Closes the hint, clears the preview and reactivates the layer that was
    /// active before the session. Hosts call this after dropping a session or
    /// once per frame. Returns `false` when nothing was pending.
    fn apply_deferred_teardown(&mut self) -> bool {
        let Some(teardown) = self.template_layer().borrow_mut().take_deferred_teardown() else {
            return false;
        };
        self.cancel_preview();
        self.close_hint();
        self.activate_layer(teardown.restore_layer);
        true
    }
}

/// A scene: grid and tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    #[serde(default)]
    pub grid: Grid,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

/// In-memory host for tests and tooling.
#[derive(Debug, Default)]
pub struct MemoryCanvas {
    pub scene: Option<Scene>,
    pub pointer: Point,
    pub active_layer: CanvasLayer,
    layer: SharedLayer,
    /// Currently shown hint `(title, hint)`.
    pub hint: Option<(String, String)>,
    pub notifications: Vec<String>,
    pub targets: Vec<TokenId>,
    pub target_updates: usize,
    pub templates: Vec<TemplateDocument>,
    pub refreshes: usize,
    pub preview_visible: bool,
    pub error_icon_visible: bool,
    pub status_text: Vec<String>,
    pub highlighted_cells: Vec<Point>,
    pub preview_cancels: usize,
    pub world_time: f64,
    pub initiative: Option<f64>,
}

impl MemoryCanvas {
    /// Create a canvas showing the given scene.
    pub fn new(scene: Scene) -> Self {
        Self {
            scene: Some(scene),
            layer: InteractionLayer::new().shared(),
            ..Self::default()
        }
    }

    /// A canvas with no active scene.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Move the pointer.
    pub fn set_pointer(&mut self, point: Point) {
        self.pointer = point;
    }

    /// Add a token, returning its id.
    pub fn add_token(&mut self, token: Token) -> TokenId {
        let id = token.id;
        if let Some(scene) = self.scene.as_mut() {
            scene.tokens.push(token);
        }
        id
    }
}

impl PlacementHost for MemoryCanvas {
    fn grid(&self) -> Option<&Grid> {
        self.scene.as_ref().map(|scene| &scene.grid)
    }

    fn tokens(&self) -> &[Token] {
        self.scene.as_ref().map(|scene| scene.tokens.as_slice()).unwrap_or(&[])
    }

    fn pointer_position(&self) -> Point {
        self.pointer
    }

    fn active_layer(&self) -> CanvasLayer {
        self.active_layer
    }

    fn activate_layer(&mut self, layer: CanvasLayer) {
        self.active_layer = layer;
    }

    fn template_layer(&self) -> SharedLayer {
        self.layer.clone()
    }

    fn show_hint(&mut self, title: &str, hint: &str) {
        self.hint = Some((title.to_string(), hint.to_string()));
    }

    fn close_hint(&mut self) {
        self.hint = None;
    }

    fn notify_error(&mut self, message: &str) {
        log::warn!("{}", message);
        self.notifications.push(message.to_string());
    }

    fn update_targets(&mut self, ids: &[TokenId]) {
        self.targets = ids.to_vec();
        self.target_updates += 1;
    }

    fn refresh_preview(&mut self, frame: &PreviewFrame<'_>) {
        self.refreshes += 1;
        self.preview_visible = frame.preview_visible;
        self.error_icon_visible = frame.error_icon_visible;
        self.status_text = frame.status_text.to_vec();
        self.highlighted_cells = frame.highlighted_cells.to_vec();
    }

    fn cancel_preview(&mut self) {
        self.preview_cancels += 1;
        self.preview_visible = false;
        self.highlighted_cells.clear();
    }

    fn create_template(&mut self, document: &TemplateDocument) -> PlacementResult<TemplateDocument> {
        if self.scene.is_none() {
            return Err(PlacementError::NoScene);
        }
        let mut persisted = document.clone();
        persisted.id = Some(Uuid::new_v4());
        self.templates.push(persisted.clone());
        Ok(persisted)
    }

    fn delete_template(&mut self, id: TemplateId) -> PlacementResult<()> {
        let before = self.templates.len();
        self.templates.retain(|doc| doc.id != Some(id));
        if self.templates.len() == before {
            return Err(PlacementError::Persistence(format!("Template not found: {}", id)));
        }
        Ok(())
    }

    fn world_time(&self) -> f64 {
        self.world_time
    }

    fn current_initiative(&self) -> Option<f64> {
        self.initiative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ShapeKind;

    #[test]
    fn test_create_and_delete_template() {
        let mut canvas = MemoryCanvas::new(Scene::default());
        let doc = TemplateDocument::new(ShapeKind::Circle, 20.0);
        let persisted = canvas.create_template(&doc).unwrap();
        assert!(persisted.id.is_some());
        assert_eq!(canvas.templates.len(), 1);

        let id = persisted.id.unwrap();
        canvas.delete_template(id).unwrap();
        assert!(canvas.templates.is_empty());
        assert!(matches!(canvas.delete_template(id), Err(PlacementError::Persistence(_))));
    }

    #[test]
    fn test_no_scene() {
        let mut canvas = MemoryCanvas::empty();
        assert!(canvas.grid().is_none());
        assert!(canvas.tokens().is_empty());
        let doc = TemplateDocument::new(ShapeKind::Circle, 20.0);
        assert!(matches!(canvas.create_template(&doc), Err(PlacementError::NoScene)));
    }

    #[test]
    fn test_token_lookup() {
        let mut canvas = MemoryCanvas::new(Scene::default());
        let id = canvas.add_token(Token::new("Fighter", Point::new(0.0, 0.0), 1.0, 1.0));
        assert_eq!(canvas.token(id).map(|t| t.name.as_str()), Some("Fighter"));
    }
}
