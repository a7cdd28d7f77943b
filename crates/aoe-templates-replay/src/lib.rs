//! Scripted replay of template placements.
//!
//! A replay script bundles a scene, placement settings, the ability's
//! template data and a sequence of input events. [`run`] drives a
//! placement session through the events against a [`MemoryCanvas`] and
//! reports how it ended.

use aoe_templates_core::{
    AbilityTemplateData, CanvasLayer, Localizer, MemoryCanvas, PlacementError, PlacementEvent,
    PlacementSession, PlacementSettings, Scene, TemplateDocument, TokenId, VariantKind,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid script: {0}")]
    Parse(String),
    #[error("Failed to serialize report: {0}")]
    Serialize(String),
    #[error("Nothing to place: the ability has no shape or size, or the scene is missing")]
    NothingToPlace,
    #[error(transparent)]
    Placement(#[from] PlacementError),
}

/// Result type for replay operations.
pub type ReplayResult<T> = Result<T, ReplayError>;

fn yes() -> bool {
    true
}

/// A scripted placement.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayScript {
    #[serde(default)]
    pub settings: PlacementSettings,
    /// Localization overrides on top of the English strings.
    #[serde(default)]
    pub strings: HashMap<String, String>,
    pub scene: Scene,
    /// Pointer position when the session starts.
    #[serde(default)]
    pub pointer: Point,
    #[serde(default)]
    pub active_layer: CanvasLayer,
    #[serde(default)]
    pub world_time: f64,
    #[serde(default)]
    pub initiative: Option<f64>,
    pub ability: AbilityTemplateData,
    #[serde(default)]
    pub events: Vec<PlacementEvent>,
    /// Persist the template once confirmed.
    #[serde(default = "yes")]
    pub place: bool,
}

impl ReplayScript {
    /// Parse a script from JSON.
    pub fn from_json(json: &str) -> ReplayResult<Self> {
        serde_json::from_str(json).map_err(|e| ReplayError::Parse(e.to_string()))
    }
}

/// Load a script from a JSON file.
pub fn load_script(path: &Path) -> ReplayResult<ReplayScript> {
    let json = fs::read_to_string(path)
        .map_err(|e| ReplayError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    ReplayScript::from_json(&json)
}

/// How a replayed placement ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ReplayOutcome {
    /// Confirmed and persisted.
    Placed { document: TemplateDocument },
    /// Confirmed but not persisted.
    Confirmed { document: TemplateDocument },
    Cancelled,
}

/// What happened during a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub variant: VariantKind,
    pub outcome: ReplayOutcome,
    /// Events handled before the session finished.
    pub events_handled: usize,
    pub targets: Vec<TokenId>,
    pub notifications: Vec<String>,
    /// Status text of the last preview refresh.
    pub status_text: Vec<String>,
    pub refreshes: usize,
}

impl ReplayReport {
    /// Serialize the report to pretty JSON.
    pub fn to_json(&self) -> ReplayResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ReplayError::Serialize(e.to_string()))
    }
}

/// Run a script to completion.
///
/// Events after the session finishes are not delivered. A session still
/// running when the events run out is cancelled.
pub async fn run(script: ReplayScript) -> ReplayResult<ReplayReport> {
    let i18n = Localizer::english().with_overrides(script.strings);
    let mut canvas = MemoryCanvas::new(script.scene);
    canvas.set_pointer(script.pointer);
    canvas.active_layer = script.active_layer;
    canvas.world_time = script.world_time;
    canvas.initiative = script.initiative;

    let mut session = PlacementSession::from_data(&script.ability, &mut canvas, &script.settings, &i18n)?
        .ok_or(ReplayError::NothingToPlace)?;
    let variant = session.variant().kind;
    log::info!("Replaying {:?} placement with {} events", variant, script.events.len());

    let ticket = session.activate(&mut canvas);
    let mut events_handled = 0;
    for event in &script.events {
        if ticket.is_settled() {
            break;
        }
        if let PlacementEvent::Move(pointer) = event {
            canvas.set_pointer(pointer.position);
        }
        session.handle_event(&mut canvas, event);
        events_handled += 1;
    }

    if !ticket.is_settled() {
        log::warn!("Script ended before the placement finished, cancelling");
        session.force_finish(&mut canvas);
    }

    let outcome = match ticket.await {
        Ok(mut result) if script.place => ReplayOutcome::Placed {
            document: result.place(&mut canvas)?,
        },
        Ok(result) => ReplayOutcome::Confirmed {
            document: result.document().clone(),
        },
        Err(_) => ReplayOutcome::Cancelled,
    };

    Ok(ReplayReport {
        variant,
        outcome,
        events_handled,
        targets: canvas.targets.clone(),
        notifications: canvas.notifications.clone(),
        status_text: canvas.status_text.clone(),
        refreshes: canvas.refreshes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aoe_templates_core::{MouseButton, ShapeKind};
    use std::io::Write;

    const WIZARD: &str = "00000000-0000-0000-0000-000000000001";
    const GOBLIN: &str = "00000000-0000-0000-0000-000000000002";

    fn burst_script(events: &str) -> String {
        format!(
            r#"{{
                "scene": {{
                    "grid": {{ "kind": "square", "size": 100, "distance": 5 }},
                    "tokens": [
                        {{ "id": "{WIZARD}", "name": "Wizard", "x": 0, "y": 0 }},
                        {{ "id": "{GOBLIN}", "name": "Goblin", "x": 300, "y": 200 }}
                    ]
                }},
                "ability": {{ "t": "circle", "distance": 10, "maxRange": 30, "flags": {{ "tokenId": "{WIZARD}" }} }},
                "events": {events}
            }}"#
        )
    }

    #[test]
    fn test_parse_events() {
        let script = ReplayScript::from_json(&burst_script(
            r#"[
                { "type": "move", "position": { "x": 310, "y": 190 }, "timestamp": 100 },
                { "type": "wheel", "deltaY": -1, "modifiers": { "shift": true } },
                { "type": "contextMenu" },
                { "type": "up", "button": "left" }
            ]"#,
        ))
        .unwrap();

        assert_eq!(script.events.len(), 4);
        assert!(script.place);
        assert_eq!(script.ability.shape, Some(ShapeKind::Circle));
        assert_eq!(script.events[2], PlacementEvent::ContextMenu);
        assert_eq!(
            script.events[3],
            PlacementEvent::Up {
                button: MouseButton::Left
            }
        );
    }

    #[test]
    fn test_run_places_burst() {
        let script = ReplayScript::from_json(&burst_script(
            r#"[
                { "type": "move", "position": { "x": 310, "y": 190 }, "timestamp": 100 },
                { "type": "up", "button": "left" },
                { "type": "contextMenu" }
            ]"#,
        ))
        .unwrap();

        let report = pollster::block_on(run(script)).unwrap();
        assert_eq!(report.variant, VariantKind::CircleGridIntersection);
        assert_eq!(report.events_handled, 2);
        assert_eq!(report.targets.len(), 1);
        assert_eq!(report.targets[0].to_string(), GOBLIN);

        let ReplayOutcome::Placed { document } = &report.outcome else {
            panic!("expected a placed template, got {:?}", report.outcome);
        };
        assert!(document.id.is_some());
        assert_eq!((document.x, document.y), (300.0, 200.0));
    }

    #[test]
    fn test_run_out_of_range() {
        let script = ReplayScript::from_json(&burst_script(
            r#"[
                { "type": "move", "position": { "x": 900, "y": 0 }, "timestamp": 100 },
                { "type": "up", "button": "left" }
            ]"#,
        ))
        .unwrap();

        let report = pollster::block_on(run(script)).unwrap();
        assert_eq!(report.outcome, ReplayOutcome::Cancelled);
        assert_eq!(report.notifications, vec!["Out of range".to_string()]);
    }

    #[test]
    fn test_unfinished_script_is_cancelled() {
        let script = ReplayScript::from_json(&burst_script(
            r#"[{ "type": "move", "position": { "x": 310, "y": 190 }, "timestamp": 100 }]"#,
        ))
        .unwrap();

        let report = pollster::block_on(run(script)).unwrap();
        assert_eq!(report.outcome, ReplayOutcome::Cancelled);
        assert_eq!(report.events_handled, 1);

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["outcome"]["status"], "cancelled");
        assert_eq!(json["eventsHandled"], 1);
    }

    #[test]
    fn test_nothing_to_place() {
        let mut script = ReplayScript::from_json(&burst_script("[]")).unwrap();
        script.ability.distance = 0.0;
        assert!(matches!(pollster::block_on(run(script)), Err(ReplayError::NothingToPlace)));
    }

    #[test]
    fn test_load_script_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("burst.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(burst_script("[]").as_bytes()).unwrap();

        let script = load_script(&path).unwrap();
        assert_eq!(script.scene.tokens.len(), 2);

        let missing = load_script(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ReplayError::Io(_))));
    }
}
