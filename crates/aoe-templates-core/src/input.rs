//! Pointer, wheel and keyboard-modifier events delivered to a placement session.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Only shift held.
    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::default()
        }
    }

    /// Only ctrl held.
    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }
}

/// Buttons held down during a pointer move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeldButtons {
    pub left: bool,
    pub right: bool,
}

impl HeldButtons {
    /// Decode a DOM-style `buttons` bitmask (bit 0 left, bit 1 right).
    pub fn from_mask(mask: u8) -> Self {
        Self {
            left: mask & 1 > 0,
            right: mask & 2 > 0,
        }
    }
}

/// Pointer moved over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerMove {
    /// Position in canvas (world) coordinates.
    pub position: Point,
    #[serde(default)]
    pub buttons: HeldButtons,
    /// Whether the host's interaction manager considers this a drag.
    #[serde(default)]
    pub dragging: bool,
    /// Monotonic timestamp in milliseconds.
    pub timestamp: f64,
}

impl PointerMove {
    /// A plain move with no buttons held.
    pub fn at(position: Point, timestamp: f64) -> Self {
        Self {
            position,
            buttons: HeldButtons::default(),
            dragging: false,
            timestamp,
        }
    }
}

/// Mouse wheel turned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelInput {
    pub delta_y: f64,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl WheelInput {
    /// One notch in the given direction with the given modifiers.
    pub fn notch(delta_y: f64, modifiers: Modifiers) -> Self {
        Self { delta_y, modifiers }
    }

    /// Sign of the wheel delta: -1, 0 or 1.
    pub fn sign(&self) -> f64 {
        if self.delta_y > 0.0 {
            1.0
        } else if self.delta_y < 0.0 {
            -1.0
        } else {
            0.0
        }
    }
}

/// An event routed to a placement session by the host's listeners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlacementEvent {
    /// Pointer moved.
    Move(PointerMove),
    /// A mouse button was released (confirm on left).
    Up { button: MouseButton },
    /// Secondary click / context menu (cancel).
    ContextMenu,
    /// Wheel turned (rotate or resize).
    Wheel(WheelInput),
}

/// Host listeners a session installs for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListenerKind {
    PointerMove,
    PointerUp,
    ContextMenu,
    Wheel,
}

impl ListenerKind {
    /// Every listener a session installs.
    pub const ALL: [ListenerKind; 4] = [
        ListenerKind::PointerMove,
        ListenerKind::PointerUp,
        ListenerKind::ContextMenu,
        ListenerKind::Wheel,
    ];
}

impl PlacementEvent {
    /// The listener that delivers this event.
    pub fn listener(&self) -> ListenerKind {
        match self {
            PlacementEvent::Move(_) => ListenerKind::PointerMove,
            PlacementEvent::Up { .. } => ListenerKind::PointerUp,
            PlacementEvent::ContextMenu => ListenerKind::ContextMenu,
            PlacementEvent::Wheel(_) => ListenerKind::Wheel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mask() {
        assert_eq!(HeldButtons::from_mask(0), HeldButtons::default());
        assert!(HeldButtons::from_mask(1).left);
        assert!(HeldButtons::from_mask(2).right);
        let both = HeldButtons::from_mask(3);
        assert!(both.left && both.right);
    }

    #[test]
    fn test_wheel_sign() {
        assert_eq!(WheelInput::notch(120.0, Modifiers::default()).sign(), 1.0);
        assert_eq!(WheelInput::notch(-3.0, Modifiers::default()).sign(), -1.0);
        assert_eq!(WheelInput::notch(0.0, Modifiers::default()).sign(), 0.0);
    }

    #[test]
    fn test_event_json() {
        let event: PlacementEvent = serde_json::from_str(
            r#"{"type":"move","position":{"x":10.0,"y":20.0},"timestamp":5.0}"#,
        )
        .unwrap();
        assert_eq!(event, PlacementEvent::Move(PointerMove::at(Point::new(10.0, 20.0), 5.0)));
        assert_eq!(event.listener(), ListenerKind::PointerMove);

        let up: PlacementEvent = serde_json::from_str(r#"{"type":"up","button":"left"}"#).unwrap();
        assert_eq!(up, PlacementEvent::Up { button: MouseButton::Left });
    }
}
