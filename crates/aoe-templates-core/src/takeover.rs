//! Temporary takeover of the template layer's interaction handlers.
//!
//! While a session runs, the template layer's own drag and click handlers
//! are replaced with no-ops and the session's listeners are installed. The
//! [`HandlerTakeover`] guard puts everything back exactly once, either when
//! released explicitly or when dropped.
//!
//! A guard dropped while still held also leaves a [`DeferredTeardown`] on the
//! layer. The host drains it with [`PlacementHost::apply_deferred_teardown`]
//! to close the hint, clear the preview and reactivate the previous layer.
//!
//! [`PlacementHost::apply_deferred_teardown`]: crate::host::PlacementHost::apply_deferred_teardown

use crate::host::CanvasLayer;
use crate::input::ListenerKind;
use kurbo::Point;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Handler slots on the template layer that a session stubs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerSlot {
    DragLeftStart,
    DragLeftMove,
    DragLeftCancel,
    DragLeftDrop,
    ClickLeft,
    ClickLeft2,
}

impl HandlerSlot {
    pub const ALL: [HandlerSlot; 6] = [
        HandlerSlot::DragLeftStart,
        HandlerSlot::DragLeftMove,
        HandlerSlot::DragLeftCancel,
        HandlerSlot::DragLeftDrop,
        HandlerSlot::ClickLeft,
        HandlerSlot::ClickLeft2,
    ];
}

/// A layer interaction handler.
pub type LayerHandler = Rc<dyn Fn(Point)>;

/// Host-side cleanup left behind by a takeover that was dropped while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredTeardown {
    /// Layer that was active before the takeover.
    pub restore_layer: CanvasLayer,
}

/// The host's interaction surface for templates: handler slots plus installed listeners.
#[derive(Default)]
pub struct InteractionLayer {
    handlers: HashMap<HandlerSlot, LayerHandler>,
    listeners: HashSet<ListenerKind>,
    deferred: Option<DeferredTeardown>,
}

impl std::fmt::Debug for InteractionLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionLayer")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("listeners", &self.listeners)
            .field("deferred", &self.deferred)
            .finish()
    }
}

/// Shared handle to an interaction layer.
pub type SharedLayer = Rc<RefCell<InteractionLayer>>;

impl InteractionLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in a shared handle.
    pub fn shared(self) -> SharedLayer {
        Rc::new(RefCell::new(self))
    }

    /// Get the handler in a slot.
    pub fn handler(&self, slot: HandlerSlot) -> Option<LayerHandler> {
        self.handlers.get(&slot).cloned()
    }

    /// Put a handler in a slot, returning the previous one.
    pub fn set_handler(&mut self, slot: HandlerSlot, handler: LayerHandler) -> Option<LayerHandler> {
        self.handlers.insert(slot, handler)
    }

    /// Run the handler in a slot, if any.
    pub fn dispatch(&self, slot: HandlerSlot, point: Point) {
        if let Some(handler) = self.handlers.get(&slot) {
            handler(point);
        }
    }

    /// Check whether a listener is installed.
    pub fn has_listener(&self, kind: ListenerKind) -> bool {
        self.listeners.contains(&kind)
    }

    /// Number of installed listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Take the pending host-side cleanup, if a takeover left one.
    pub fn take_deferred_teardown(&mut self) -> Option<DeferredTeardown> {
        self.deferred.take()
    }
}

fn noop_handler() -> LayerHandler {
    Rc::new(|_: Point| {})
}

/// Scoped ownership of the layer's handler slots and the session's listeners.
pub struct HandlerTakeover {
    layer: SharedLayer,
    /// Handlers to restore; `None` once released.
    saved: Option<Vec<(HandlerSlot, Option<LayerHandler>)>>,
    listeners: Vec<ListenerKind>,
    restore_layer: CanvasLayer,
}

impl std::fmt::Debug for HandlerTakeover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerTakeover")
            .field("held", &self.is_held())
            .field("listeners", &self.listeners)
            .field("restore_layer", &self.restore_layer)
            .finish()
    }
}

impl HandlerTakeover {
    /// Stub every handler slot and install the given listeners.
    ///
    /// `restore_layer` is the canvas layer to reactivate once the takeover ends.
    pub fn acquire(layer: SharedLayer, listeners: &[ListenerKind], restore_layer: CanvasLayer) -> Self {
        let saved = {
            let mut surface = layer.borrow_mut();
            surface.listeners.extend(listeners.iter().copied());
            HandlerSlot::ALL
                .iter()
                .map(|&slot| (slot, surface.handlers.insert(slot, noop_handler())))
                .collect()
        };
        Self {
            layer,
            saved: Some(saved),
            listeners: listeners.to_vec(),
            restore_layer,
        }
    }

    /// The canvas layer that was active before the takeover.
    pub fn restore_layer(&self) -> CanvasLayer {
        self.restore_layer
    }

    /// Check whether the takeover is still in effect.
    pub fn is_held(&self) -> bool {
        self.saved.is_some()
    }

    /// Remove the listeners and restore the original handlers.
    /// Returns `false` if this had already happened.
    pub fn release(&mut self) -> bool {
        let Some(saved) = self.saved.take() else {
            return false;
        };
        let mut surface = self.layer.borrow_mut();
        for kind in &self.listeners {
            surface.listeners.remove(kind);
        }
        for (slot, handler) in saved {
            match handler {
                Some(handler) => {
                    surface.handlers.insert(slot, handler);
                }
                None => {
                    surface.handlers.remove(&slot);
                }
            }
        }
        log::debug!("Restored template layer handlers");
        true
    }
}

impl Drop for HandlerTakeover {
    fn drop(&mut self) {
        if self.release() {
            self.layer.borrow_mut().deferred = Some(DeferredTeardown {
                restore_layer: self.restore_layer,
            });
            log::debug!("Deferred template layer teardown to the host");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting_handler(counter: &Rc<Cell<u32>>) -> LayerHandler {
        let counter = counter.clone();
        Rc::new(move |_: Point| counter.set(counter.get() + 1))
    }

    #[test]
    fn test_acquire_stubs_and_release_restores() {
        let hits = Rc::new(Cell::new(0));
        let original = counting_handler(&hits);
        let mut layer = InteractionLayer::new();
        layer.set_handler(HandlerSlot::ClickLeft, original.clone());
        let layer = layer.shared();

        let mut takeover = HandlerTakeover::acquire(layer.clone(), &ListenerKind::ALL, CanvasLayer::Tokens);
        layer.borrow().dispatch(HandlerSlot::ClickLeft, Point::ZERO);
        assert_eq!(hits.get(), 0);
        assert_eq!(layer.borrow().listener_count(), 4);

        assert!(takeover.release());
        let restored = layer.borrow().handler(HandlerSlot::ClickLeft).unwrap();
        assert!(Rc::ptr_eq(&restored, &original));
        assert!(layer.borrow().handler(HandlerSlot::DragLeftDrop).is_none());
        assert_eq!(layer.borrow().listener_count(), 0);

        drop(takeover);
        assert!(layer.borrow_mut().take_deferred_teardown().is_none());
    }

    #[test]
    fn test_release_happens_once() {
        let layer = InteractionLayer::new().shared();
        let mut takeover = HandlerTakeover::acquire(layer.clone(), &[ListenerKind::Wheel], CanvasLayer::Tokens);
        assert!(takeover.release());

        // Something else takes the slot afterwards; a second release must not clobber it.
        let hits = Rc::new(Cell::new(0));
        let later = counting_handler(&hits);
        layer.borrow_mut().set_handler(HandlerSlot::ClickLeft, later.clone());
        assert!(!takeover.release());
        drop(takeover);

        let current = layer.borrow().handler(HandlerSlot::ClickLeft).unwrap();
        assert!(Rc::ptr_eq(&current, &later));
    }

    #[test]
    fn test_drop_releases() {
        let hits = Rc::new(Cell::new(0));
        let original = counting_handler(&hits);
        let mut layer = InteractionLayer::new();
        layer.set_handler(HandlerSlot::DragLeftStart, original.clone());
        let layer = layer.shared();

        {
            let _takeover = HandlerTakeover::acquire(layer.clone(), &ListenerKind::ALL, CanvasLayer::Tokens);
            assert!(layer.borrow().has_listener(ListenerKind::PointerMove));
        }

        layer.borrow().dispatch(HandlerSlot::DragLeftStart, Point::ZERO);
        assert_eq!(hits.get(), 1);
        assert!(!layer.borrow().has_listener(ListenerKind::PointerMove));
    }

    #[test]
    fn test_drop_while_held_defers_host_teardown() {
        let layer = InteractionLayer::new().shared();
        drop(HandlerTakeover::acquire(layer.clone(), &ListenerKind::ALL, CanvasLayer::Walls));

        let deferred = layer.borrow_mut().take_deferred_teardown();
        assert_eq!(
            deferred,
            Some(DeferredTeardown {
                restore_layer: CanvasLayer::Walls
            })
        );
        assert!(layer.borrow_mut().take_deferred_teardown().is_none());
    }
}
