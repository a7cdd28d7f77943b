//! Interactive template placement.
//!
//! A [`PlacementSession`] owns one template document while the user moves it
//! around the canvas. It is built from ability data with
//! [`PlacementSession::from_data`], activated against a host, and then fed
//! pointer, wheel and context-menu events until it is confirmed or cancelled.
//! The caller awaits the [`PlacementTicket`] returned by
//! [`PlacementSession::activate`], which completes exactly once.
//!
//! Variants that select their origin first run in two phases: the first
//! confirm locks an origin square and later pointer moves only change the
//! direction. Cancelling in the second phase returns to origin selection.

use crate::error::{Cancelled, PlacementError, PlacementResult};
use crate::expiration::compute_expiration;
use crate::grid::{Grid, angle_between};
use crate::host::{CanvasLayer, PlacementHost, PreviewFrame};
use crate::i18n::Localizer;
use crate::input::{ListenerKind, MouseButton, PlacementEvent, PointerMove, WheelInput};
use crate::range::{RangeLimits, evaluate_range};
use crate::rotation::{advanced_rotation, system_rotation};
use crate::settings::PlacementSettings;
use crate::square::{FollowPosition, GridSquare};
use crate::takeover::HandlerTakeover;
use crate::targeting::{HighlightRegion, tokens_in_region};
use crate::template::{ShapeKind, TemplateDocument, TemplateFlags};
use crate::token::Token;
use crate::variant::{
    AngleOrigin, FinalizeContext, PlacementSubType, PlacementType, PlacementVariant, RotationType,
    VariantKind, convert_rect_to_ray,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Minimum time between two handled pointer moves, in milliseconds.
pub const RENDER_THROTTLE_MS: f64 = 30.0;

/// Direction given to rects that don't specify one.
const DEFAULT_RECT_DIRECTION: f64 = 45.0;

/// Lifecycle of a placement session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Built but not yet activated.
    Inactive,
    /// Waiting for the user to pick an origin square.
    SelectingOrigin,
    /// Following the pointer.
    Tracking,
    /// Resolved with a template.
    Confirmed,
    /// Rejected.
    Cancelled,
}

impl SessionState {
    /// Check whether the session is receiving events.
    pub fn is_live(self) -> bool {
        matches!(self, SessionState::SelectingOrigin | SessionState::Tracking)
    }

    /// Check whether the session has resolved or rejected.
    pub fn is_finished(self) -> bool {
        matches!(self, SessionState::Confirmed | SessionState::Cancelled)
    }
}

/// Template data an ability asks to place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AbilityTemplateData {
    /// Shape to place. Nothing is placed without one.
    #[serde(rename = "t")]
    pub shape: Option<ShapeKind>,
    /// Size in scene units. Nothing is placed when zero.
    pub distance: f64,
    pub width: f64,
    pub angle: Option<f64>,
    pub direction: Option<f64>,
    pub flags: TemplateFlags,
    pub min_range: Option<f64>,
    pub max_range: Option<f64>,
}

/// A confirmed placement, ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateResult {
    document: TemplateDocument,
    round_time: f64,
}

impl TemplateResult {
    /// Always true; a cancelled placement never produces a result.
    pub fn success(&self) -> bool {
        true
    }

    /// The confirmed document (persisted once [`place`](Self::place) succeeds).
    pub fn document(&self) -> &TemplateDocument {
        &self.document
    }

    /// Persist the template. Its expiration is computed the first time.
    pub fn place(&mut self, host: &mut dyn PlacementHost) -> PlacementResult<TemplateDocument> {
        if self.document.flags.expiration.is_none() {
            self.document.flags.expiration = compute_expiration(
                &self.document.flags,
                host.world_time(),
                host.current_initiative(),
                self.round_time,
            );
        }

        let persisted = host.create_template(&self.document).inspect_err(|e| {
            log::error!("Failed to place template: {}", e);
        })?;
        log::debug!("Placed {:?} template {:?}", persisted.shape, persisted.id);
        self.document = persisted.clone();
        Ok(persisted)
    }

    /// Delete the persisted template. Does nothing if it was never placed.
    pub fn delete(&self, host: &mut dyn PlacementHost) -> PlacementResult<()> {
        match self.document.id {
            Some(id) => host.delete_template(id),
            None => Ok(()),
        }
    }
}

/// Shared slot the session settles and the ticket reads.
#[derive(Debug, Default)]
struct Rendezvous {
    outcome: Option<Result<TemplateResult, Cancelled>>,
    settled: bool,
    waker: Option<Waker>,
}

impl Rendezvous {
    /// Store the outcome. Only the first call has any effect.
    fn settle(&mut self, outcome: Result<TemplateResult, Cancelled>) -> bool {
        if self.settled {
            return false;
        }
        self.settled = true;
        self.outcome = Some(outcome);
        if let Some(waker) = self.waker.take() {
            waker.wake();
        }
        true
    }
}

/// Completes when the session it came from is confirmed or cancelled.
///
/// Clones share the outcome; each of them completes with its own copy.
#[derive(Debug, Clone)]
pub struct PlacementTicket {
    shared: Rc<RefCell<Rendezvous>>,
}

impl PlacementTicket {
    /// Check whether the session has settled.
    pub fn is_settled(&self) -> bool {
        self.shared.borrow().settled
    }
}

impl Future for PlacementTicket {
    type Output = Result<TemplateResult, Cancelled>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut shared = self.shared.borrow_mut();
        if let Some(outcome) = shared.outcome.clone() {
            return Poll::Ready(outcome);
        }
        shared.waker = Some(cx.waker().clone());
        Poll::Pending
    }
}

/// One run of the placement workflow.
#[derive(Debug)]
pub struct PlacementSession {
    document: TemplateDocument,
    variant: PlacementVariant,
    grid: Grid,
    token: Option<Token>,
    limits: RangeLimits,
    settings: PlacementSettings,
    i18n: Localizer,
    state: SessionState,

    selecting_origin: bool,
    in_range: bool,
    is_drag: bool,
    is_panning: bool,
    /// Timestamp of the last handled pointer move.
    last_move: Option<f64>,
    /// Accumulated advanced-rotation delta, kept while following angles.
    direction_offset: f64,
    icon: Option<Point>,
    origin_square: Option<GridSquare>,

    /// Origin selection prompt.
    prompt_text: Vec<String>,
    /// Range status lines.
    range_text: Vec<String>,
    preview_visible: bool,

    takeover: Option<HandlerTakeover>,
    rendezvous: Rc<RefCell<Rendezvous>>,
}

impl PlacementSession {
    /// Build a session for an ability's template.
    ///
    /// Returns `Ok(None)` when there is nothing to place: no shape, a zero
    /// distance, or no active scene.
    pub fn from_data(
        ability: &AbilityTemplateData,
        host: &mut dyn PlacementHost,
        settings: &PlacementSettings,
        i18n: &Localizer,
    ) -> PlacementResult<Option<Self>> {
        let (Some(shape), Some(grid)) = (ability.shape, host.grid()) else {
            return Ok(None);
        };
        let has_token = ability
            .flags
            .token_id
            .is_some_and(|id| host.token(id).is_some());
        let sub_type = ability.flags.placement.as_deref().and_then(PlacementSubType::parse);
        let kind = VariantKind::lookup(shape, sub_type, has_token, grid.kind);
        Self::with_variant(ability, kind.variant(), host, settings, i18n)
    }

    /// Build a session that runs the given variant instead of the looked-up one.
    pub fn with_variant(
        ability: &AbilityTemplateData,
        variant: PlacementVariant,
        host: &mut dyn PlacementHost,
        settings: &PlacementSettings,
        i18n: &Localizer,
    ) -> PlacementResult<Option<Self>> {
        let Some(shape) = ability.shape else {
            return Ok(None);
        };
        if ability.distance == 0.0 {
            return Ok(None);
        }
        let Some(grid) = host.grid().copied() else {
            return Ok(None);
        };

        let token = ability
            .flags
            .token_id
            .and_then(|id| host.token(id))
            .cloned();
        variant.validate(token.is_some())?;

        let mut document = TemplateDocument::new(shape, ability.distance);
        document.width = ability.width;
        if let Some(angle) = ability.angle {
            document.angle = angle;
        }
        document.flags = ability.flags.clone();
        let default_direction = if shape == ShapeKind::Rect {
            DEFAULT_RECT_DIRECTION
        } else {
            0.0
        };
        document.set_direction(ability.direction.unwrap_or(default_direction));
        if shape == ShapeKind::Rect && !grid.kind.is_square() {
            convert_rect_to_ray(&mut document);
        }

        let mut session = Self {
            document,
            variant,
            grid,
            token,
            limits: RangeLimits {
                min: ability.min_range,
                max: ability.max_range,
            },
            settings: settings.clone(),
            i18n: i18n.clone(),
            state: SessionState::Inactive,
            selecting_origin: variant.selects_origin,
            in_range: true,
            is_drag: false,
            is_panning: false,
            last_move: None,
            direction_offset: 0.0,
            icon: None,
            origin_square: None,
            prompt_text: Vec::new(),
            range_text: Vec::new(),
            preview_visible: !variant.selects_origin,
            takeover: None,
            rendezvous: Rc::default(),
        };
        session.initialize(host);
        log::debug!("Created {:?} placement session", session.variant.kind);
        Ok(Some(session))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The document being placed.
    pub fn document(&self) -> &TemplateDocument {
        &self.document
    }

    pub fn variant(&self) -> &PlacementVariant {
        &self.variant
    }

    pub fn is_selecting_origin(&self) -> bool {
        self.selecting_origin
    }

    pub fn is_in_range(&self) -> bool {
        self.in_range
    }

    pub fn direction_offset(&self) -> f64 {
        self.direction_offset
    }

    /// Control icon override.
    pub fn icon(&self) -> Option<Point> {
        self.icon
    }

    /// The square directions are measured from, once known.
    pub fn origin_square(&self) -> Option<GridSquare> {
        self.origin_square
    }

    /// Status lines currently shown next to the control icon.
    pub fn status_text(&self) -> Vec<String> {
        self.prompt_text.iter().chain(&self.range_text).cloned().collect()
    }

    /// Start handling events.
    ///
    /// Activates the template layer, installs the session's listeners and
    /// stubs the layer's own handlers until the session finishes.
    pub fn activate(&mut self, host: &mut dyn PlacementHost) -> PlacementTicket {
        let ticket = PlacementTicket {
            shared: self.rendezvous.clone(),
        };
        if self.state != SessionState::Inactive {
            log::warn!("Placement session is already {:?}", self.state);
            return ticket;
        }

        let initial_layer = host.active_layer();
        host.activate_layer(CanvasLayer::Templates);
        self.takeover = Some(HandlerTakeover::acquire(
            host.template_layer(),
            &ListenerKind::ALL,
            initial_layer,
        ));
        self.state = if self.selecting_origin {
            SessionState::SelectingOrigin
        } else {
            SessionState::Tracking
        };
        self.refresh(host);
        ticket
    }

    /// Route an event from one of the session's listeners.
    pub fn handle_event(&mut self, host: &mut dyn PlacementHost, event: &PlacementEvent) {
        if !self.state.is_live() {
            log::warn!("Ignoring {:?} event, session is {:?}", event.listener(), self.state);
            return;
        }
        match event {
            PlacementEvent::Move(pointer) => self.on_move(host, pointer),
            PlacementEvent::Up { button } => self.on_confirm(host, *button),
            PlacementEvent::ContextMenu => self.on_cancel(host),
            PlacementEvent::Wheel(wheel) => self.on_wheel(host, wheel),
        }
    }

    /// Follow the pointer.
    pub fn on_move(&mut self, host: &mut dyn PlacementHost, event: &PointerMove) {
        if !self.state.is_live() {
            return;
        }

        self.is_drag = event.buttons.left && event.dragging;
        self.is_panning = self.is_panning || (event.buttons.right && event.dragging);

        if self
            .last_move
            .is_some_and(|last| event.timestamp - last <= RENDER_THROTTLE_MS)
        {
            return;
        }

        let snapped = self.grid.snap_point(event.position, self.variant.snap_mode);
        self.preview_visible = !self.selecting_origin;

        match self.variant.placement_type {
            PlacementType::SetXy => self.document.set_origin(snapped),
            PlacementType::SetXyFromToken => {
                let spot = self.token_edge_position(event.position, snapped);
                self.apply_follow_position(&spot, 0.0);
            }
            PlacementType::SetAngle => self.follow_angle(snapped),
        }

        self.evaluate_range_and_targeting(host);
        self.refresh(host);
        self.last_move = Some(event.timestamp);
    }

    /// Rotate or resize with the wheel.
    pub fn on_wheel(&mut self, host: &mut dyn PlacementHost, wheel: &WheelInput) {
        if !self.state.is_live() {
            return;
        }

        match self.variant.rotation {
            RotationType::None => return,
            RotationType::System => {
                system_rotation(&mut self.document, wheel, &self.grid, self.settings.measure_style)
            }
            RotationType::Advanced => {
                let snap = self.settings.cone_rotation;
                if !advanced_rotation(&mut self.document, wheel, snap, &mut self.direction_offset) {
                    return;
                }
            }
        }
        self.refresh(host);
    }

    /// Confirm on left button release.
    pub fn on_confirm(&mut self, host: &mut dyn PlacementHost, button: MouseButton) {
        if !self.state.is_live() || button != MouseButton::Left {
            return;
        }

        if self.is_drag {
            self.is_drag = false;
            return;
        }

        if !self.in_range && !self.document.flags.ignore_range {
            host.notify_error(&self.i18n.localize("errors.outOfRange"));
            self.finish(host, Err(PlacementError::OutOfRange));
            return;
        }

        if self.selecting_origin {
            self.lock_origin(host);
            return;
        }

        log::debug!("Placing {:?} template", self.variant.kind);

        if self.document.is_empty() {
            self.finish(host, Err(PlacementError::ZeroSize));
            return;
        }

        let context = FinalizeContext {
            grid: &self.grid,
            token: self.token.as_ref(),
        };
        if !self.variant.finalize(&mut self.document, &context) {
            self.finish(host, Err(PlacementError::FinalizeRejected));
            return;
        }

        self.target_if_enabled(host, true);
        let result = TemplateResult {
            document: self.document.clone(),
            round_time: self.settings.round_time,
        };
        self.finish(host, Ok(result));
    }

    /// Cancel on right click.
    ///
    /// Ends a pan instead when one is in progress, and goes back to origin
    /// selection when an origin has already been locked.
    pub fn on_cancel(&mut self, host: &mut dyn PlacementHost) {
        if !self.state.is_live() {
            return;
        }

        if self.is_panning {
            self.is_panning = false;
            return;
        }

        if self.variant.angle_origin == AngleOrigin::Current && !self.selecting_origin {
            self.icon = None;
            self.clear_targets_if_enabled(host);
            self.selecting_origin = true;
            self.state = SessionState::SelectingOrigin;
            self.origin_square = None;
            self.initialize(host);
            self.preview_visible = false;
            self.refresh(host);
            return;
        }

        log::debug!("Cancelling {:?} template placement", self.variant.kind);
        self.finish(host, Err(PlacementError::Cancelled));
    }

    /// Tear the session down and reject it, if it hasn't finished yet.
    pub fn force_finish(&mut self, host: &mut dyn PlacementHost) {
        self.finish(host, Err(PlacementError::Cancelled));
    }

    /// Position the document from the pointer (and the bound token, if any).
    fn initialize(&mut self, host: &mut dyn PlacementHost) {
        let pointer = host.pointer_position();
        let mut position = self.grid.snap_point(pointer, self.variant.snap_mode);
        let mut direction = self.document.direction;
        self.direction_offset = 0.0;

        if self.variant.angle_origin == AngleOrigin::Token {
            if let Some(token) = &self.token {
                let square = GridSquare::from_token(&self.grid, token);
                let spot = square.follow_position_for_coords(self.variant.angle_points, pointer);
                position = spot.origin();
                direction = spot.direction;
                if spot.icon.is_some() {
                    self.icon = spot.icon;
                }
                self.origin_square = Some(square);
            }
        }

        self.document.set_origin(position);
        self.document.set_direction(direction);

        if self.selecting_origin {
            let title = self.i18n.localize(self.document.shape.label_key());
            host.show_hint(&title, &self.i18n.localize("hints.chooseStart"));
            self.prompt_text = vec![self.i18n.localize(self.variant.select_origin_text)];
        }
    }

    fn apply_follow_position(&mut self, spot: &FollowPosition, offset: f64) {
        self.document.set_origin(spot.origin());
        self.document.set_direction(spot.direction + offset);
        if spot.icon.is_some() {
            self.icon = spot.icon;
        }
    }

    /// Where a token-anchored template sits for the current pointer.
    fn token_edge_position(&self, pointer: Point, snapped: Point) -> FollowPosition {
        let Some(token) = &self.token else {
            return FollowPosition {
                x: pointer.x,
                y: pointer.y,
                direction: 0.0,
                icon: None,
            };
        };

        if self.grid.kind.is_square() {
            let square = self
                .origin_square
                .unwrap_or_else(|| GridSquare::from_token(&self.grid, token));
            return square.follow_position_for_coords(self.variant.angle_points, snapped);
        }

        // Project onto the ellipse inscribed in the token's footprint.
        let center = token.center(&self.grid);
        let direction = angle_between(center, pointer);
        let radians = direction.to_radians();
        FollowPosition {
            x: radians.cos() * token.pixel_width(&self.grid) / 2.0 + center.x,
            y: radians.sin() * token.pixel_height(&self.grid) / 2.0 + center.y,
            direction,
            icon: None,
        }
    }

    fn follow_angle(&mut self, point: Point) {
        if self.selecting_origin {
            self.document.set_origin(point);
            return;
        }
        if self.variant.angle_origin == AngleOrigin::None {
            return;
        }
        // Hex and gridless scenes keep the locked position and direction.
        if !self.grid.kind.is_square() {
            return;
        }
        let Some(square) = self.origin_square else {
            return;
        };
        let spot = square.follow_position_for_coords(self.variant.angle_points, point);
        self.apply_follow_position(&spot, self.direction_offset);
    }

    /// The square an angle-following template pivots around.
    ///
    /// # Panics
    ///
    /// Panics for variants without an angle origin, and for token origins
    /// without a token. [`PlacementVariant::validate`] rules both out.
    fn starting_square(&self) -> GridSquare {
        match self.variant.angle_origin {
            AngleOrigin::Current => {
                let origin = self.document.origin();
                if self.grid.is_grid_point(origin) {
                    GridSquare::from_grid_point(&self.grid, origin)
                } else {
                    GridSquare::from_grid_square(&self.grid, origin)
                }
            }
            AngleOrigin::Token => match &self.token {
                Some(token) => GridSquare::from_token(&self.grid, token),
                None => unreachable!("token angle origin without a bound token"),
            },
            AngleOrigin::None => unreachable!("starting square requested without an angle origin"),
        }
    }

    fn lock_origin(&mut self, host: &mut dyn PlacementHost) {
        self.origin_square = Some(self.starting_square());
        self.selecting_origin = false;
        self.state = SessionState::Tracking;
        self.prompt_text.clear();
        log::debug!("Locked template origin at {:?}", self.document.origin());
        self.evaluate_range_and_targeting(host);
        self.refresh(host);
    }

    fn evaluate_range_and_targeting(&mut self, host: &mut dyn PlacementHost) {
        self.in_range = true;

        let checks_range = self.variant.placement_type == PlacementType::SetXy
            && self.limits.is_constrained()
            && !self.document.flags.ignore_range;
        if checks_range {
            if let Some(token) = &self.token {
                let report = evaluate_range(
                    &self.grid,
                    token,
                    self.document.origin(),
                    self.limits,
                    self.selecting_origin,
                    self.settings.units,
                    &self.i18n,
                );
                self.in_range = report.status.is_in_range();
                self.range_text = report.text;
            }
        }

        self.preview_visible = self.in_range && !self.selecting_origin;

        if self.in_range {
            self.target_if_enabled(host, false);
        } else {
            self.clear_targets_if_enabled(host);
        }
    }

    /// Target the tokens under the template.
    ///
    /// Lines on non-square grids are only targeted when forced.
    fn target_if_enabled(&self, host: &mut dyn PlacementHost, force: bool) {
        if self.selecting_origin || !self.settings.auto_target {
            return;
        }
        if !force && !self.grid.kind.is_square() && self.document.shape == ShapeKind::Ray {
            return;
        }

        let region = HighlightRegion::new(&self.document, &self.grid);
        let ids = tokens_in_region(host.tokens(), &self.grid, &region);
        host.update_targets(&ids);
    }

    fn clear_targets_if_enabled(&self, host: &mut dyn PlacementHost) {
        if self.settings.auto_target {
            host.update_targets(&[]);
        }
    }

    fn refresh(&self, host: &mut dyn PlacementHost) {
        let status_text = self.status_text();
        let highlighted_cells = if self.preview_visible {
            HighlightRegion::new(&self.document, &self.grid).cells()
        } else {
            Vec::new()
        };
        host.refresh_preview(&PreviewFrame {
            document: &self.document,
            preview_visible: self.preview_visible,
            error_icon_visible: !self.in_range,
            icon: self.icon,
            status_text: &status_text,
            highlighted_cells: &highlighted_cells,
        });
    }

    /// Tear down and settle. Runs at most once.
    fn finish(&mut self, host: &mut dyn PlacementHost, outcome: PlacementResult<TemplateResult>) {
        if self.state.is_finished() {
            return;
        }

        host.cancel_preview();
        let restore_layer = self.takeover.take().map(|mut takeover| {
            takeover.release();
            takeover.restore_layer()
        });
        host.close_hint();
        if let Some(layer) = restore_layer {
            host.activate_layer(layer);
        }

        let outcome = match outcome {
            Ok(result) => {
                self.state = SessionState::Confirmed;
                Ok(result)
            }
            Err(reason) => {
                log::debug!("Template placement rejected: {}", reason);
                self.state = SessionState::Cancelled;
                Err(Cancelled)
            }
        };
        self.rendezvous.borrow_mut().settle(outcome);
    }
}

impl Drop for PlacementSession {
    fn drop(&mut self) {
        if self.state.is_finished() {
            return;
        }
        if self.state.is_live() {
            log::warn!("Placement session dropped before finishing, cancelling");
        }
        // The guard restores the handlers and leaves the rest for the host.
        self.takeover = None;
        self.state = SessionState::Cancelled;
        self.rendezvous.borrow_mut().settle(Err(Cancelled));
    }
}
