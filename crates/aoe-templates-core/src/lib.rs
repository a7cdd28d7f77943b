//! AoE Templates Core Library
//!
//! Grid geometry and the interactive placement state machine for
//! area-of-effect templates on a tabletop canvas.

pub mod error;
pub mod expiration;
pub mod grid;
pub mod host;
pub mod i18n;
pub mod input;
pub mod range;
pub mod rotation;
pub mod session;
pub mod settings;
pub mod square;
pub mod takeover;
pub mod targeting;
pub mod template;
pub mod token;
pub mod variant;

pub use error::{Cancelled, PlacementError, PlacementResult};
pub use expiration::{DeletionInterval, DeletionPolicy, Expiration, compute_expiration};
pub use grid::{DiagonalRule, Grid, GridKind, SnapMode};
pub use host::{CanvasLayer, MemoryCanvas, PlacementHost, PreviewFrame, Scene};
pub use i18n::Localizer;
pub use input::{HeldButtons, ListenerKind, Modifiers, MouseButton, PlacementEvent, PointerMove, WheelInput};
pub use range::{RangeLimits, RangeReport, RangeStatus, evaluate_range};
pub use session::{AbilityTemplateData, PlacementSession, PlacementTicket, SessionState, TemplateResult, RENDER_THROTTLE_MS};
pub use settings::{PlacementSettings, Units};
pub use square::{AnglePoints, FollowPosition, GridSquare};
pub use takeover::{DeferredTeardown, HandlerSlot, HandlerTakeover, InteractionLayer, SharedLayer};
pub use targeting::{HighlightRegion, tokens_in_region};
pub use template::{ShapeKind, TemplateDocument, TemplateFlags, TemplateId};
pub use token::{SizeCategory, Token, TokenId};
pub use variant::{AngleOrigin, PlacementSubType, PlacementType, PlacementVariant, RotationType, VariantKind};
