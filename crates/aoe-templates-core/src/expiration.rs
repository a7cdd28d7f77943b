//! When placed templates expire.

use crate::template::TemplateFlags;
use serde::{Deserialize, Serialize};

/// Initiative used to order end-of-turn expirations when nobody is acting.
pub const END_OF_TURN_INITIATIVE: f64 = 99.0;

/// Initiative used to order timespan expirations when nobody is acting.
pub const TIMESPAN_INITIATIVE: f64 = 0.0;

/// Default length of a combat round in seconds.
pub const DEFAULT_ROUND_TIME: f64 = 6.0;

/// When a placed template should be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeletionPolicy {
    #[default]
    DoNotDelete,
    EndOfTurn,
    Timespan,
}

/// Unit of a timespan deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeletionInterval {
    #[default]
    Rounds,
    Minutes,
    Hours,
}

impl DeletionInterval {
    /// Seconds in one interval.
    pub fn seconds(self, round_time: f64) -> f64 {
        match self {
            DeletionInterval::Rounds => round_time,
            DeletionInterval::Minutes => 60.0,
            DeletionInterval::Hours => 3600.0,
        }
    }
}

/// World time (and initiative tie-break) at which a template expires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Expiration {
    pub at: f64,
    pub initiative: f64,
}

/// Read the deletion unit flag. Numbers and numeric strings count, anything else is zero.
fn deletion_units(flags: &TemplateFlags) -> f64 {
    match &flags.deletion_unit {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Compute when a template with the given flags expires.
///
/// A current initiative of zero is treated like no combatant, so it falls
/// back to the per-policy default.
pub fn compute_expiration(
    flags: &TemplateFlags,
    now: f64,
    current_initiative: Option<f64>,
    round_time: f64,
) -> Option<Expiration> {
    let initiative_or = |fallback: f64| {
        current_initiative
            .filter(|i| *i != 0.0 && !i.is_nan())
            .unwrap_or(fallback)
    };

    match flags.deletion.unwrap_or_default() {
        DeletionPolicy::DoNotDelete => None,
        DeletionPolicy::EndOfTurn => Some(Expiration {
            at: now,
            initiative: initiative_or(END_OF_TURN_INITIATIVE),
        }),
        DeletionPolicy::Timespan => {
            let interval = flags.deletion_interval.unwrap_or_default();
            let duration = deletion_units(flags) * interval.seconds(round_time);
            Some(Expiration {
                at: now + duration,
                initiative: initiative_or(TIMESPAN_INITIATIVE),
            })
        }
    }
}
