//! The activity state machine.
//!
//! Pure function from (new observation, prior record) to (next record,
//! notification decision). No clock, no I/O; the cycle driver stamps
//! `updated_at` and owns persistence.

use chrono::{DateTime, Utc};

use crate::record::{ActivityRecord, COOLDOWN_LIMIT, MAX_STRIKE};

/// Severity handed to the notifier. Fired levels are strike values in
/// `1..=MAX_STRIKE`; `RECOVERED` exists so the notifier's template table is
/// total, but `evaluate` never emits it (rehabilitation is silent).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationLevel(u8);

impl NotificationLevel {
    pub const RECOVERED: NotificationLevel = NotificationLevel(0);

    pub fn from_strike(strike: u8) -> Option<Self> {
        (1..=MAX_STRIKE).contains(&strike).then_some(Self(strike))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Result of one evaluation: the record to persist and whether to notify.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub next: ActivityRecord,
    pub notify: Option<NotificationLevel>,
}

/// Decides how the strike/cooldown ladder evolves for one observation.
///
/// A notification fires only when the strike value actually changed due to
/// fresh activity; at the cap, repeated activity stays quiet.
pub fn evaluate(
    subject_id: &str,
    new_seen: DateTime<Utc>,
    prior: Option<&ActivityRecord>,
) -> Evaluation {
    let Some((prior_rec, prior_seen)) = prior.and_then(sane) else {
        // First observation, or stored state we no longer trust: establish a
        // baseline and stay quiet.
        return Evaluation {
            next: ActivityRecord::baseline(subject_id, new_seen),
            notify: None,
        };
    };

    if new_seen > prior_seen {
        // Fresh activity: climb the ladder, restart the cooldown.
        let strike = (prior_rec.strike + 1).min(MAX_STRIKE);
        let notify = (strike != prior_rec.strike)
            .then(|| NotificationLevel::from_strike(strike))
            .flatten();
        return Evaluation {
            next: ActivityRecord {
                last_seen: Some(new_seen),
                strike,
                cooldown: 0,
                ..prior_rec.clone()
            },
            notify,
        };
    }

    if prior_rec.strike > 0 {
        // Quiet cycle under an outstanding strike: tick the cooldown,
        // rehabilitate silently once it fills.
        let cooldown = prior_rec.cooldown + 1;
        let next = if cooldown >= COOLDOWN_LIMIT {
            ActivityRecord {
                strike: 0,
                cooldown: 0,
                ..prior_rec.clone()
            }
        } else {
            ActivityRecord {
                cooldown,
                ..prior_rec.clone()
            }
        };
        return Evaluation { next, notify: None };
    }

    // Steady, clean state.
    Evaluation {
        next: prior_rec.clone(),
        notify: None,
    }
}

/// Prior state is only trusted when its invariants hold; a malformed record
/// is treated as absent so the cycle re-baselines instead of carrying bad
/// counters forward.
fn sane(prior: &ActivityRecord) -> Option<(&ActivityRecord, DateTime<Utc>)> {
    let prior_seen = prior.last_seen?;
    if prior.strike > MAX_STRIKE || prior.cooldown >= COOLDOWN_LIMIT {
        return None;
    }
    Some((prior, prior_seen))
}
