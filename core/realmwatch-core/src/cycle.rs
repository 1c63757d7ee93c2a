//! One evaluation cycle: fetch → extract → normalize → read prior →
//! evaluate → conditional persist → best-effort notify.
//!
//! Re-entrant by construction: a second run over the same page observes
//! `new_seen <= last_seen` and lands in the quiet branches, never
//! re-escalating.

use chrono::Utc;
use tracing::{info, warn};

use crate::config::WatchConfig;
use crate::error::Result;
use crate::evaluate::evaluate;
use crate::extract;
use crate::fetch::PageFetcher;
use crate::notify::Notifier;
use crate::store::StateStore;
use crate::timestamp;

/// Terminal status of one cycle, for the caller's logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The page yielded no usable observation (hidden or unparseable field);
    /// nothing was evaluated or persisted.
    NoObservation,
    /// Evaluation produced the same state that was already stored.
    Unchanged,
    /// A new record was persisted.
    Updated { notified: bool },
}

pub fn run_cycle(
    config: &WatchConfig,
    fetcher: &dyn PageFetcher,
    store: &dyn StateStore,
    notifier: &dyn Notifier,
) -> Result<CycleOutcome> {
    let html = fetcher.fetch(&config.profile_url)?;

    let raw = match extract::last_seen_field(&html) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %err, subject = %config.subject, "No last-seen field this cycle");
            return Ok(CycleOutcome::NoObservation);
        }
    };

    let new_seen = match timestamp::normalize(&raw) {
        Ok(instant) => instant,
        Err(err) => {
            warn!(error = %err, raw = %raw, subject = %config.subject, "Unusable last-seen value this cycle");
            return Ok(CycleOutcome::NoObservation);
        }
    };

    // Read failure falls open to "no prior record"; the conditional put
    // below still keeps two racing cycles from corrupting counters.
    let prior = match store.get(&config.subject) {
        Ok(prior) => prior,
        Err(err) => {
            warn!(error = %err, subject = %config.subject, "State read failed; treating subject as new");
            None
        }
    };

    let evaluation = evaluate(&config.subject, new_seen, prior.as_ref());

    if prior
        .as_ref()
        .is_some_and(|prior| prior.same_state(&evaluation.next))
    {
        return Ok(CycleOutcome::Unchanged);
    }

    let mut next = evaluation.next;
    next.updated_at = Some(Utc::now());
    store.put(prior.as_ref(), &next)?;

    let notified = match evaluation.notify {
        Some(level) => match notifier.notify(level, &config.subject, new_seen) {
            Ok(()) => {
                info!(level = level.get(), subject = %config.subject, "Notification sent");
                true
            }
            Err(err) => {
                warn!(error = %err, level = level.get(), subject = %config.subject, "Notification delivery failed");
                false
            }
        },
        None => false,
    };

    Ok(CycleOutcome::Updated { notified })
}
