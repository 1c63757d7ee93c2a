//! Outbound webhook notifications.
//!
//! Message text is selected purely by level; the evaluator never sees it.
//! Delivery is best-effort: the cycle driver logs failures and moves on.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::error::{Result, WatchError};
use crate::evaluate::NotificationLevel;

/// Outer bound on one webhook delivery.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Notification collaborator contract.
pub trait Notifier {
    fn notify(
        &self,
        level: NotificationLevel,
        subject_id: &str,
        last_seen: DateTime<Utc>,
    ) -> Result<()>;
}

/// One fixed template per level 0..=MAX_STRIKE. Level 0 is the friendly
/// recovered message.
fn template(level: NotificationLevel) -> &'static str {
    match level.get() {
        0 => "{subject} has gone quiet again. Standing down.",
        1 => "{subject} was seen online — last seen {when}.",
        2 => "{subject} is back already — second sighting, last seen {when}.",
        3 => "Third sighting of {subject} in a row — last seen {when}.",
        4 => "{subject} keeps at it — fourth consecutive sighting, last seen {when}.",
        _ => "{subject} reached the sighting cap — last seen {when}. Staying quiet until the trail cools.",
    }
}

/// Renders the outgoing message for a level, prefixing escalation contacts
/// when configured.
pub fn render_message(
    level: NotificationLevel,
    subject_id: &str,
    last_seen: DateTime<Utc>,
    contacts: &[String],
) -> String {
    let text = template(level)
        .replace("{subject}", subject_id)
        .replace(
            "{when}",
            &last_seen.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
    if contacts.is_empty() {
        text
    } else {
        format!("{} {}", contacts.join(" "), text)
    }
}

#[derive(Serialize)]
struct WebhookBody<'a> {
    content: &'a str,
    allowed_mentions: AllowedMentions,
}

#[derive(Serialize)]
struct AllowedMentions {
    parse: Vec<&'static str>,
}

/// [`Notifier`] that POSTs a Discord-style JSON payload to a webhook URL.
pub struct WebhookNotifier {
    client: reqwest::blocking::Client,
    url: String,
    contacts: Vec<String>,
}

impl WebhookNotifier {
    pub fn new(url: String, contacts: Vec<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .build()
            .map_err(|source| WatchError::Client { source })?;
        Ok(Self {
            client,
            url,
            contacts,
        })
    }
}

impl Notifier for WebhookNotifier {
    fn notify(
        &self,
        level: NotificationLevel,
        subject_id: &str,
        last_seen: DateTime<Utc>,
    ) -> Result<()> {
        let content = render_message(level, subject_id, last_seen, &self.contacts);
        let body = WebhookBody {
            content: &content,
            allowed_mentions: AllowedMentions {
                parse: vec!["users"],
            },
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .map_err(|source| WatchError::Notify { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WatchError::NotifyStatus {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
