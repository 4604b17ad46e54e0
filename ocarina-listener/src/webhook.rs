//! # Webhook Module
//!
//! Calls an HTTP endpoint for one particular song.

use ocarina_core::{DeliveryError, Notifier, SongEvent};
use std::time::Duration;

/// Calls an HTTP endpoint with a POST when a song is played.
///
/// Blocks the listener for the duration of the request; capture keeps
/// running and stale frames are dropped meanwhile.
pub struct WebhookNotifier {
    client: reqwest::blocking::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    fn publish(&self, _event: &SongEvent) -> Result<(), DeliveryError> {
        self.client.post(&self.url).send()?.error_for_status()?;
        Ok(())
    }
}
