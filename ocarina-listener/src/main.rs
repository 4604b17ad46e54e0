//! # Ocarina Listener
//!
//! Listens to the microphone for songs played on the instrument and
//! announces each recognised song to the configured sinks.
//!
//! ## Architecture
//! - **Audio driver thread**: CPAL callback cutting the input into frames
//! - **Main thread**: the listener loop (estimate, classify, match, dispatch)
//! - **Chime threads**: one short-lived thread per confirmation sound

mod chime;
mod config;
mod osc;
mod webhook;

use anyhow::{Context, Result};
use chime::ChimeFeedback;
use clap::{Parser, crate_version};
use config::{CONFIG_ENV, DeploymentConfig};
use ocarina_core::{CpalSource, Dispatcher, Feedback, Listener, SilentFeedback};
use osc::OscNotifier;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use webhook::WebhookNotifier;

#[derive(Parser, Debug)]
#[clap(
    version = crate_version!(),
    about = "Listens for ocarina songs and announces them."
)]
struct Args {
    /// Path to the JSON configuration file. Built-in defaults are used when absent.
    #[arg(env = CONFIG_ENV)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = DeploymentConfig::resolve(args.config.as_deref())?;
    let dispatcher = build_dispatcher(&config)?;

    // The only fatal failure: without a microphone there is nothing to do.
    let mut source = CpalSource::open(config.listener.sample_rate, config.listener.frame_size)
        .context("opening audio input")?;

    let mut listener = Listener::new(&config.listener);
    listener.run(&mut source, &dispatcher)?;
    Ok(())
}

/// Wires the notifier sinks and the confirmation sound from `config`.
fn build_dispatcher(config: &DeploymentConfig) -> Result<Dispatcher> {
    let feedback: Box<dyn Feedback> = if !config.feedback.enabled {
        Box::new(SilentFeedback)
    } else if let Some(path) = &config.feedback.sound {
        Box::new(ChimeFeedback::from_wav(path, config.feedback.volume)?)
    } else {
        Box::new(ChimeFeedback::synthesized(config.feedback.volume))
    };

    let mut dispatcher = Dispatcher::new(feedback);

    if config.osc.enabled {
        let notifier = OscNotifier::new(&config.osc.target, &config.osc.address)
            .with_context(|| format!("resolving OSC target {}", config.osc.target))?;
        info!(osc_target = %config.osc.target, address = %config.osc.address, "OSC notifier ready");
        dispatcher = dispatcher.with_notifier(Box::new(notifier));
    } else {
        warn!("OSC notifier disabled; songs will only be logged");
    }

    for hook in &config.webhooks {
        let notifier = WebhookNotifier::new(&hook.url, Duration::from_secs(hook.timeout_secs))?;
        info!(song_id = hook.song_id, "webhook registered");
        dispatcher = dispatcher.with_song_sink(hook.song_id, Box::new(notifier));
    }

    Ok(dispatcher)
}
