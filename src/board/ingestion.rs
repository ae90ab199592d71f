//! Mutation-event ingestion - async channel consumer for cache invalidation
//!
//! External transactional collaborators (vote verification, shipment
//! creation) and administrative collaborators (settings updates) send
//! [`MutationEvent`]s over an mpsc channel; each maps onto a cache
//! invalidation. This decouples the engine from any persistence-layer
//! lifecycle hook: whichever collaborator owns a mutation explicitly
//! reports it.
//!
//! Invalidation bursts are cheap here (the cache coalesces them), so the
//! consumer never batches or debounces; it just drains the channel.

use super::engine::StandingsEngine;
use super::types::ContestId;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Mutation reported by an external collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationEvent {
    /// A vote was verified or a shipment recorded for this contest
    Activity(ContestId),
    /// Contest weights or eligibility settings changed
    Settings(ContestId),
}

/// Consume mutation events until the channel closes
///
/// Runs indefinitely on its own task; logs throughput every 10 seconds.
pub async fn start_event_ingestion(
    mut rx: mpsc::Receiver<MutationEvent>,
    engine: Arc<StandingsEngine>,
) {
    log::info!("🚀 Starting mutation-event ingestion");

    let mut event_count = 0u64;
    let mut last_log_time = std::time::Instant::now();

    while let Some(event) = rx.recv().await {
        match event {
            MutationEvent::Activity(contest_id) => engine.clone().on_activity_mutation(contest_id),
            MutationEvent::Settings(contest_id) => {
                engine.clone().on_contest_settings_changed(contest_id)
            }
        }

        event_count += 1;

        if last_log_time.elapsed().as_secs() >= 10 {
            let events_per_sec = event_count as f64 / last_log_time.elapsed().as_secs_f64();
            log::info!(
                "📊 Mutation rate: {:.1} events/sec (total: {})",
                events_per_sec,
                event_count
            );
            last_log_time = std::time::Instant::now();
            event_count = 0;
        }
    }

    log::info!("✅ Mutation-event ingestion stopped (channel closed)");
}
