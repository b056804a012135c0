//! services/app/src/session/reader_task.rs
//!
//! This module contains the asynchronous "worker" tasks behind the reader:
//! the periodic auto-advance timer and the one-shot end-actions dwell timer.
//! Both are designed to be gracefully cancelled via a `CancellationToken`;
//! the session cancels them whenever the story they drive is replaced.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::session::events::SessionEvent;
use crate::session::state::SessionState;

/// Advances the reader one page per period.
///
/// When the cursor can no longer advance, auto-advance switches itself off,
/// the end-of-story signal fires exactly once, and the task ends.
pub async fn auto_advance_process(
    session_state_lock: Arc<Mutex<SessionState>>,
    period: Duration,
    cancellation_token: CancellationToken,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    info!("Auto-advance started.");
    let start = tokio::time::Instant::now() + period;
    let mut ticker = tokio::time::interval_at(start, period);

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Auto-advance cancelled.");
                return;
            }
            _ = ticker.tick() => {
                let mut session = session_state_lock.lock().await;
                let Some(reader) = session.reader.as_mut() else {
                    return;
                };
                if !reader.next() {
                    reader.set_auto_advancing(false);
                    let story_id = reader.story_id().to_string();
                    let _ = events.send(SessionEvent::EndOfStory { story_id });
                    info!("End of story reached; auto-advance stopped.");
                    return;
                }
            }
        }
    }
}

/// Waits out the dwell period on a manually reached last page, then reveals
/// the end-of-story actions.
///
/// The page may have changed while the timer was pending, so the conditions
/// are re-checked before the signal fires.
pub async fn end_actions_dwell(
    session_state_lock: Arc<Mutex<SessionState>>,
    dwell: Duration,
    cancellation_token: CancellationToken,
    events: mpsc::UnboundedSender<SessionEvent>,
) {
    tokio::select! {
        _ = cancellation_token.cancelled() => {}
        _ = tokio::time::sleep(dwell) => {
            let session = session_state_lock.lock().await;
            if let Some(reader) = session.reader.as_ref() {
                if reader.is_last_page() && !reader.auto_advancing() {
                    let _ = events.send(SessionEvent::EndActionsRevealed {
                        story_id: reader.story_id().to_string(),
                    });
                }
            }
        }
    }
}
