//! Autoplay driver

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use super::manager::SessionSlot;

/// Tick the session every `period` until autoplay ends or the session closes
pub(crate) fn spawn_autoplay(slot: Arc<SessionSlot>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let mut session = slot.lock();
            if session.is_closed() || !session.is_autoplaying() {
                break;
            }
            let Ok(frame) = session.tick() else {
                break;
            };

            let finished = !frame.state.autoplay;
            slot.publish(frame);
            drop(session);
            if finished {
                break;
            }
        }

        debug!(session = slot.id(), "autoplay stopped");
    })
}
