//! Session manager for mounted scrub sessions

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard, RwLock};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::autoplay::spawn_autoplay;
use super::replay_session::{FetchTicket, Frame, ReplaySession};
use crate::error::{TimelineError, TimelineResult};
use crate::event_store::EventStore;
use crate::scrub::ScrubConfig;
use crate::types::ReplayWindow;

/// Frames buffered per session; slow SSE clients beyond this are told they lagged
const FRAME_CHANNEL_CAPACITY: usize = 256;

/// Default autoplay period
pub const AUTOPLAY_PERIOD: Duration = Duration::from_millis(100);

/// Tuning shared by every session
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub scrub: ScrubConfig,
    pub autoplay_period: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scrub: ScrubConfig::default(),
            autoplay_period: AUTOPLAY_PERIOD,
        }
    }
}

/// A session plus its frame channel and autoplay task
pub struct SessionSlot {
    id: String,
    session: Mutex<ReplaySession>,
    frames: broadcast::Sender<Frame>,
    autoplay: Mutex<Option<JoinHandle<()>>>,
}

impl SessionSlot {
    fn new(session: ReplaySession) -> Self {
        let (frames, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        Self {
            id: session.id().to_string(),
            session: Mutex::new(session),
            frames,
            autoplay: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lock(&self) -> MutexGuard<'_, ReplaySession> {
        self.session.lock()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.frames.subscribe()
    }

    /// Send a frame to subscribers
    ///
    /// Callers hold the session lock so frames go out in transition order.
    pub(crate) fn publish(&self, frame: Frame) {
        // no subscribers is fine
        let _ = self.frames.send(frame);
    }

    fn stop_autoplay(&self) {
        if let Some(handle) = self.autoplay.lock().take() {
            handle.abort();
        }
    }
}

/// Registry of mounted sessions
pub struct SessionManager {
    store: Arc<EventStore>,
    sessions: RwLock<HashMap<String, Arc<SessionSlot>>>,
    config: SessionConfig,
    counter: AtomicU64,
}

impl SessionManager {
    pub fn new(store: Arc<EventStore>, config: SessionConfig) -> Self {
        Self {
            store,
            sessions: RwLock::new(HashMap::new()),
            config,
            counter: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Generate a new session ID
    fn generate_session_id(&self) -> String {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let seq = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("sess_{:x}{:04x}", nanos, seq)
    }

    /// Get active session count
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn get(&self, session_id: &str) -> TimelineResult<Arc<SessionSlot>> {
        self.sessions
            .read()
            .get(session_id)
            .cloned()
            .ok_or_else(|| TimelineError::SessionNotFound(session_id.to_string()))
    }

    /// Mount a session and load its first window
    pub async fn create(
        &self,
        workspace_id: &str,
        end_timestamp: i64,
        marker_timestamps: Vec<i64>,
    ) -> TimelineResult<Frame> {
        let id = self.generate_session_id();
        let session = ReplaySession::new(&id, workspace_id, end_timestamp, self.config.scrub)
            .with_marker_timestamps(marker_timestamps);
        let ticket = session.begin_fetch()?;

        let slot = Arc::new(SessionSlot::new(session));
        self.sessions.write().insert(id.clone(), Arc::clone(&slot));
        info!(session = %id, workspace = workspace_id, end_timestamp, "session mounted");

        self.load(&slot, ticket).await
    }

    /// Unmount a session; its stream ends and pending work is discarded
    pub fn close(&self, session_id: &str) -> TimelineResult<()> {
        let slot = self
            .sessions
            .write()
            .remove(session_id)
            .ok_or_else(|| TimelineError::SessionNotFound(session_id.to_string()))?;

        slot.stop_autoplay();
        slot.lock().close();
        info!(session = session_id, "session unmounted");
        Ok(())
    }

    pub fn frame(&self, session_id: &str) -> TimelineResult<Frame> {
        Ok(self.get(session_id)?.lock().frame())
    }

    async fn fetch_window(&self, ticket: &FetchTicket) -> TimelineResult<ReplayWindow> {
        let store = Arc::clone(&self.store);
        let workspace_id = ticket.workspace_id.clone();
        let end_timestamp = ticket.end_timestamp;

        tokio::task::spawn_blocking(move || store.fetch_full_window(&workspace_id, end_timestamp))
            .await
            .map_err(|e| TimelineError::Internal(format!("window fetch task failed: {}", e)))?
    }

    /// Fetch for `ticket` and install the result unless it went stale
    async fn load(&self, slot: &SessionSlot, ticket: FetchTicket) -> TimelineResult<Frame> {
        let window = self.fetch_window(&ticket).await?;

        let mut session = slot.lock();
        match session.complete_fetch(&ticket, window) {
            Ok(()) => {}
            Err(TimelineError::StaleFetch { ticket, current }) => {
                debug!(session = slot.id(), ticket, current, "discarding stale window");
            }
            Err(e) => return Err(e),
        }
        let frame = session.frame();
        slot.publish(frame.clone());
        Ok(frame)
    }

    fn transition(
        &self,
        session_id: &str,
        step: impl FnOnce(&mut ReplaySession) -> TimelineResult<Frame>,
    ) -> TimelineResult<Frame> {
        let slot = self.get(session_id)?;
        let mut session = slot.lock();
        let frame = step(&mut *session)?;
        slot.publish(frame.clone());
        Ok(frame)
    }

    pub fn drag_start(&self, session_id: &str, value: f64) -> TimelineResult<Frame> {
        self.transition(session_id, |s| s.drag_start(value))
    }

    pub fn drag_move(&self, session_id: &str, value: f64) -> TimelineResult<Frame> {
        self.transition(session_id, |s| s.drag_move(value))
    }

    pub fn drag_end(&self, session_id: &str, value: f64) -> TimelineResult<Frame> {
        self.transition(session_id, |s| s.drag_end(value))
    }

    pub fn seek(&self, session_id: &str, value: f64) -> TimelineResult<Frame> {
        self.transition(session_id, |s| s.seek(value))
    }

    /// Turn autoplay on or off, starting the tick task when needed
    pub fn set_autoplay(&self, session_id: &str, enabled: bool) -> TimelineResult<Frame> {
        let slot = self.get(session_id)?;
        let mut session = slot.lock();
        let frame = session.set_autoplay(enabled)?;

        if frame.state.autoplay {
            let mut handle = slot.autoplay.lock();
            if handle.as_ref().map_or(true, JoinHandle::is_finished) {
                *handle = Some(spawn_autoplay(Arc::clone(&slot), self.config.autoplay_period));
                debug!(session = session_id, "autoplay started");
            }
        } else {
            slot.stop_autoplay();
        }

        slot.publish(frame.clone());
        Ok(frame)
    }

    /// Move the window end and refetch
    pub async fn set_end_timestamp(&self, session_id: &str, end_timestamp: i64) -> TimelineResult<Frame> {
        let slot = self.get(session_id)?;
        let ticket = slot.lock().set_end_timestamp(end_timestamp)?;
        self.load(&slot, ticket).await
    }

    /// Switch the designated file, refetching if no window is loaded
    pub async fn set_file(&self, session_id: &str, file_path: &str) -> TimelineResult<Frame> {
        let slot = self.get(session_id)?;
        let refetch = slot.lock().set_file(file_path)?;

        match refetch {
            Some(ticket) => self.load(&slot, ticket).await,
            None => {
                let session = slot.lock();
                let frame = session.frame();
                slot.publish(frame.clone());
                Ok(frame)
            }
        }
    }
}
