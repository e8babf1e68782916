use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use futures::future::{AbortHandle, abortable};
use futures::task::{Spawn, SpawnExt};
use futures_timer::Delay;

/// How long a banner stays up before it clears itself.
pub const NOTIFICATION_DISPLAY_MS: u64 = 5_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NotificationId(pub u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
}

#[derive(Default)]
struct NotificationState {
    next_id: u64,
    current: Option<Notification>,
    auto_clear: Option<AbortHandle>,
}

/// Single-slot transient banner.
///
/// Every [`notify`](Self::notify) replaces the banner and owns the only
/// pending auto-clear; the previous timer is aborted, so an older timer can
/// never clear a newer message.
#[derive(Clone)]
pub struct NotificationCenter {
    spawner: Arc<dyn Spawn + Send + Sync>,
    display_for: Duration,
    state: Arc<RwLock<NotificationState>>,
}

impl NotificationCenter {
    pub fn new(spawner: impl Spawn + Send + Sync + 'static) -> Self {
        Self::with_display_duration(spawner, Duration::from_millis(NOTIFICATION_DISPLAY_MS))
    }

    pub(crate) fn with_display_duration(
        spawner: impl Spawn + Send + Sync + 'static,
        display_for: Duration,
    ) -> Self {
        Self {
            spawner: Arc::new(spawner),
            display_for,
            state: Arc::new(RwLock::new(NotificationState::default())),
        }
    }

    pub fn display_duration(&self) -> Duration {
        self.display_for
    }

    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        let (id, timer) = {
            let mut state = write_state(&self.state);
            state.next_id += 1;
            let id = NotificationId(state.next_id);
            if let Some(previous) = state.auto_clear.take() {
                previous.abort();
            }
            let (timer, handle) = abortable(Delay::new(self.display_for));
            state.current = Some(Notification {
                id,
                message: message.into(),
                kind,
            });
            state.auto_clear = Some(handle);
            (id, timer)
        };
        tracing::debug!(id = id.0, ?kind, "notification shown");

        let state = Arc::clone(&self.state);
        let auto_clear = async move {
            if timer.await.is_ok() {
                clear_if_current(&state, id);
            }
        };
        if let Err(error) = self.spawner.spawn(auto_clear) {
            tracing::warn!(id = id.0, %error, "could not schedule notification auto-clear");
        }
        id
    }

    pub fn dismiss(&self) -> Option<Notification> {
        let mut state = write_state(&self.state);
        if let Some(timer) = state.auto_clear.take() {
            timer.abort();
        }
        state.current.take()
    }

    pub fn current(&self) -> Option<Notification> {
        read_state(&self.state).current.clone()
    }

    pub fn is_visible(&self) -> bool {
        read_state(&self.state).current.is_some()
    }
}

fn clear_if_current(state: &RwLock<NotificationState>, id: NotificationId) {
    let mut state = write_state(state);
    if state
        .current
        .as_ref()
        .is_some_and(|notification| notification.id == id)
    {
        state.current = None;
        state.auto_clear = None;
        tracing::debug!(id = id.0, "notification cleared");
    }
}

fn read_state(state: &RwLock<NotificationState>) -> RwLockReadGuard<'_, NotificationState> {
    match state.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write_state(state: &RwLock<NotificationState>) -> RwLockWriteGuard<'_, NotificationState> {
    match state.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
