use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use common::herald_err;
use common::notification::{NotificationId, StatusNotification};
use common::utils::errors::{HeraldError, HeraldErrorKind};
use dashmap::DashMap;
use tracing::{debug, trace, warn};
use zbus::interface;
use zbus::object_server::SignalEmitter;
use zbus::zvariant::OwnedValue;

use crate::Bridge;
use crate::hints::{INLINE_REPLY_ACTION, NotifyArgs};

pub const NOTIFICATIONS_NAME: &str = "org.freedesktop.Notifications";
pub const NOTIFICATIONS_PATH: &str = "/org/freedesktop/Notifications";

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Dismissed = 2,
    Closed = 3,
}

/// Notifications currently shown, keyed by id.
pub struct NotificationDaemon {
    id: AtomicI32,
    buffer: DashMap<NotificationId, StatusNotification>,
}
impl NotificationDaemon {
    pub fn new() -> Self {
        Self {
            id: AtomicI32::new(0),
            buffer: DashMap::new(),
        }
    }

    /// Reuses `replaces_id` when it names a shown notification, otherwise
    /// hands out the next id not in use. Ids stay positive and wrap back to 1.
    pub fn allocate_id(&self, replaces_id: u32) -> NotificationId {
        if let Ok(id) = NotificationId::try_from(replaces_id) {
            if id > 0 && self.buffer.contains_key(&id) {
                return id;
            }
        }
        let next = |id: i32| id.checked_add(1).unwrap_or(1);
        loop {
            let prev = self
                .id
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| Some(next(id)))
                .unwrap_or_else(|id| id);
            let id = next(prev);
            if !self.buffer.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn insert(&self, sbn: StatusNotification) {
        self.buffer.insert(sbn.id, sbn);
    }

    pub fn remove(&self, id: NotificationId) -> Option<StatusNotification> {
        self.buffer.remove(&id).map(|(_, sbn)| sbn)
    }

    pub fn pending_notifications(&self) -> Vec<StatusNotification> {
        let mut pending: Vec<_> = self.buffer.iter().map(|sbn| sbn.clone()).collect();
        pending.sort_by_key(|sbn| sbn.post_time);
        pending
    }
}

pub struct DaemonHandle {
    daemon: Arc<NotificationDaemon>,
    bridge: Arc<Bridge>,
}
impl DaemonHandle {
    pub fn new(daemon: Arc<NotificationDaemon>, bridge: Arc<Bridge>) -> Self {
        Self { daemon, bridge }
    }
}

/// Removes `id` from the store and reports the removal to the bridge.
pub fn close(
    daemon: &NotificationDaemon,
    bridge: &Bridge,
    id: NotificationId,
) -> Option<StatusNotification> {
    let sbn = daemon.remove(id)?;
    if let Err(e) = bridge.on_removed(&sbn) {
        warn!(id, "dispatching removal failed: {e}");
    }
    Some(sbn)
}

/// `CloseNotification` handling: unknown ids are a D-Bus error.
fn close_requested(
    daemon: &NotificationDaemon,
    bridge: &Bridge,
    id: u32,
) -> zbus::fdo::Result<()> {
    NotificationId::try_from(id)
        .ok()
        .and_then(|id| close(daemon, bridge, id))
        .map(|_| ())
        .ok_or_else(|| {
            debug!(id, "close requested for unknown notification");
            zbus::fdo::Error::Failed(format!("no notification with id {id}"))
        })
}

/// Emits `NotificationClosed` on the served interface.
pub async fn emit_closed(
    conn: &zbus::Connection,
    id: NotificationId,
    reason: CloseReason,
) -> Result<(), HeraldError> {
    let iface = conn
        .object_server()
        .interface::<_, DaemonHandle>(NOTIFICATIONS_PATH)
        .await
        .map_err(|e| herald_err!(HeraldErrorKind::DBusSignal, e.to_string()))?;
    DaemonHandle::notification_closed(iface.signal_emitter(), id as u32, reason as u32)
        .await
        .map_err(|e| herald_err!(HeraldErrorKind::DBusSignal, e.to_string()))
}

#[interface(name = "org.freedesktop.Notifications")]
impl DaemonHandle {
    #[allow(clippy::too_many_arguments)]
    async fn notify(
        &self,
        app_name: String,
        replaces_id: u32,
        app_icon: String,
        summary: String,
        body: String,
        actions: Vec<String>,
        hints: HashMap<String, OwnedValue>,
        expire_timeout: i32,
    ) -> u32 {
        let id = self.daemon.allocate_id(replaces_id);
        trace!(id, replaces_id, expire_timeout, "notification received");

        let args = NotifyArgs {
            app_name,
            app_icon,
            summary,
            body,
            actions,
            hints,
        };
        let sbn = args.into_status(id, chrono::Utc::now().timestamp_millis());
        self.daemon.insert(sbn.clone());

        if let Err(e) = self.bridge.on_posted(&sbn) {
            warn!(id, "dispatching notification failed: {e}");
        }

        id as u32
    }

    async fn close_notification(
        &self,
        id: u32,
        #[zbus(signal_emitter)] emitter: SignalEmitter<'_>,
    ) -> zbus::fdo::Result<()> {
        close_requested(&self.daemon, &self.bridge, id)?;
        Self::notification_closed(&emitter, id, CloseReason::Closed as u32).await?;
        Ok(())
    }

    fn get_capabilities(&self) -> Vec<String> {
        vec![
            "body".into(),
            "actions".into(),
            "icon-static".into(),
            INLINE_REPLY_ACTION.into(),
        ]
    }

    fn get_server_information(&self) -> (String, String, String, String) {
        (
            "herald-daemon".into(),
            "herald".into(),
            env!("CARGO_PKG_VERSION").into(),
            "1.2".into(),
        )
    }

    #[zbus(signal)]
    async fn notification_closed(
        emitter: &SignalEmitter<'_>,
        id: u32,
        reason: u32,
    ) -> zbus::Result<()>;

    #[zbus(signal)]
    pub async fn notification_replied(
        emitter: &SignalEmitter<'_>,
        id: u32,
        text: &str,
    ) -> zbus::Result<()>;
}

#[cfg(test)]
mod tests {
    use common::cache::ReplyActionCache;
    use common::dispatch::OutgoingEvent;
    use common::utils::icons::IconTheme;
    use tokio::sync::broadcast;

    use super::*;
    use crate::host::FreedesktopHost;

    #[test]
    fn ids_count_up_from_one() {
        let daemon = NotificationDaemon::new();
        assert_eq!(daemon.allocate_id(0), 1);
        assert_eq!(daemon.allocate_id(0), 2);
    }

    #[test]
    fn replaces_id_is_reused() {
        let daemon = NotificationDaemon::new();
        daemon.insert(StatusNotification::new(42, "app", 0));
        assert_eq!(daemon.allocate_id(42), 42);
        assert_eq!(daemon.allocate_id(0), 1);
    }

    #[test]
    fn unknown_replaces_id_gets_fresh_id() {
        let daemon = NotificationDaemon::new();
        assert_eq!(daemon.allocate_id(3), 1);
    }

    #[test]
    fn fresh_ids_skip_shown_notifications() {
        let daemon = NotificationDaemon::new();
        daemon.insert(StatusNotification::new(2, "app", 0));
        daemon.insert(StatusNotification::new(3, "app", 0));

        let ids: Vec<_> = (0..3).map(|_| daemon.allocate_id(0)).collect();
        assert_eq!(ids, [1, 4, 5]);
    }

    #[test]
    fn ids_wrap_to_one() {
        let daemon = NotificationDaemon {
            id: AtomicI32::new(i32::MAX),
            buffer: DashMap::new(),
        };
        assert_eq!(daemon.allocate_id(0), 1);
        // Out of range replaces ids get a fresh id
        assert_eq!(daemon.allocate_id(u32::MAX), 2);
    }

    #[test]
    fn closing_unknown_id_fails() {
        let daemon = Arc::new(NotificationDaemon::new());
        let host = Arc::new(FreedesktopHost::with_theme(
            Arc::clone(&daemon),
            IconTheme::new(),
        ));
        let (tx, _) = broadcast::channel::<OutgoingEvent>(4);
        let bridge = Bridge::new(host, tx, Arc::new(ReplyActionCache::default()));
        daemon.insert(StatusNotification::new(1, "app", 0));

        assert!(close_requested(&daemon, &bridge, 1).is_ok());
        assert!(daemon.pending_notifications().is_empty());
        assert!(matches!(
            close_requested(&daemon, &bridge, 1),
            Err(zbus::fdo::Error::Failed(_))
        ));
        assert!(close_requested(&daemon, &bridge, u32::MAX).is_err());
    }

    #[test]
    fn store_replaces_by_id() {
        let daemon = NotificationDaemon::new();
        daemon.insert(StatusNotification::new(1, "app", 10));
        daemon.insert(StatusNotification::new(1, "other", 20));
        daemon.insert(StatusNotification::new(2, "app", 5));

        let pending = daemon.pending_notifications();
        assert_eq!(pending.iter().map(|s| s.id).collect::<Vec<_>>(), [2, 1]);
        assert_eq!(pending[1].package_name, "other");

        assert!(daemon.remove(2).is_some());
        assert!(daemon.remove(2).is_none());
    }
}
