use async_trait::async_trait;
use common::cache::ReplyAction;
use common::herald_err;
use common::notification::NotificationId;
use common::reply::ReplyInvoker;
use common::utils::errors::{HeraldError, HeraldErrorKind};
use tracing::debug;

use crate::notify::{DaemonHandle, NOTIFICATIONS_PATH};

/// Hands reply text back to the sending application through the
/// `NotificationReplied` signal of the inline-reply extension.
pub struct DbusReplyInvoker {
    conn: zbus::Connection,
}
impl DbusReplyInvoker {
    pub fn new(conn: zbus::Connection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ReplyInvoker for DbusReplyInvoker {
    async fn invoke(
        &self,
        id: NotificationId,
        action: &ReplyAction,
        message: &str,
    ) -> Result<(), HeraldError> {
        let wire_id = u32::try_from(id)
            .map_err(|_| herald_err!(HeraldErrorKind::ReplySend, "invalid notification id {}", id))?;
        let iface = self
            .conn
            .object_server()
            .interface::<_, DaemonHandle>(NOTIFICATIONS_PATH)
            .await
            .map_err(|e| herald_err!(HeraldErrorKind::ReplySend, e.to_string()))?;

        debug!(id, target = %action.target, package = %action.package_name, "emitting reply");
        DaemonHandle::notification_replied(iface.signal_emitter(), wire_id, message)
            .await
            .map_err(|e| herald_err!(HeraldErrorKind::ReplySend, e.to_string()))
    }
}
