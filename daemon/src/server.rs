use std::path::Path;
use std::sync::Arc;

use common::herald_err;
use common::notification::NotificationId;
use common::protocol::{IntoResponse, Request, Response};
use common::reply::{ReplyInvoker, ReplyService};
use common::tokio::{AsyncSizedMessage, SizedMessageObj};
use common::utils::errors::{HeraldError, HeraldErrorKind};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, trace, warn};

use crate::Bridge;
use crate::notify::{self, CloseReason, NotificationDaemon};

/// Serves the herald socket protocol to application clients.
pub struct SocketServer<R> {
    daemon: Arc<NotificationDaemon>,
    bridge: Arc<Bridge>,
    replies: ReplyService<R>,
    /// `NotificationClosed` is only emitted while connected to the bus.
    conn: Option<zbus::Connection>,
}
impl<R: ReplyInvoker + 'static> SocketServer<R> {
    pub fn new(
        daemon: Arc<NotificationDaemon>,
        bridge: Arc<Bridge>,
        replies: ReplyService<R>,
        conn: Option<zbus::Connection>,
    ) -> Self {
        Self {
            daemon,
            bridge,
            replies,
            conn,
        }
    }

    pub async fn serve(self: Arc<Self>, socket_path: &Path) -> Result<(), HeraldError> {
        let _ = std::fs::remove_file(socket_path);
        let listener = UnixListener::bind(socket_path).map_err(|e| {
            herald_err!(
                HeraldErrorKind::StreamBind,
                "{}: {}",
                socket_path.display(),
                e
            )
        })?;
        info!(path = %socket_path.display(), "listening for clients");

        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("accepting client failed: {e}");
                    continue;
                }
            };
            let server = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(e) = server.handle_client(stream).await {
                    debug!("client connection ended: {e}");
                }
            });
        }
    }

    async fn handle_client(&self, mut stream: UnixStream) -> Result<(), HeraldError> {
        loop {
            let buf = match stream.read_sized().await {
                Ok(b) => b,
                // Client disconnected
                Err(e) if e.kind == HeraldErrorKind::StreamRead => return Ok(()),
                Err(e) => {
                    warn!("rejected client frame: {e}");
                    return Err(e);
                }
            };

            let req: Request = match SizedMessageObj::to_struct(&buf) {
                Ok(r) => r,
                Err(e) => {
                    warn!("malformed request: {e}");
                    let resp = Response::Error(e.message);
                    stream.write_sized(SizedMessageObj::from_struct(&resp)?).await?;
                    continue;
                }
            };
            trace!(?req, "request");

            let resp = match req {
                Request::Ping => Response::Pong,
                Request::ActiveNotifications => {
                    Response::Notifications(self.bridge.active_notification_data())
                }
                Request::Reply { id, message } => {
                    self.replies.send_reply(id, &message).await.into_response()
                }
                Request::Dismiss { id } => self.dismiss(id).await.into_response(),
                Request::Subscribe => return self.stream_events(stream).await,
            };
            stream.write_sized(SizedMessageObj::from_struct(&resp)?).await?;
        }
    }

    async fn stream_events(&self, mut stream: UnixStream) -> Result<(), HeraldError> {
        let mut rx = self.bridge.dispatcher().sink().subscribe();
        stream
            .write_sized(SizedMessageObj::from_struct(&Response::Ok)?)
            .await?;
        debug!("client subscribed");

        loop {
            match rx.recv().await {
                Ok(event) => {
                    let resp = Response::Event(event);
                    stream.write_sized(SizedMessageObj::from_struct(&resp)?).await?;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber fell behind, events dropped");
                }
                Err(RecvError::Closed) => return Ok(()),
            }
        }
    }

    async fn dismiss(&self, id: NotificationId) -> Result<(), HeraldError> {
        if notify::close(&self.daemon, &self.bridge, id).is_none() {
            return Err(herald_err!(
                HeraldErrorKind::InvalidData,
                "no notification with id {}",
                id
            ));
        }
        if let Some(conn) = &self.conn {
            notify::emit_closed(conn, id, CloseReason::Dismissed).await?;
        }
        Ok(())
    }
}
