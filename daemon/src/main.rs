mod hints;
mod host;
mod notify;
mod reply;
mod server;

use std::sync::Arc;

use common::bridge::NotificationBridge;
use common::cache::ReplyActionCache;
use common::config::load_config;
use common::dispatch::OutgoingEvent;
use common::herald_err;
use common::logging;
use common::reply::ReplyService;
use common::utils::errors::{HeraldError, HeraldErrorKind};
use tokio::sync::broadcast;
use tracing::info;

use crate::host::FreedesktopHost;
use crate::notify::{DaemonHandle, NOTIFICATIONS_NAME, NOTIFICATIONS_PATH, NotificationDaemon};
use crate::reply::DbusReplyInvoker;
use crate::server::SocketServer;

pub(crate) type Bridge = NotificationBridge<FreedesktopHost, broadcast::Sender<OutgoingEvent>>;

#[tokio::main]
async fn main() -> Result<(), HeraldError> {
    let config = load_config()?;
    logging::init(&config.log_filter)?;

    let daemon = Arc::new(NotificationDaemon::new());
    let host = Arc::new(FreedesktopHost::new(
        Arc::clone(&daemon),
        &config.icon_paths,
    ));
    let cache = Arc::new(ReplyActionCache::new(
        config.reply_cache.capacity,
        config.reply_cache.ttl(),
    ));
    let (tx, _) = broadcast::channel(config.event_capacity);
    let bridge = Arc::new(
        Bridge::new(host, tx, Arc::clone(&cache))
            .with_large_icon_min_version(config.large_icon_min_version),
    );

    let conn = zbus::connection::Builder::session()
        .and_then(|b| b.name(NOTIFICATIONS_NAME))
        .and_then(|b| {
            b.serve_at(
                NOTIFICATIONS_PATH,
                DaemonHandle::new(Arc::clone(&daemon), Arc::clone(&bridge)),
            )
        })
        .map_err(|e| herald_err!(HeraldErrorKind::DBusConnect, e.to_string()))?
        .build()
        .await
        .map_err(|e| herald_err!(HeraldErrorKind::DBusConnect, e.to_string()))?;
    info!(name = NOTIFICATIONS_NAME, "notification server registered");

    let replies = ReplyService::new(cache, DbusReplyInvoker::new(conn.clone()));
    let server = Arc::new(SocketServer::new(daemon, bridge, replies, Some(conn)));
    server.serve(&config.socket_path).await
}
