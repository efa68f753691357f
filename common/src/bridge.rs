use std::sync::Arc;

use tracing::debug;

use crate::cache::ReplyActionCache;
use crate::dispatch::{Dispatcher, EventSink};
use crate::normalize::Normalizer;
use crate::notification::StatusNotification;
use crate::payload::NotificationPayload;
use crate::platform::HostPlatform;
use crate::utils::errors::HeraldError;

/// Entry point the host calls for every posted or removed notification.
pub struct NotificationBridge<P, S> {
    platform: Arc<P>,
    normalizer: Normalizer<P>,
    dispatcher: Dispatcher<S>,
    cache: Arc<ReplyActionCache>,
}
impl<P: HostPlatform, S: EventSink> NotificationBridge<P, S> {
    pub fn new(platform: Arc<P>, sink: S, cache: Arc<ReplyActionCache>) -> Self {
        Self {
            normalizer: Normalizer::new(Arc::clone(&platform), Arc::clone(&cache)),
            dispatcher: Dispatcher::new(sink),
            platform,
            cache,
        }
    }

    pub fn with_large_icon_min_version(mut self, version: u32) -> Self {
        self.normalizer = self.normalizer.with_large_icon_min_version(version);
        self
    }

    pub fn on_posted(&self, sbn: &StatusNotification) -> Result<(), HeraldError> {
        debug!(id = sbn.id, package = %sbn.package_name, "notification posted");
        let purged = self.cache.purge_expired();
        if purged > 0 {
            debug!(purged, "expired reply actions dropped");
        }
        let payload = self.normalizer.normalize(sbn, false);
        self.dispatcher.dispatch(&payload)
    }

    pub fn on_removed(&self, sbn: &StatusNotification) -> Result<(), HeraldError> {
        debug!(id = sbn.id, package = %sbn.package_name, "notification removed");
        self.cache.remove(sbn.id);
        let payload = self.normalizer.normalize(sbn, true);
        self.dispatcher.dispatch(&payload)
    }

    /// Snapshot of every active notification, all marked as not removed.
    pub fn active_notification_data(&self) -> Vec<NotificationPayload> {
        self.platform
            .active_notifications()
            .iter()
            .map(|sbn| self.normalizer.normalize_snapshot(sbn))
            .collect()
    }

    pub fn cache(&self) -> &Arc<ReplyActionCache> {
        &self.cache
    }

    pub fn dispatcher(&self) -> &Dispatcher<S> {
        &self.dispatcher
    }
}
