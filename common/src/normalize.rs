use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{ReplyAction, ReplyActionCache};
use crate::notification::{
    EXTRA_PICTURE, EXTRA_TEXT, EXTRA_TITLE, ExtraValue, Extras, NotificationId,
    StatusNotification,
};
use crate::payload::{Field, NotificationPayload};
use crate::platform::HostPlatform;
use crate::utils::errors::HeraldErrorKind;

/// Freedesktop notification spec 1.2 introduced the `image-data` hint.
pub const DEFAULT_LARGE_ICON_MIN_VERSION: u32 = 12;

/// Turns host notifications into [`NotificationPayload`]s.
///
/// Every lookup is isolated: a failing icon or picture leaves its field
/// absent and never aborts the rest of the payload.
pub struct Normalizer<P> {
    platform: Arc<P>,
    cache: Arc<ReplyActionCache>,
    large_icon_min_version: u32,
}
impl<P: HostPlatform> Normalizer<P> {
    pub fn new(platform: Arc<P>, cache: Arc<ReplyActionCache>) -> Self {
        Self {
            platform,
            cache,
            large_icon_min_version: DEFAULT_LARGE_ICON_MIN_VERSION,
        }
    }

    pub fn with_large_icon_min_version(mut self, version: u32) -> Self {
        self.large_icon_min_version = version;
        self
    }

    /// Builds the payload for a posted or removed notification.
    ///
    /// Posting caches the derived reply action under the notification id and
    /// drops a stale one when the record no longer offers a reply. Removal
    /// leaves the cache alone, the caller evicts the id.
    pub fn normalize(&self, sbn: &StatusNotification, is_removed: bool) -> NotificationPayload {
        let action = derive_reply_action(sbn);
        let can_reply = action.is_some();
        if !is_removed {
            match action {
                Some(action) => self.cache.put(sbn.id, action),
                None => {
                    // A replacement without reply capability invalidates the old action
                    if self.cache.remove(sbn.id).is_some() {
                        debug!(id = sbn.id, "dropped stale reply action");
                    }
                }
            }
        }
        self.build(sbn, is_removed, can_reply)
    }

    /// Payload for a snapshot query. Never touches the cache, so listing
    /// notifications cannot push live reply actions out of it.
    pub fn normalize_snapshot(&self, sbn: &StatusNotification) -> NotificationPayload {
        let can_reply = derive_reply_action(sbn).is_some();
        self.build(sbn, false, can_reply)
    }

    fn build(
        &self,
        sbn: &StatusNotification,
        is_removed: bool,
        can_reply: bool,
    ) -> NotificationPayload {
        let event = sbn.event(is_removed);

        let app_icon = self.app_icon(&event.package_name);
        let large_icon = if self.platform.version() >= self.large_icon_min_version {
            self.large_icon(sbn)
        } else {
            None
        };

        let mut payload = NotificationPayload::new();
        payload.insert(Field::Id, event.id);
        payload.insert(Field::PackageName, event.package_name);
        payload.insert(Field::CanReply, can_reply);
        payload.insert(Field::AppIcon, app_icon);
        payload.insert(Field::LargeIcon, large_icon);
        payload.insert(Field::PostedAtEpochMs, event.posted_at_epoch_ms);
        payload.insert(Field::IsRemoved, event.is_removed);

        if let Some(extras) = &sbn.extras {
            payload.insert(Field::Title, extras.text(EXTRA_TITLE).map(str::to_owned));
            payload.insert(Field::Content, extras.text(EXTRA_TEXT).map(str::to_owned));

            let has_picture = extras.contains_key(EXTRA_PICTURE);
            payload.insert(Field::HasAttachedPicture, has_picture);
            if has_picture {
                if let Some(bytes) = self.attached_picture(event.id, extras) {
                    payload.insert(Field::AttachedPictureBytes, bytes);
                }
            }
        }

        payload
    }

    fn app_icon(&self, package_name: &str) -> Option<Vec<u8>> {
        let icon = match self.platform.application_icon(package_name) {
            Ok(icon) => icon,
            Err(e) if e.kind == HeraldErrorKind::PackageNotFound => {
                debug!(package = package_name, "no application icon: {}", e.message);
                return None;
            }
            Err(e) => {
                warn!(package = package_name, "application icon lookup failed: {e}");
                return None;
            }
        };
        icon.to_png()
            .inspect_err(|e| warn!(package = package_name, "application icon encoding failed: {e}"))
            .ok()
    }

    fn large_icon(&self, sbn: &StatusNotification) -> Option<Vec<u8>> {
        let icon_ref = sbn.large_icon.as_ref()?;
        self.platform
            .load_icon(icon_ref)
            .and_then(|icon| icon.to_png())
            .inspect_err(|e| debug!(id = sbn.id, "large icon unavailable: {e}"))
            .ok()
    }

    fn attached_picture(&self, id: NotificationId, extras: &Extras) -> Option<Vec<u8>> {
        match extras.get(EXTRA_PICTURE) {
            Some(ExtraValue::Image(icon_ref)) => self
                .platform
                .load_icon(icon_ref)
                .and_then(|icon| icon.to_png())
                .inspect_err(|e| warn!(id, "attached picture unreadable: {e}"))
                .ok(),
            Some(ExtraValue::Null) => {
                warn!(id, "attached picture key exists but is null");
                None
            }
            _ => {
                warn!(id, "attached picture key does not hold an image");
                None
            }
        }
    }
}

/// First action that takes free text becomes the reply action.
pub fn derive_reply_action(sbn: &StatusNotification) -> Option<ReplyAction> {
    sbn.actions
        .iter()
        .find(|action| action.accepts_free_text)
        .map(|action| ReplyAction {
            package_name: sbn.package_name.clone(),
            target: action.key.clone(),
            label: action.label.clone(),
            input_hint: action.input_hint.clone(),
        })
}
