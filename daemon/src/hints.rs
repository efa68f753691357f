use std::collections::HashMap;
use std::path::PathBuf;

use common::herald_err;
use common::notification::{
    EXTRA_PICTURE, EXTRA_TEXT, EXTRA_TITLE, ExtraValue, Extras, IconRef, NotificationAction,
    NotificationId, StatusNotification,
};
use common::utils::errors::{HeraldError, HeraldErrorKind};
use common::utils::icons::RasterImage;
use tracing::debug;
use zbus::zvariant::{OwnedValue, Value};

/// Action key KDE uses for inline replies.
pub const INLINE_REPLY_ACTION: &str = "inline-reply";
const REPLY_PLACEHOLDER_HINT: &str = "x-kde-reply-placeholder-text";
const DESKTOP_ENTRY_HINT: &str = "desktop-entry";
const IMAGE_PATH_HINT: &str = "image-path";
/// Raw image hints by precedence, newest spec revision first.
const IMAGE_DATA_HINTS: [&str; 3] = ["image-data", "image_data", "icon_data"];

/// Wire layout of the `(iiibiiay)` image hint.
#[derive(Debug, Clone, zbus::zvariant::Value, zbus::zvariant::OwnedValue)]
pub struct ImageData {
    pub width: i32,
    pub height: i32,
    pub rowstride: i32,
    pub has_alpha: bool,
    pub bits_per_sample: i32,
    pub channels: i32,
    pub data: Vec<u8>,
}
impl TryFrom<ImageData> for RasterImage {
    type Error = HeraldError;

    fn try_from(value: ImageData) -> Result<Self, Self::Error> {
        let dimension = |v: i32, name: &str| {
            u32::try_from(v).map_err(|_| {
                herald_err!(HeraldErrorKind::InvalidHint, "negative image {}: {}", name, v)
            })
        };
        let sample = |v: i32, name: &str| {
            u8::try_from(v).map_err(|_| {
                herald_err!(HeraldErrorKind::InvalidHint, "image {} out of range: {}", name, v)
            })
        };
        Ok(Self {
            width: dimension(value.width, "width")?,
            height: dimension(value.height, "height")?,
            rowstride: dimension(value.rowstride, "rowstride")?,
            has_alpha: value.has_alpha,
            bits_per_sample: sample(value.bits_per_sample, "bits per sample")?,
            channels: sample(value.channels, "channels")?,
            data: value.data,
        })
    }
}

/// Arguments of one `Notify` call.
#[derive(Debug, Default)]
pub struct NotifyArgs {
    pub app_name: String,
    pub app_icon: String,
    pub summary: String,
    pub body: String,
    pub actions: Vec<String>,
    pub hints: HashMap<String, OwnedValue>,
}
impl NotifyArgs {
    /// Maps the freedesktop call onto the host record the bridge consumes.
    pub fn into_status(self, id: NotificationId, post_time: i64) -> StatusNotification {
        let package_name = match string_hint(&self.hints, DESKTOP_ENTRY_HINT) {
            Some(entry) if !entry.is_empty() => entry.to_string(),
            _ => self.app_name.clone(),
        };

        let mut sbn = StatusNotification::new(id, package_name, post_time);
        sbn.large_icon = self.large_icon(id);
        sbn.extras = Some(self.extras());
        sbn.actions = self.actions();
        sbn
    }

    fn large_icon(&self, id: NotificationId) -> Option<IconRef> {
        if let Some(value) = IMAGE_DATA_HINTS.iter().find_map(|key| self.hints.get(*key)) {
            return match raster_from_hint(value) {
                Ok(image) => Some(IconRef::Raster(image)),
                Err(e) => {
                    debug!(id, "ignoring image hint: {e}");
                    None
                }
            };
        }
        icon_ref(&self.app_icon)
    }

    fn extras(&self) -> Extras {
        let mut extras = Extras::new();
        if !self.summary.is_empty() {
            extras.insert(EXTRA_TITLE, ExtraValue::Text(self.summary.clone()));
        }
        if !self.body.is_empty() {
            extras.insert(EXTRA_TEXT, ExtraValue::Text(self.body.clone()));
        }
        if self.hints.contains_key(IMAGE_PATH_HINT) {
            let picture = string_hint(&self.hints, IMAGE_PATH_HINT)
                .and_then(icon_ref)
                .map_or(ExtraValue::Null, ExtraValue::Image);
            extras.insert(EXTRA_PICTURE, picture);
        }
        extras
    }

    fn actions(&self) -> Vec<NotificationAction> {
        let placeholder = string_hint(&self.hints, REPLY_PLACEHOLDER_HINT).map(str::to_owned);
        self.actions
            .chunks(2)
            .map(|pair| {
                let key = &pair[0];
                let label = pair.get(1).unwrap_or(key);
                let action = NotificationAction::new(key.as_str(), label.as_str());
                if key == INLINE_REPLY_ACTION {
                    action.with_free_text(placeholder.clone())
                } else {
                    action
                }
            })
            .collect()
    }
}

fn string_hint<'a>(hints: &'a HashMap<String, OwnedValue>, key: &str) -> Option<&'a str> {
    match &**hints.get(key)? {
        Value::Str(s) => Some(s.as_str()),
        _ => None,
    }
}

pub fn raster_from_hint(value: &OwnedValue) -> Result<RasterImage, HeraldError> {
    let owned = value
        .try_clone()
        .map_err(|e| herald_err!(HeraldErrorKind::InvalidHint, e.to_string()))?;
    let data = ImageData::try_from(owned)
        .map_err(|e| herald_err!(HeraldErrorKind::InvalidHint, e.to_string()))?;
    RasterImage::try_from(data)
}

/// Interprets an icon string: `file://` URIs and absolute paths are files,
/// anything else is an icon theme name.
pub fn icon_ref(icon: &str) -> Option<IconRef> {
    if icon.is_empty() {
        return None;
    }
    if let Some(path) = icon.strip_prefix("file://") {
        return Some(IconRef::Path(PathBuf::from(path)));
    }
    if icon.starts_with('/') {
        return Some(IconRef::Path(PathBuf::from(icon)));
    }
    Some(IconRef::Named(icon.to_string()))
}
