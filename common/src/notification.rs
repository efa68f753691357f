use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::utils::icons::RasterImage;

pub type NotificationId = i32;

pub const EXTRA_TITLE: &str = "title";
pub const EXTRA_TEXT: &str = "text";
pub const EXTRA_PICTURE: &str = "picture";

/// Where an icon can be loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IconRef {
    /// Pixels shipped with the notification itself.
    Raster(RasterImage),
    /// Image file on disk.
    Path(PathBuf),
    /// Icon theme name.
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtraValue {
    Text(String),
    Bool(bool),
    Int(i64),
    Image(IconRef),
    Null,
}

/// Loosely typed side channel of notification metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extras {
    values: HashMap<String, ExtraValue>,
}
impl Extras {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with(mut self, key: impl Into<String>, value: ExtraValue) -> Self {
        self.insert(key, value);
        self
    }
    pub fn insert(&mut self, key: impl Into<String>, value: ExtraValue) {
        self.values.insert(key.into(), value);
    }
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
    pub fn get(&self, key: &str) -> Option<&ExtraValue> {
        self.values.get(key)
    }
    /// Text stored under `key`, `None` if missing or not text.
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ExtraValue::Text(text)) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub key: String,
    pub label: String,
    /// The action takes free text input (inline reply).
    pub accepts_free_text: bool,
    pub input_hint: Option<String>,
}
impl NotificationAction {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            accepts_free_text: false,
            input_hint: None,
        }
    }
    pub fn with_free_text(mut self, hint: Option<String>) -> Self {
        self.accepts_free_text = true;
        self.input_hint = hint;
        self
    }
}

/// A notification as handed over by the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusNotification {
    pub id: NotificationId,
    pub package_name: String,
    /// Milliseconds since the unix epoch.
    pub post_time: i64,
    pub large_icon: Option<IconRef>,
    pub extras: Option<Extras>,
    pub actions: Vec<NotificationAction>,
}
impl StatusNotification {
    pub fn new(id: NotificationId, package_name: impl Into<String>, post_time: i64) -> Self {
        Self {
            id,
            package_name: package_name.into(),
            post_time,
            large_icon: None,
            extras: None,
            actions: Vec::new(),
        }
    }
    pub fn event(&self, is_removed: bool) -> NotificationEvent {
        NotificationEvent {
            id: self.id,
            package_name: self.package_name.clone(),
            posted_at_epoch_ms: self.post_time,
            is_removed,
        }
    }
}

/// Core fields of a single posted or removed callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub id: NotificationId,
    pub package_name: String,
    pub posted_at_epoch_ms: i64,
    pub is_removed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_ignores_non_text_values() {
        let extras = Extras::new()
            .with(EXTRA_TITLE, ExtraValue::Text("Hello".into()))
            .with(EXTRA_TEXT, ExtraValue::Null)
            .with("count", ExtraValue::Int(3));

        assert_eq!(extras.text(EXTRA_TITLE), Some("Hello"));
        assert_eq!(extras.text(EXTRA_TEXT), None);
        assert_eq!(extras.text("count"), None);
        assert!(extras.contains_key(EXTRA_TEXT));
        assert!(!extras.contains_key(EXTRA_PICTURE));
    }

    #[test]
    fn event_carries_core_fields() {
        let sbn = StatusNotification::new(7, "org.example.chat", 1_700_000_000_000);
        let event = sbn.event(true);
        assert_eq!(event.id, 7);
        assert_eq!(event.package_name, "org.example.chat");
        assert_eq!(event.posted_at_epoch_ms, 1_700_000_000_000);
        assert!(event.is_removed);
    }
}
