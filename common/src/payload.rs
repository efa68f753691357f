use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoStaticStr};

/// Stable names of every field a payload can carry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Id,
    PackageName,
    CanReply,
    AppIcon,
    LargeIcon,
    PostedAtEpochMs,
    IsRemoved,
    Title,
    Content,
    HasAttachedPicture,
    AttachedPictureBytes,
}
impl Field {
    /// Fields that only exist when the notification carries extras.
    pub fn requires_extras(self) -> bool {
        matches!(
            self,
            Self::Title | Self::Content | Self::HasAttachedPicture | Self::AttachedPictureBytes
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PayloadValue {
    Bytes(Vec<u8>),
    Bool(bool),
    Int(i32),
    Long(i64),
    Str(String),
    /// Floating point values have no event carrier and never leave the process.
    Double(f64),
    Absent,
}
impl From<Option<Vec<u8>>> for PayloadValue {
    fn from(value: Option<Vec<u8>>) -> Self {
        value.map_or(Self::Absent, Self::Bytes)
    }
}
impl From<Option<String>> for PayloadValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Absent, Self::Str)
    }
}
impl From<Vec<u8>> for PayloadValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}
impl From<bool> for PayloadValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
impl From<i32> for PayloadValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}
impl From<i64> for PayloadValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}
impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Flat, normalized view of one notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    fields: BTreeMap<Field, PayloadValue>,
}
impl NotificationPayload {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, field: Field, value: impl Into<PayloadValue>) {
        self.fields.insert(field, value.into());
    }
    pub fn get(&self, field: Field) -> Option<&PayloadValue> {
        self.fields.get(&field)
    }
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }
    pub fn len(&self) -> usize {
        self.fields.len()
    }
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = (Field, &PayloadValue)> {
        self.fields.iter().map(|(k, v)| (*k, v))
    }

    // Typed getters
    pub fn id(&self) -> Option<i32> {
        match self.get(Field::Id) {
            Some(PayloadValue::Int(id)) => Some(*id),
            _ => None,
        }
    }
    pub fn str(&self, field: Field) -> Option<&str> {
        match self.get(field) {
            Some(PayloadValue::Str(s)) => Some(s),
            _ => None,
        }
    }
    pub fn bool(&self, field: Field) -> Option<bool> {
        match self.get(field) {
            Some(PayloadValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }
    pub fn long(&self, field: Field) -> Option<i64> {
        match self.get(field) {
            Some(PayloadValue::Long(l)) => Some(*l),
            _ => None,
        }
    }
    pub fn bytes(&self, field: Field) -> Option<&[u8]> {
        match self.get(field) {
            Some(PayloadValue::Bytes(b)) => Some(b),
            _ => None,
        }
    }
}
