pub mod bridge;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod normalize;
pub mod notification;
pub mod payload;
pub mod platform;
pub mod protocol;
pub mod reply;
pub mod tokio;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use bridge::NotificationBridge;
pub use cache::{ReplyAction, ReplyActionCache};
pub use dispatch::{Carrier, Dispatcher, EventSink, NOTIFICATION_EVENT, OutgoingEvent};
pub use normalize::Normalizer;
pub use notification::{NotificationEvent, StatusNotification};
pub use payload::{Field, NotificationPayload, PayloadValue};
pub use platform::HostPlatform;
pub use reply::{ReplyInvoker, ReplyService};
pub use utils::errors::{HeraldError, HeraldErrorKind};
