use serde::{Deserialize, Serialize};

use crate::dispatch::OutgoingEvent;
use crate::notification::NotificationId;
use crate::payload::NotificationPayload;
use crate::utils::errors::HeraldError;

pub struct SocketData;
impl SocketData {
    pub const SOCKET_ADDR: &'static str = "/tmp/herald.sock";
    /// Largest frame either side accepts.
    pub const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum Request {
    Ping,
    ActiveNotifications,
    /// Switches the connection to a stream of [`Response::Event`].
    Subscribe,
    Reply {
        id: NotificationId,
        message: String,
    },
    /// Closes a notification as if the user dismissed it.
    Dismiss {
        id: NotificationId,
    },
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum Response {
    Ok,
    Error(String),
    Pong,
    Notifications(Vec<NotificationPayload>),
    /// Whether a cached reply action existed and was invoked.
    Replied(bool),
    Event(OutgoingEvent),
}

pub trait IntoResponse {
    fn into_response(self) -> Response;
}
impl IntoResponse for Result<bool, HeraldError> {
    fn into_response(self) -> Response {
        match self {
            Ok(sent) => Response::Replied(sent),
            Err(e) => Response::Error(e.message),
        }
    }
}
impl IntoResponse for Result<(), HeraldError> {
    fn into_response(self) -> Response {
        match self {
            Ok(_) => Response::Ok,
            Err(e) => Response::Error(e.message),
        }
    }
}
