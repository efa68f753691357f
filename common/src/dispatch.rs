use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::payload::{NotificationPayload, PayloadValue};
use crate::utils::errors::HeraldError;

/// Name of the event carrying notification changes.
pub const NOTIFICATION_EVENT: &str = "herald.notification.event";

/// Primitive value types an outgoing event can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Carrier {
    Bytes(Vec<u8>),
    Bool(bool),
    Int(i32),
    Long(i64),
    Str(String),
}
impl Carrier {
    /// Narrowest carrier for `value`, `None` when it cannot be carried.
    pub fn for_value(value: &PayloadValue) -> Option<Self> {
        match value {
            PayloadValue::Bytes(bytes) => Some(Self::Bytes(bytes.clone())),
            PayloadValue::Bool(b) => Some(Self::Bool(*b)),
            PayloadValue::Int(i) => Some(Self::Int(*i)),
            PayloadValue::Long(l) => Some(Self::Long(*l)),
            PayloadValue::Str(s) => Some(Self::Str(s.clone())),
            PayloadValue::Double(_) | PayloadValue::Absent => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingEvent {
    pub name: String,
    pub extras: BTreeMap<String, Carrier>,
}
impl OutgoingEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extras: BTreeMap::new(),
        }
    }
    pub fn get(&self, key: &str) -> Option<&Carrier> {
        self.extras.get(key)
    }
}

/// Receiver side of the named event channel.
pub trait EventSink: Send + Sync {
    fn deliver(&self, event: OutgoingEvent) -> Result<(), HeraldError>;
}
impl EventSink for broadcast::Sender<OutgoingEvent> {
    fn deliver(&self, event: OutgoingEvent) -> Result<(), HeraldError> {
        // No subscribers is a normal state, the event is simply dropped
        if let Err(broadcast::error::SendError(event)) = self.send(event) {
            trace!(event = %event.name, "no subscribers for event");
        }
        Ok(())
    }
}

/// Relays payloads to listeners under a fixed event name.
pub struct Dispatcher<S> {
    sink: S,
    event_name: String,
}
impl<S: EventSink> Dispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self::with_event_name(sink, NOTIFICATION_EVENT)
    }

    pub fn with_event_name(sink: S, event_name: impl Into<String>) -> Self {
        Self {
            sink,
            event_name: event_name.into(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Builds the outgoing event for `payload`.
    ///
    /// Absent and floating point values have no carrier and are left out;
    /// every other field is kept.
    pub fn encode(&self, payload: &NotificationPayload) -> OutgoingEvent {
        let mut event = OutgoingEvent::new(self.event_name.as_str());
        for (field, value) in payload.iter() {
            match Carrier::for_value(value) {
                Some(carrier) => {
                    event.extras.insert(field.as_ref().to_string(), carrier);
                }
                None => debug!(field = field.as_ref(), "field has no carrier, omitted"),
            }
        }
        event
    }

    pub fn dispatch(&self, payload: &NotificationPayload) -> Result<(), HeraldError> {
        self.sink.deliver(self.encode(payload))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::payload::Field;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<OutgoingEvent>>);
    impl EventSink for Recorder {
        fn deliver(&self, event: OutgoingEvent) -> Result<(), HeraldError> {
            self.0.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn payload() -> NotificationPayload {
        let mut payload = NotificationPayload::new();
        payload.insert(Field::Id, 3i32);
        payload.insert(Field::PackageName, "org.example.chat".to_string());
        payload.insert(Field::CanReply, true);
        payload.insert(Field::AppIcon, vec![1u8, 2, 3]);
        payload.insert(Field::PostedAtEpochMs, 1_700_000_000_000i64);
        payload
    }

    #[test]
    fn every_carrier_type_is_encoded() {
        let dispatcher = Dispatcher::new(Recorder::default());
        let event = dispatcher.encode(&payload());

        assert_eq!(event.name, NOTIFICATION_EVENT);
        assert_eq!(event.get("id"), Some(&Carrier::Int(3)));
        assert_eq!(
            event.get("packageName"),
            Some(&Carrier::Str("org.example.chat".into()))
        );
        assert_eq!(event.get("canReply"), Some(&Carrier::Bool(true)));
        assert_eq!(event.get("appIcon"), Some(&Carrier::Bytes(vec![1, 2, 3])));
        assert_eq!(
            event.get("postedAtEpochMs"),
            Some(&Carrier::Long(1_700_000_000_000))
        );
    }

    #[test]
    fn unrecognized_and_absent_values_are_omitted() {
        let dispatcher = Dispatcher::new(Recorder::default());
        let mut payload = payload();
        payload.insert(Field::LargeIcon, PayloadValue::Double(0.5));
        payload.insert(Field::Title, None::<String>);

        dispatcher.dispatch(&payload).unwrap();

        let events = dispatcher.sink().0.lock().unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert!(event.get("largeIcon").is_none());
        assert!(event.get("title").is_none());
        assert_eq!(event.extras.len(), 5);
    }

    #[test]
    fn one_event_per_dispatch_in_order() {
        let dispatcher = Dispatcher::with_event_name(Recorder::default(), "custom.event");
        for id in 0..3i32 {
            let mut payload = NotificationPayload::new();
            payload.insert(Field::Id, id);
            dispatcher.dispatch(&payload).unwrap();
        }

        let events = dispatcher.sink().0.lock().unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.get("id").cloned()).collect();
        assert_eq!(
            ids,
            [Some(Carrier::Int(0)), Some(Carrier::Int(1)), Some(Carrier::Int(2))]
        );
        assert!(events.iter().all(|e| e.name == "custom.event"));
    }

    #[tokio::test]
    async fn broadcast_sink_reaches_subscribers() {
        let (tx, mut rx) = broadcast::channel(4);
        let dispatcher = Dispatcher::new(tx);
        dispatcher.dispatch(&payload()).unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.get("id"), Some(&Carrier::Int(3)));
    }

    #[test]
    fn broadcast_without_subscribers_is_not_an_error() {
        let (tx, rx) = broadcast::channel::<OutgoingEvent>(4);
        drop(rx);
        assert!(Dispatcher::new(tx).dispatch(&payload()).is_ok());
    }
}
