use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::cache::{ReplyAction, ReplyActionCache};
use crate::notification::NotificationId;
use crate::utils::errors::HeraldError;

/// Delivers reply text to the application that owns a notification.
#[async_trait]
pub trait ReplyInvoker: Send + Sync {
    async fn invoke(
        &self,
        id: NotificationId,
        action: &ReplyAction,
        message: &str,
    ) -> Result<(), HeraldError>;
}

pub struct ReplyService<R> {
    cache: Arc<ReplyActionCache>,
    invoker: R,
}
impl<R: ReplyInvoker> ReplyService<R> {
    pub fn new(cache: Arc<ReplyActionCache>, invoker: R) -> Self {
        Self { cache, invoker }
    }

    /// Sends `message` through the cached reply action of `id`.
    ///
    /// Returns `Ok(false)` when no reply action is cached for the id. The
    /// action may be stale if the notification was dismissed after caching.
    pub async fn send_reply(&self, id: NotificationId, message: &str) -> Result<bool, HeraldError> {
        let Some(action) = self.cache.get(id) else {
            debug!(id, "no reply action cached");
            return Ok(false);
        };
        self.invoker.invoke(id, &action, message).await?;
        info!(id, package = %action.package_name, "reply sent");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::herald_err;
    use crate::utils::errors::HeraldErrorKind;

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<(NotificationId, String, String)>>,
        fail: bool,
    }
    #[async_trait]
    impl ReplyInvoker for Outbox {
        async fn invoke(
            &self,
            id: NotificationId,
            action: &ReplyAction,
            message: &str,
        ) -> Result<(), HeraldError> {
            if self.fail {
                return Err(herald_err!(HeraldErrorKind::ReplySend, "target gone"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((id, action.target.clone(), message.to_string()));
            Ok(())
        }
    }

    fn cache_with_action(id: NotificationId) -> Arc<ReplyActionCache> {
        let cache = Arc::new(ReplyActionCache::default());
        cache.put(
            id,
            ReplyAction {
                package_name: "org.example.chat".into(),
                target: "inline-reply".into(),
                label: "Reply".into(),
                input_hint: None,
            },
        );
        cache
    }

    #[tokio::test]
    async fn sends_through_cached_action() {
        let service = ReplyService::new(cache_with_action(7), Outbox::default());

        assert!(service.send_reply(7, "on my way").await.unwrap());
        assert_eq!(
            *service.invoker.sent.lock().unwrap(),
            [(7, "inline-reply".to_string(), "on my way".to_string())]
        );
    }

    #[tokio::test]
    async fn cache_miss_is_not_an_error() {
        let service = ReplyService::new(cache_with_action(7), Outbox::default());

        assert!(!service.send_reply(8, "hello").await.unwrap());
        assert!(service.invoker.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invoker_errors_propagate() {
        let outbox = Outbox {
            fail: true,
            ..Default::default()
        };
        let service = ReplyService::new(cache_with_action(7), outbox);

        let err = service.send_reply(7, "hello").await.unwrap_err();
        assert_eq!(err.kind, HeraldErrorKind::ReplySend);
    }
}
