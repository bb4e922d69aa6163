//! HandlerRegistry - Handler の登録と管理
//!
//! # 学習ポイント
//! - `TypeId` をキーにした型消去された trait object の管理
//! - request は 1:1、notification は 1:N
//! - 構築後は読み取り専用（ロック不要）
//!
//! Insertion is crate-private: only `MediatorBuilder` writes, and it gives
//! the registry away frozen inside an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::{DynNotificationHandler, DynRequestHandler};
use super::message::{MessageKey, Notification, Request};
use crate::ports::HandlerResolver;

/// HandlerRegistry は message 型から handler への対応表
///
/// # 内部実装
/// - `HashMap<MessageKey, Arc<dyn DynRequestHandler>>` で request を管理
/// - `HashMap<MessageKey, Vec<Arc<dyn DynNotificationHandler>>>` で notification を管理
///   （登録順を保持）
#[derive(Default)]
pub struct HandlerRegistry {
    requests: HashMap<MessageKey, Arc<dyn DynRequestHandler>>,
    notifications: HashMap<MessageKey, Vec<Arc<dyn DynNotificationHandler>>>,
}

/// RegistryError は登録時のエラー
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("ambiguous registration for {request_type}: {existing} is already registered, rejected {rejected}")]
    AmbiguousRegistration {
        request_type: &'static str,
        existing: &'static str,
        rejected: &'static str,
    },
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_request(
        &mut self,
        handler: Arc<dyn DynRequestHandler>,
    ) -> Result<(), RegistryError> {
        let key = handler.request_type();
        if let Some(existing) = self.requests.get(&key) {
            return Err(RegistryError::AmbiguousRegistration {
                request_type: key.name(),
                existing: existing.handler_type(),
                rejected: handler.handler_type(),
            });
        }
        self.requests.insert(key, handler);
        Ok(())
    }

    pub(crate) fn insert_notification(&mut self, handler: Arc<dyn DynNotificationHandler>) {
        self.notifications
            .entry(handler.notification_type())
            .or_default()
            .push(handler);
    }

    pub fn request_handler(&self, key: &MessageKey) -> Option<&Arc<dyn DynRequestHandler>> {
        self.requests.get(key)
    }

    pub fn notification_handlers(&self, key: &MessageKey) -> &[Arc<dyn DynNotificationHandler>] {
        self.notifications.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains_request<R: Request>(&self) -> bool {
        self.requests.contains_key(&MessageKey::of::<R>())
    }

    pub fn notification_handler_count<N: Notification>(&self) -> usize {
        self.notification_handlers(&MessageKey::of::<N>()).len()
    }

    pub fn request_types(&self) -> Vec<&'static str> {
        self.requests.keys().map(MessageKey::name).collect()
    }

    pub fn notification_types(&self) -> Vec<&'static str> {
        self.notifications.keys().map(MessageKey::name).collect()
    }

    /// Total number of bindings, counting each notification handler.
    pub fn len(&self) -> usize {
        self.requests.len() + self.notifications.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HandlerResolver for HandlerRegistry {
    fn resolve_one(&self, key: &MessageKey) -> Option<Arc<dyn DynRequestHandler>> {
        self.request_handler(key).cloned()
    }

    fn resolve_many(&self, key: &MessageKey) -> Vec<Arc<dyn DynNotificationHandler>> {
        self.notification_handlers(key).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::handler::{NotificationHandler, RequestHandler, TypedHandler};
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    struct Lookup;

    impl Request for Lookup {
        type Response = u32;
    }

    struct Saved;

    impl Notification for Saved {}

    struct LookupHandler;

    #[async_trait]
    impl RequestHandler<Lookup> for LookupHandler {
        async fn handle(&self, _request: Lookup, _cancel: &CancellationToken) -> anyhow::Result<u32> {
            Ok(1)
        }
    }

    struct OtherLookupHandler;

    #[async_trait]
    impl RequestHandler<Lookup> for OtherLookupHandler {
        async fn handle(&self, _request: Lookup, _cancel: &CancellationToken) -> anyhow::Result<u32> {
            Ok(2)
        }
    }

    struct SavedHandler;

    #[async_trait]
    impl NotificationHandler<Saved> for SavedHandler {
        async fn handle(&self, _notification: &Saved, _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn lookup_handler<H: RequestHandler<Lookup> + 'static>(h: H) -> Arc<dyn DynRequestHandler> {
        Arc::new(TypedHandler::<Lookup, H>::new(h))
    }

    fn saved_handler() -> Arc<dyn DynNotificationHandler> {
        Arc::new(TypedHandler::<Saved, _>::new(SavedHandler))
    }

    #[test]
    fn test_insert_and_resolve_request() {
        let mut registry = HandlerRegistry::new();
        registry.insert_request(lookup_handler(LookupHandler)).unwrap();

        assert!(registry.contains_request::<Lookup>());
        let resolved = registry.resolve_one(&MessageKey::of::<Lookup>()).unwrap();
        assert!(resolved.handler_type().ends_with("LookupHandler"));
    }

    #[test]
    fn test_second_request_handler_is_ambiguous() {
        let mut registry = HandlerRegistry::new();
        registry.insert_request(lookup_handler(LookupHandler)).unwrap();
        let result = registry.insert_request(lookup_handler(OtherLookupHandler));

        assert!(matches!(
            result,
            Err(RegistryError::AmbiguousRegistration { rejected, .. }) if rejected.ends_with("OtherLookupHandler")
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_notification_handlers_accumulate() {
        let mut registry = HandlerRegistry::new();
        registry.insert_notification(saved_handler());
        registry.insert_notification(saved_handler());

        assert_eq!(registry.notification_handler_count::<Saved>(), 2);
        assert_eq!(registry.resolve_many(&MessageKey::of::<Saved>()).len(), 2);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unknown_types_resolve_to_nothing() {
        let registry = HandlerRegistry::new();

        assert!(registry.is_empty());
        assert!(registry.resolve_one(&MessageKey::of::<Lookup>()).is_none());
        assert!(registry.resolve_many(&MessageKey::of::<Saved>()).is_empty());
    }

    #[test]
    fn test_registered_type_names() {
        let mut registry = HandlerRegistry::new();
        registry.insert_request(lookup_handler(LookupHandler)).unwrap();
        registry.insert_notification(saved_handler());

        assert_eq!(registry.request_types(), vec![std::any::type_name::<Lookup>()]);
        assert_eq!(registry.notification_types(), vec![std::any::type_name::<Saved>()]);
    }
}
