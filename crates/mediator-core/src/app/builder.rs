//! MediatorBuilder - handler の一括登録と Mediator の構築
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 登録フェーズと dispatch フェーズの分離
//! - Handler の寿命: `*_handler` は singleton、`*_handler_with` は dispatch ごとに生成

use std::any::type_name;
use std::sync::Arc;

use tracing::{debug, info};

use super::mediator::Mediator;
use crate::typed::handler::{FactoryHandler, NotificationHandler, RequestHandler, TypedHandler};
use crate::typed::message::{MessageKey, Notification, Request};
use crate::typed::registry::{HandlerRegistry, RegistryError};

/// HandlerModule はまとめて登録される handler の集まり
///
/// Stands in for scanning: a crate exposes one module per feature and the
/// host installs them all before building.
///
/// # 使用例
/// ```ignore
/// struct UsersModule;
///
/// impl HandlerModule for UsersModule {
///     fn register(&self, builder: MediatorBuilder) -> Result<MediatorBuilder, RegistryError> {
///         builder.request_handler::<GetUserById, _>(GetUserByIdHandler)
///     }
/// }
/// ```
pub trait HandlerModule {
    fn register(&self, builder: MediatorBuilder) -> Result<MediatorBuilder, RegistryError>;
}

/// MediatorBuilder は registry を組み立てて Mediator を生成
///
/// # 使用例
/// ```ignore
/// let mediator = MediatorBuilder::new()
///     .request_handler::<GetUserById, _>(GetUserByIdHandler)?
///     .notification_handler::<UserSaved, _>(AuditWriter::default())?
///     .expect_request::<GetUserById>()
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - 同じ request 型への二重登録は `RegistryError::AmbiguousRegistration`
/// - expect_request() で期待される request 型を登録
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
pub struct MediatorBuilder {
    registry: HandlerRegistry,
    expected_requests: Vec<MessageKey>,
}

/// BuildError は Mediator 構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing request handlers: {0:?}. These request types were expected but not registered.")]
    MissingHandlers(Vec<&'static str>),
}

impl MediatorBuilder {
    pub fn new() -> Self {
        Self {
            registry: HandlerRegistry::new(),
            expected_requests: Vec::new(),
        }
    }

    /// Bind the one handler for request type `R`.
    pub fn request_handler<R, H>(mut self, handler: H) -> Result<Self, RegistryError>
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        self.registry
            .insert_request(Arc::new(TypedHandler::<R, H>::new(handler)))?;
        debug!(
            request = type_name::<R>(),
            handler = type_name::<H>(),
            "registered request handler"
        );
        Ok(self)
    }

    /// Add a handler for notification type `N`; any number may be added.
    ///
    /// Never fails today. It returns `Result` so modules can chain it with
    /// `?` alongside `request_handler`.
    pub fn notification_handler<N, H>(mut self, handler: H) -> Result<Self, RegistryError>
    where
        N: Notification,
        H: NotificationHandler<N> + 'static,
    {
        self.registry
            .insert_notification(Arc::new(TypedHandler::<N, H>::new(handler)));
        debug!(
            notification = type_name::<N>(),
            handler = type_name::<H>(),
            "registered notification handler"
        );
        Ok(self)
    }

    /// Bind request type `R` to a factory; every `send` gets a new handler.
    pub fn request_handler_with<R, H>(
        mut self,
        factory: impl Fn() -> H + Send + Sync + 'static,
    ) -> Result<Self, RegistryError>
    where
        R: Request,
        H: RequestHandler<R> + 'static,
    {
        self.registry
            .insert_request(Arc::new(FactoryHandler::<R, H, _>::new(factory)))?;
        debug!(
            request = type_name::<R>(),
            handler = type_name::<H>(),
            lifetime = "transient",
            "registered request handler"
        );
        Ok(self)
    }

    /// Add a notification handler built fresh for every `publish`.
    pub fn notification_handler_with<N, H>(
        mut self,
        factory: impl Fn() -> H + Send + Sync + 'static,
    ) -> Result<Self, RegistryError>
    where
        N: Notification,
        H: NotificationHandler<N> + 'static,
    {
        self.registry
            .insert_notification(Arc::new(FactoryHandler::<N, H, _>::new(factory)));
        debug!(
            notification = type_name::<N>(),
            handler = type_name::<H>(),
            lifetime = "transient",
            "registered notification handler"
        );
        Ok(self)
    }

    pub fn install<M: HandlerModule + ?Sized>(self, module: &M) -> Result<Self, RegistryError> {
        module.register(self)
    }

    /// Require a handler for `R` to be present when `build()` runs.
    pub fn expect_request<R: Request>(mut self) -> Self {
        self.expected_requests.push(MessageKey::of::<R>());
        self
    }

    /// Freeze the registry and hand it to a `Mediator`.
    pub fn build(self) -> Result<Mediator, BuildError> {
        let registry = self.build_registry()?;
        Ok(Mediator::new(Arc::new(registry)))
    }

    /// Freeze the registry without wrapping it, for callers that bring
    /// their own resolver around it.
    pub fn build_registry(self) -> Result<HandlerRegistry, BuildError> {
        let missing: Vec<&'static str> = self
            .expected_requests
            .iter()
            .filter(|key| self.registry.request_handler(key).is_none())
            .map(MessageKey::name)
            .collect();
        if !missing.is_empty() {
            return Err(BuildError::MissingHandlers(missing));
        }

        info!(
            requests = self.registry.request_types().len(),
            notifications = self.registry.notification_types().len(),
            bindings = self.registry.len(),
            "handler registry frozen"
        );
        Ok(self.registry)
    }
}

impl Default for MediatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    struct Ping;

    impl Request for Ping {
        type Response = ();
    }

    struct Pong;

    impl Request for Pong {
        type Response = ();
    }

    struct Seen;

    impl Notification for Seen {}

    struct PingHandler;

    #[async_trait]
    impl RequestHandler<Ping> for PingHandler {
        async fn handle(&self, _request: Ping, _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct SeenHandler;

    #[async_trait]
    impl NotificationHandler<Seen> for SeenHandler {
        async fn handle(&self, _notification: &Seen, _cancel: &CancellationToken) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct PingModule;

    impl HandlerModule for PingModule {
        fn register(&self, builder: MediatorBuilder) -> Result<MediatorBuilder, RegistryError> {
            builder
                .request_handler::<Ping, _>(PingHandler)?
                .notification_handler::<Seen, _>(SeenHandler)
        }
    }

    #[test]
    fn test_build_success() {
        let mediator = MediatorBuilder::new()
            .request_handler::<Ping, _>(PingHandler)
            .unwrap()
            .expect_request::<Ping>()
            .build();
        assert!(mediator.is_ok());
    }

    #[test]
    fn test_build_missing_request_types() {
        let result = MediatorBuilder::new()
            .request_handler::<Ping, _>(PingHandler)
            .unwrap()
            .expect_request::<Ping>()
            .expect_request::<Pong>()
            .build();
        assert!(matches!(
            result,
            Err(BuildError::MissingHandlers(missing)) if missing == vec![type_name::<Pong>()]
        ));
    }

    #[test]
    fn test_duplicate_request_handler_fails_fast() {
        let result = MediatorBuilder::new()
            .request_handler::<Ping, _>(PingHandler)
            .unwrap()
            .request_handler::<Ping, _>(PingHandler);
        assert!(matches!(result, Err(RegistryError::AmbiguousRegistration { .. })));
    }

    #[test]
    fn test_install_module() {
        let registry = MediatorBuilder::new()
            .install(&PingModule)
            .unwrap()
            .notification_handler::<Seen, _>(SeenHandler)
            .unwrap()
            .build_registry()
            .unwrap();

        assert!(registry.contains_request::<Ping>());
        assert_eq!(registry.notification_handler_count::<Seen>(), 2);
    }

    #[test]
    fn test_installing_module_twice_is_ambiguous() {
        let result = MediatorBuilder::new()
            .install(&PingModule)
            .and_then(|b| b.install(&PingModule));
        assert!(result.is_err());
    }

    #[test]
    fn test_factory_and_instance_registrations_are_ambiguous() {
        let result = MediatorBuilder::new()
            .request_handler_with::<Ping, _>(|| PingHandler)
            .unwrap()
            .request_handler::<Ping, _>(PingHandler);
        assert!(matches!(result, Err(RegistryError::AmbiguousRegistration { .. })));
    }

    #[test]
    fn test_factory_notification_handlers_accumulate() {
        let registry = MediatorBuilder::new()
            .notification_handler_with::<Seen, _>(|| SeenHandler)
            .unwrap()
            .notification_handler::<Seen, _>(SeenHandler)
            .unwrap()
            .build_registry()
            .unwrap();
        assert_eq!(registry.notification_handler_count::<Seen>(), 2);
    }
}
