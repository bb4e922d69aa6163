//! Handler traits - メッセージを処理する Handler の定義
//!
//! # 学習ポイント
//! - ジェネリック trait (`RequestHandler<R>`, `NotificationHandler<N>`)
//! - Object-safe trait (`DynRequestHandler`, `DynNotificationHandler`)
//! - Type erasure パターン (`TypedHandler<M, H>` → Dyn*Handler)
//! - Handler の寿命: `TypedHandler` は一つのインスタンスを共有（singleton）、
//!   `FactoryHandler` は dispatch ごとに新しいインスタンスを生成（transient）

use std::any::{Any, type_name};
use std::marker::PhantomData;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::message::{MessageKey, Notification, Request};
use crate::domain::MediatorError;

/// RequestHandler は Request を一つ受け取り Response を返す
///
/// # 使用例
/// ```ignore
/// struct GetUserByIdHandler;
///
/// #[async_trait]
/// impl RequestHandler<GetUserById> for GetUserByIdHandler {
///     async fn handle(&self, request: GetUserById, _cancel: &CancellationToken) -> anyhow::Result<UserDto> {
///         Ok(UserDto { id: request.user_id, name: "Majid".to_string() })
///     }
/// }
/// ```
///
/// The token is the caller's; a handler that sees it cancelled should stop
/// its own work and return.
#[async_trait]
pub trait RequestHandler<R: Request>: Send + Sync {
    async fn handle(&self, request: R, cancel: &CancellationToken) -> anyhow::Result<R::Response>;
}

/// NotificationHandler は Notification を受け取り完了するだけ
///
/// Several handlers for the same notification run concurrently and see the
/// same value, so they only get a shared borrow of it.
#[async_trait]
pub trait NotificationHandler<N: Notification>: Send + Sync {
    async fn handle(&self, notification: &N, cancel: &CancellationToken) -> anyhow::Result<()>;
}

/// DynRequestHandler は object-safe な RequestHandler
///
/// `TypedHandler<R, H>` を経由して `Arc<dyn DynRequestHandler>` として
/// registry に格納されます。
#[async_trait]
pub trait DynRequestHandler: Send + Sync {
    async fn handle_dyn(
        &self,
        request: Box<dyn Any + Send>,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Any + Send>, MediatorError>;

    fn request_type(&self) -> MessageKey;

    fn handler_type(&self) -> &'static str;
}

/// DynNotificationHandler は object-safe な NotificationHandler
#[async_trait]
pub trait DynNotificationHandler: Send + Sync {
    async fn handle_dyn(
        &self,
        notification: &(dyn Any + Send + Sync),
        cancel: &CancellationToken,
    ) -> anyhow::Result<()>;

    fn notification_type(&self) -> MessageKey;

    fn handler_type(&self) -> &'static str;
}

/// Binds a concrete handler to the message type it was registered for.
pub struct TypedHandler<M, H> {
    handler: H,
    _marker: PhantomData<fn(M)>,
}

impl<M, H> TypedHandler<M, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<R, H> DynRequestHandler for TypedHandler<R, H>
where
    R: Request,
    H: RequestHandler<R> + 'static,
{
    async fn handle_dyn(
        &self,
        request: Box<dyn Any + Send>,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Any + Send>, MediatorError> {
        let request = request
            .downcast::<R>()
            .map_err(|_| MediatorError::TypeMismatch {
                handler: type_name::<H>(),
                expected: type_name::<R>(),
            })?;

        let response = self
            .handler
            .handle(*request, cancel)
            .await
            .map_err(MediatorError::Handler)?;
        Ok(Box::new(response))
    }

    fn request_type(&self) -> MessageKey {
        MessageKey::of::<R>()
    }

    fn handler_type(&self) -> &'static str {
        type_name::<H>()
    }
}

#[async_trait]
impl<N, H> DynNotificationHandler for TypedHandler<N, H>
where
    N: Notification,
    H: NotificationHandler<N> + 'static,
{
    async fn handle_dyn(
        &self,
        notification: &(dyn Any + Send + Sync),
        cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        let Some(notification) = notification.downcast_ref::<N>() else {
            return Err(MediatorError::TypeMismatch {
                handler: type_name::<H>(),
                expected: type_name::<N>(),
            }
            .into());
        };
        self.handler.handle(notification, cancel).await
    }

    fn notification_type(&self) -> MessageKey {
        MessageKey::of::<N>()
    }

    fn handler_type(&self) -> &'static str {
        type_name::<H>()
    }
}

/// Builds a fresh handler from `factory` for every dispatch.
///
/// No state survives from one call to the next.
pub struct FactoryHandler<M, H, F> {
    factory: F,
    _marker: PhantomData<fn(M) -> H>,
}

impl<M, H, F> FactoryHandler<M, H, F>
where
    F: Fn() -> H,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<R, H, F> DynRequestHandler for FactoryHandler<R, H, F>
where
    R: Request,
    H: RequestHandler<R> + 'static,
    F: Fn() -> H + Send + Sync + 'static,
{
    async fn handle_dyn(
        &self,
        request: Box<dyn Any + Send>,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Any + Send>, MediatorError> {
        let request = request
            .downcast::<R>()
            .map_err(|_| MediatorError::TypeMismatch {
                handler: type_name::<H>(),
                expected: type_name::<R>(),
            })?;

        let handler = (self.factory)();
        let response = handler
            .handle(*request, cancel)
            .await
            .map_err(MediatorError::Handler)?;
        Ok(Box::new(response))
    }

    fn request_type(&self) -> MessageKey {
        MessageKey::of::<R>()
    }

    fn handler_type(&self) -> &'static str {
        type_name::<H>()
    }
}

#[async_trait]
impl<N, H, F> DynNotificationHandler for FactoryHandler<N, H, F>
where
    N: Notification,
    H: NotificationHandler<N> + 'static,
    F: Fn() -> H + Send + Sync + 'static,
{
    async fn handle_dyn(
        &self,
        notification: &(dyn Any + Send + Sync),
        cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        let Some(notification) = notification.downcast_ref::<N>() else {
            return Err(MediatorError::TypeMismatch {
                handler: type_name::<H>(),
                expected: type_name::<N>(),
            }
            .into());
        };
        let handler = (self.factory)();
        handler.handle(notification, cancel).await
    }

    fn notification_type(&self) -> MessageKey {
        MessageKey::of::<N>()
    }

    fn handler_type(&self) -> &'static str {
        type_name::<H>()
    }
}
