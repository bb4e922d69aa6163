//! Mediator - メッセージを handler へ中継する dispatcher
//!
//! # 振る舞い
//! - **send**: 実行時の具体型で handler を一つ解決し、結果をそのまま返す
//! - **publish**: 登録済みの全 handler を並行実行し、失敗を全て集約する
//!
//! The mediator neither retries, logs, nor caches. Every failure reaches the
//! caller.

use std::any::{Any, type_name};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::anyhow;
use futures::FutureExt;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::domain::{HandlerFailure, MediatorError, PublishError};
use crate::ports::HandlerResolver;
use crate::typed::message::{AnyNotification, BoxedRequest, Notification, Request};
use crate::typed::registry::HandlerRegistry;

/// Mediator は resolver への参照だけを持つ
///
/// Cloning is cheap and every clone dispatches through the same resolver.
pub struct Mediator<S: ?Sized = HandlerRegistry> {
    resolver: Arc<S>,
}

impl<S: ?Sized> Clone for Mediator<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<S: HandlerResolver + ?Sized> Mediator<S> {
    pub fn new(resolver: Arc<S>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &S {
        &self.resolver
    }

    /// Send a request to its handler with a token that is never cancelled.
    pub async fn send<R: Request>(&self, request: R) -> Result<R::Response, MediatorError> {
        self.send_with(request, &CancellationToken::new()).await
    }

    pub async fn send_with<R: Request>(
        &self,
        request: R,
        cancel: &CancellationToken,
    ) -> Result<R::Response, MediatorError> {
        let boxed: BoxedRequest<R::Response> = Box::new(request);
        self.send_dyn(Some(boxed), cancel).await
    }

    /// Send a request whose concrete type is only known at runtime.
    ///
    /// `None` is rejected with `InvalidArgument` before any lookup.
    pub async fn send_dyn<O: Send + 'static>(
        &self,
        request: Option<BoxedRequest<O>>,
        cancel: &CancellationToken,
    ) -> Result<O, MediatorError> {
        let request = request.ok_or(MediatorError::InvalidArgument("request"))?;
        let key = request.message_key();
        let handler = self
            .resolver
            .resolve_one(&key)
            .ok_or(MediatorError::HandlerNotFound {
                request_type: key.name(),
            })?;

        let response = handler.handle_dyn(request.into_any(), cancel).await?;
        response
            .downcast::<O>()
            .map(|response| *response)
            .map_err(|_| MediatorError::TypeMismatch {
                handler: handler.handler_type(),
                expected: type_name::<O>(),
            })
    }

    /// Publish a notification to every handler with a token that is never
    /// cancelled.
    pub async fn publish<N: Notification>(&self, notification: N) -> Result<(), MediatorError> {
        self.publish_with(notification, &CancellationToken::new()).await
    }

    pub async fn publish_with<N: Notification>(
        &self,
        notification: N,
        cancel: &CancellationToken,
    ) -> Result<(), MediatorError> {
        let erased: &dyn AnyNotification = &notification;
        self.publish_dyn(Some(erased), cancel).await
    }

    /// Publish a notification whose concrete type is only known at runtime.
    ///
    /// All handlers run concurrently and all of them run to completion;
    /// the result is `Ok` only when every one succeeded. A handler that
    /// panics is recorded as a failure and does not stop the others.
    pub async fn publish_dyn(
        &self,
        notification: Option<&dyn AnyNotification>,
        cancel: &CancellationToken,
    ) -> Result<(), MediatorError> {
        let notification = notification.ok_or(MediatorError::InvalidArgument("notification"))?;
        let key = notification.message_key();
        let handlers = self.resolver.resolve_many(&key);
        if handlers.is_empty() {
            return Ok(());
        }

        let outcomes = join_all(handlers.iter().map(|handler| {
            AssertUnwindSafe(handler.handle_dyn(notification.as_any(), cancel))
                .catch_unwind()
                .map(|outcome| outcome.unwrap_or_else(|payload| Err(panicked(&*payload))))
        }))
        .await;

        let failures: Vec<HandlerFailure> = handlers
            .iter()
            .zip(outcomes)
            .filter_map(|(handler, outcome)| {
                outcome.err().map(|error| HandlerFailure {
                    handler: handler.handler_type(),
                    error,
                })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PublishError::new(key.name(), handlers.len(), failures).into())
        }
    }
}

fn panicked(payload: &(dyn Any + Send)) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string payload");
    anyhow!("handler panicked: {message}")
}
