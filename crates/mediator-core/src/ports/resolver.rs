//! HandlerResolver port - message 型から handler を解決する
//!
//! # v1 デフォルト
//! - `HandlerRegistry`: 起動時に一度だけ構築される対応表

use std::sync::Arc;

use crate::typed::handler::{DynNotificationHandler, DynRequestHandler};
use crate::typed::message::MessageKey;

/// HandlerResolver は `Mediator` が依存する唯一の抽象
///
/// Implementations are read-only once dispatch starts and must be safe to
/// call from many tasks at once.
pub trait HandlerResolver: Send + Sync {
    /// The single handler for a request type, if one is bound.
    fn resolve_one(&self, key: &MessageKey) -> Option<Arc<dyn DynRequestHandler>>;

    /// Every handler bound to a notification type; empty is a valid answer.
    fn resolve_many(&self, key: &MessageKey) -> Vec<Arc<dyn DynNotificationHandler>>;
}
