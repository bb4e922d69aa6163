//! Typed - 型付きメッセージ API
//!
//! このモジュールはメッセージ型と Handler の対応付けを静的に保証します。
//!
//! # 二層構造
//! - **表層（Typed）**: `Request`, `Notification`, `RequestHandler<R>`, `NotificationHandler<N>` - 型安全
//! - **内部（Dyn）**: `DynRequestHandler`, `DynNotificationHandler` - object-safe, type erasure

pub mod handler;
pub mod message;
pub mod registry;

pub use self::handler::{
    DynNotificationHandler, DynRequestHandler, FactoryHandler, NotificationHandler, RequestHandler,
    TypedHandler,
};
pub use self::message::{
    AnyNotification, AnyRequest, BoxedRequest, MessageKey, Notification, Request,
};
pub use self::registry::{HandlerRegistry, RegistryError};
