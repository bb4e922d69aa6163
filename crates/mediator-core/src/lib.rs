//! mediator-core
//!
//! In-process mediator: routes typed requests to exactly one handler and
//! typed notifications to every handler registered for them.
//!
//! # モジュール構成
//! - **typed**: メッセージと Handler の契約（Request, Notification, RequestHandler, NotificationHandler, HandlerRegistry）
//! - **ports**: dispatcher が依存する抽象（HandlerResolver）
//! - **app**: 登録と dispatch（MediatorBuilder, Mediator）
//! - **domain**: エラー分類（MediatorError, PublishError）
//!
//! # 使用例
//! ```ignore
//! let mediator = MediatorBuilder::new()
//!     .request_handler::<GetUserById, _>(GetUserByIdHandler)?
//!     .build()?;
//!
//! let user = mediator.send(GetUserById { user_id: 7 }).await?;
//! ```

pub mod app;
pub mod domain;
pub mod ports;
pub mod typed;

pub use app::{BuildError, HandlerModule, Mediator, MediatorBuilder};
pub use domain::{HandlerFailure, MediatorError, PublishError};
pub use ports::HandlerResolver;
pub use typed::{
    AnyNotification, AnyRequest, BoxedRequest, HandlerRegistry, MessageKey, Notification,
    NotificationHandler, RegistryError, Request, RequestHandler,
};
pub use tokio_util::sync::CancellationToken;
