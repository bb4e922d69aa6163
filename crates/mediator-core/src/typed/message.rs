//! Message contracts - Request と Notification
//!
//! # 二層構造
//! - **表層（Typed）**: `Request`, `Notification` - 呼び出し側が実装する trait
//! - **内部（Dyn）**: `AnyRequest`, `AnyNotification` - 具体型を知らずに運べる object-safe 版
//!
//! Dispatch always keys on the concrete type behind the value (`MessageKey`),
//! never on the static type used at the call site.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Request は結果型をちょうど一つ持つメッセージ
///
/// # 使用例
/// ```ignore
/// struct GetUserById {
///     user_id: i32,
/// }
///
/// impl Request for GetUserById {
///     type Response = UserDto;
/// }
/// ```
pub trait Request: Send + 'static {
    type Response: Send + 'static;
}

/// Notification は結果を持たないメッセージ
///
/// 複数の handler から同時に参照されるため `Sync` も要求します。
pub trait Notification: Send + Sync + 'static {}

/// Runtime identity of a message type.
///
/// Equality and hashing use only the `TypeId`; the name is carried for
/// diagnostics.
#[derive(Clone, Copy)]
pub struct MessageKey {
    id: TypeId,
    name: &'static str,
}

impl MessageKey {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for MessageKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageKey {}

impl Hash for MessageKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageKey").field(&self.name).finish()
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// AnyRequest は結果型だけを残して具体型を消した Request
///
/// Every `Request` implements it through the blanket impl below, so a
/// `BoxedRequest<O>` always reports the key of the value it was built from.
pub trait AnyRequest: Send {
    type Response: Send + 'static;

    fn message_key(&self) -> MessageKey;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send>;
}

impl<R: Request> AnyRequest for R {
    type Response = R::Response;

    fn message_key(&self) -> MessageKey {
        MessageKey::of::<R>()
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send> {
        self
    }
}

/// A request travelling through the generic channel, typed only by its result.
pub type BoxedRequest<O> = Box<dyn AnyRequest<Response = O>>;

/// AnyNotification は具体型を消した Notification
pub trait AnyNotification: Send + Sync {
    fn message_key(&self) -> MessageKey;

    fn as_any(&self) -> &(dyn Any + Send + Sync);
}

impl<N: Notification> AnyNotification for N {
    fn message_key(&self) -> MessageKey {
        MessageKey::of::<N>()
    }

    fn as_any(&self) -> &(dyn Any + Send + Sync) {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;

    impl Request for Ping {
        type Response = &'static str;
    }

    struct Pong;

    impl Request for Pong {
        type Response = &'static str;
    }

    struct Joined;

    impl Notification for Joined {}

    #[test]
    fn boxed_request_reports_concrete_key() {
        let boxed: BoxedRequest<&'static str> = Box::new(Pong);
        assert_eq!(boxed.message_key(), MessageKey::of::<Pong>());
        assert_ne!(boxed.message_key(), MessageKey::of::<Ping>());
    }

    #[test]
    fn into_any_keeps_the_value() {
        let boxed: BoxedRequest<&'static str> = Box::new(Ping);
        assert!(boxed.into_any().downcast::<Ping>().is_ok());
    }

    #[test]
    fn shared_notification_reports_concrete_key() {
        let joined = Joined;
        let erased: &dyn AnyNotification = &joined;
        assert_eq!(erased.message_key(), MessageKey::of::<Joined>());
        assert!(erased.as_any().downcast_ref::<Joined>().is_some());
    }

    #[test]
    fn key_display_uses_type_name() {
        let key = MessageKey::of::<Ping>();
        assert!(key.to_string().ends_with("Ping"));
    }
}
