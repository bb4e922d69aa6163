//! Errors - dispatch 時のエラー型と分類
//!
//! # 分類
//! - InvalidArgument: メッセージが渡されなかった（resolve 前に拒否）
//! - HandlerNotFound: request 型に handler が未登録（設定の不備）
//! - Handler: handler 自身の失敗（そのまま中継）
//! - Publish: notification handler の失敗の集約
//!
//! Registration-time failures live next to the registry and builder
//! (`RegistryError`, `BuildError`); they never surface from dispatch.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediatorError {
    #[error("invalid argument: {0} must be present")]
    InvalidArgument(&'static str),

    #[error("no handler registered for {request_type}")]
    HandlerNotFound { request_type: &'static str },

    /// The request handler's own failure, relayed unchanged.
    #[error(transparent)]
    Handler(anyhow::Error),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("handler {handler} was given a message that is not a {expected}")]
    TypeMismatch {
        handler: &'static str,
        expected: &'static str,
    },
}

impl MediatorError {
    /// Borrow the handler failure when this error is a relayed one.
    pub fn handler_error(&self) -> Option<&anyhow::Error> {
        match self {
            MediatorError::Handler(e) => Some(e),
            _ => None,
        }
    }
}

/// One notification handler that failed during a publish.
#[derive(Debug)]
pub struct HandlerFailure {
    pub handler: &'static str,
    pub error: anyhow::Error,
}

impl fmt::Display for HandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.handler, self.error)
    }
}

/// PublishError は publish で失敗した全 handler を保持する
///
/// Every failure is kept in registration order; none is dropped in favour
/// of another.
#[derive(Debug)]
pub struct PublishError {
    notification: &'static str,
    invoked: usize,
    failures: Vec<HandlerFailure>,
}

impl PublishError {
    pub fn new(notification: &'static str, invoked: usize, failures: Vec<HandlerFailure>) -> Self {
        Self {
            notification,
            invoked,
            failures,
        }
    }

    pub fn notification(&self) -> &'static str {
        self.notification
    }

    /// Number of handlers that ran, successful or not.
    pub fn invoked(&self) -> usize {
        self.invoked
    }

    pub fn failures(&self) -> &[HandlerFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<HandlerFailure> {
        self.failures
    }
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} handler(s) failed for {}",
            self.failures.len(),
            self.invoked,
            self.notification
        )?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{failure}")?;
        }
        Ok(())
    }
}

impl StdError for PublishError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.failures
            .first()
            .map(|failure| <anyhow::Error as AsRef<dyn StdError + 'static>>::as_ref(&failure.error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn publish_error_lists_every_failure() {
        let err = PublishError::new(
            "UserSaved",
            3,
            vec![
                HandlerFailure {
                    handler: "AuditWriter",
                    error: anyhow!("disk full"),
                },
                HandlerFailure {
                    handler: "Mailer",
                    error: anyhow!("smtp down"),
                },
            ],
        );

        let msg = err.to_string();
        assert_eq!(
            msg,
            "2 of 3 handler(s) failed for UserSaved: AuditWriter: disk full; Mailer: smtp down"
        );
        assert_eq!(err.invoked(), 3);
        assert_eq!(err.failures().len(), 2);
        assert_eq!(err.source().map(|s| s.to_string()), Some("disk full".to_string()));
    }

    #[test]
    fn handler_error_is_transparent() {
        let err = MediatorError::Handler(anyhow!("boom"));
        assert_eq!(err.to_string(), "boom");
        assert!(err.handler_error().is_some());
    }

    #[test]
    fn handler_not_found_names_the_request() {
        let err = MediatorError::HandlerNotFound {
            request_type: "GetUserById",
        };
        assert_eq!(err.to_string(), "no handler registered for GetUserById");
        assert!(err.handler_error().is_none());
    }
}
