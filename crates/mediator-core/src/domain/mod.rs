//! Domain model - dispatch のエラー分類

pub mod errors;

pub use self::errors::{HandlerFailure, MediatorError, PublishError};
