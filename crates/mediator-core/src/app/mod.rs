//! App - アプリケーション層
//!
//! # 主要コンポーネント
//! - **MediatorBuilder**: handler の登録と起動時検証
//! - **Mediator**: send / publish の dispatcher

pub mod builder;
pub mod mediator;

pub use self::builder::{BuildError, HandlerModule, MediatorBuilder};
pub use self::mediator::Mediator;
