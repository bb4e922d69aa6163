//! Ports - 抽象化レイヤー
//!
//! Dispatcher はここで定義された trait だけに依存し、
//! handler の格納方法は知りません。

pub mod resolver;

pub use self::resolver::HandlerResolver;
