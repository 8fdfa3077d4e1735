//! 进程内同步事件分发器（event-dispatch）
//!
//! 生产者 `fire` 一个带类型的事件值，已注册的监听器按其声明的事件类型接收回调，
//! 并按固定优先级依次执行：
//! - 监听器注册（`listener`）：显式构建器 `Handlers::on` 或 `#[listener]` 过程宏；
//! - 注册表（`registry`）：事件类型 -> 处理器绑定集合，支持并发读写；
//! - 分发（`dispatcher`）：按优先级排序、取消短路与失败隔离；
//! - 错误上报（`sink`）：处理器失败以类型化错误交给可注入的 `ErrorSink`。
//!
//! 典型用法：
//! 1. 为事件类型实现 `Event`（可选实现 `Cancelable`）；
//! 2. 为监听器实现 `Listener`，或在 inherent impl 上使用 `#[listener]`；
//! 3. 通过 `Dispatcher::register` 注册，`Dispatcher::fire` 分发。
//!
pub mod binding;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod listener;
pub mod priority;
pub mod registry;
pub mod sink;

pub use binding::HandlerBinding;
pub use config::DispatcherConfig;
pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{DispatchError, DispatchResult, HandlerContext, HandlerResult, IntoHandlerResult};
pub use event::{Cancelable, Event};
pub use listener::{FnListener, Handlers, Listener, ListenerId};
pub use priority::Priority;
pub use registry::Registration;
pub use sink::{ErrorSink, TracingErrorSink};

#[cfg(feature = "macros")]
pub use event_dispatch_macros::{Cancelable, Event, handler, listener};

// 允许在本 crate 内部通过 ::event_dispatch 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::event_dispatch 路径。
extern crate self as event_dispatch;
