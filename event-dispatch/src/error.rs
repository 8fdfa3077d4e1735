//! 分发器统一错误定义
//!
//! 错误不会从 `fire` 向调用方传播：注册期与分发期产生的错误
//! 统一转换为 `DispatchError` 并交给 `ErrorSink` 上报。
//!
use crate::listener::ListenerId;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// 处理器回调的返回类型
pub type HandlerResult = anyhow::Result<()>;

/// 定位出错处理器所需的上下文
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlerContext {
    pub listener: ListenerId,
    pub listener_type: &'static str,
    pub handler: &'static str,
    pub event: &'static str,
}

impl fmt::Display for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listener={}({}), handler={}, event={}",
            self.listener_type, self.listener, self.handler, self.event
        )
    }
}

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DispatchError {
    // --- 注册期 ---
    #[error("malformed handler declaration: listener={listener}, handler={handler}, reason={reason}")]
    MalformedHandlerDeclaration {
        listener: &'static str,
        handler: &'static str,
        reason: Cow<'static, str>,
    },

    // --- 分发期 ---
    #[error("handler failed: {context}: {source}")]
    HandlerFailed {
        context: HandlerContext,
        #[source]
        source: anyhow::Error,
    },
    #[error("handler panicked: {context}: {message}")]
    HandlerPanicked {
        context: HandlerContext,
        message: String,
    },
    #[error("type mismatch: {context}, expected={expected}")]
    TypeMismatch {
        context: HandlerContext,
        expected: &'static str,
    },
}

impl DispatchError {
    /// 分发期错误对应的处理器上下文；注册期错误返回 `None`
    pub fn context(&self) -> Option<&HandlerContext> {
        match self {
            Self::HandlerFailed { context, .. }
            | Self::HandlerPanicked { context, .. }
            | Self::TypeMismatch { context, .. } => Some(context),
            Self::MalformedHandlerDeclaration { .. } => None,
        }
    }
}

/// 统一 Result 类型别名
pub type DispatchResult<T> = Result<T, DispatchError>;

/// 将处理器的返回值归一为 `HandlerResult`
///
/// 处理器可以不返回值（`()`），也可以返回 `Result<(), E>` 以显式报告失败。
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> HandlerResult;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> HandlerResult {
        Ok(())
    }
}

impl<E> IntoHandlerResult for Result<(), E>
where
    E: Into<anyhow::Error>,
{
    fn into_handler_result(self) -> HandlerResult {
        self.map_err(Into::into)
    }
}
