//! 错误上报（ErrorSink）
//!
//! 分发器从不把处理器的失败抛给调用方，而是交给注入的 `ErrorSink`。
//! 默认实现 `TracingErrorSink` 通过 `tracing` 记录日志。
//!
use crate::error::DispatchError;

pub trait ErrorSink: Send + Sync {
    fn report(&self, error: &DispatchError);
}

impl<F> ErrorSink for F
where
    F: Fn(&DispatchError) + Send + Sync,
{
    fn report(&self, error: &DispatchError) {
        self(error)
    }
}

/// 以 `tracing` 事件输出错误
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, error: &DispatchError) {
        match error {
            DispatchError::MalformedHandlerDeclaration {
                listener, handler, ..
            } => {
                tracing::warn!(listener, handler, error = %error, "skipping invalid handler declaration");
            }
            _ => match error.context() {
                Some(ctx) => tracing::error!(
                    listener = ctx.listener_type,
                    listener_id = %ctx.listener,
                    handler = ctx.handler,
                    event = ctx.event,
                    error = %error,
                    "event handler failed"
                ),
                None => tracing::error!(error = %error, "event dispatch error"),
            },
        }
    }
}
