//! 事件分发器（Dispatcher）
//!
//! `fire` 在调用线程上同步执行：
//! - 以事件的精确类型查找绑定，没有绑定时直接返回原事件；
//! - 按（优先级数值，注册序号）升序依次调用；
//! - `ignore_cancelled` 的绑定在事件已取消时跳过；
//! - 单个处理器失败（返回错误或 panic）只上报，不中断后续处理器。
//!
use crate::binding::HandlerBinding;
use crate::config::DispatcherConfig;
use crate::error::{DispatchError, DispatchResult, IntoHandlerResult};
use crate::event::{Event, is_cancelled};
use crate::listener::{FnListener, Listener, ListenerId};
use crate::priority::Priority;
use crate::registry::{Registration, Registry};
use crate::sink::{ErrorSink, TracingErrorSink};
use bon::Builder;
use std::any::{Any, TypeId, type_name};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// 一次分发的统计
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// 被调用的处理器数（含失败）
    pub invoked: usize,
    /// 因事件已取消而跳过的处理器数
    pub skipped: usize,
    /// 失败（返回错误或 panic）的处理器数
    pub failed: usize,
}

#[derive(Builder)]
pub struct Dispatcher {
    #[builder(skip)]
    registry: Registry,
    #[builder(default = default_error_sink())]
    error_sink: Arc<dyn ErrorSink>,
    #[builder(default)]
    config: DispatcherConfig,
}

fn default_error_sink() -> Arc<dyn ErrorSink> {
    Arc::new(TracingErrorSink)
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// 注册监听器；同一实例重复注册为空操作
    pub fn register<L: Listener>(&self, listener: Arc<L>) -> Registration {
        self.registry.register(&listener, self.error_sink.as_ref())
    }

    /// 以闭包订阅单个事件类型
    pub fn listen<E, F, R>(
        &self,
        priority: Priority,
        ignore_cancelled: bool,
        callback: F,
    ) -> Registration
    where
        E: Event,
        F: Fn(&mut E) -> R + Send + Sync + 'static,
        R: IntoHandlerResult + 'static,
    {
        self.register(Arc::new(FnListener::<E, F>::new(
            priority,
            ignore_cancelled,
            callback,
        )))
    }

    /// 按标识注销监听器的全部绑定，返回其之前是否已注册
    pub fn unregister(&self, listener: ListenerId) -> bool {
        self.registry.unregister(listener)
    }

    pub fn unregister_listener<L: Listener>(&self, listener: &Arc<L>) -> bool {
        self.registry.unregister(ListenerId::of(listener))
    }

    pub fn is_registered<L: Listener>(&self, listener: &Arc<L>) -> bool {
        self.registry.contains(ListenerId::of(listener))
    }

    pub fn listener_count(&self) -> usize {
        self.registry.listener_count()
    }

    /// 事件类型 `E` 的绑定数
    pub fn handler_count<E: Event>(&self) -> usize {
        self.registry
            .snapshot(&TypeId::of::<E>())
            .map_or(0, |bindings| bindings.len())
    }

    /// 事件类型 `E` 的绑定，按分发顺序排列
    pub fn bindings<E: Event>(&self) -> Vec<Arc<HandlerBinding>> {
        self.ordered::<E>().unwrap_or_default()
    }

    /// 分发事件并返回（可能已被处理器修改的）事件
    pub fn fire<E: Event>(&self, mut event: E) -> E {
        self.dispatch(&mut event);
        event
    }

    /// 就地分发事件，返回本次分发的统计
    pub fn dispatch<E: Event>(&self, event: &mut E) -> DispatchReport {
        let mut report = DispatchReport::default();

        let Some(bindings) = self.ordered::<E>() else {
            if self.config.log_unhandled {
                tracing::debug!(event = type_name::<E>(), "no handlers for event");
            }
            return report;
        };

        for binding in &bindings {
            if binding.ignore_cancelled() && is_cancelled(&*event) {
                tracing::debug!(
                    event = type_name::<E>(),
                    listener = binding.listener_type(),
                    handler = binding.handler(),
                    "event cancelled, skipping handler"
                );
                report.skipped += 1;
                continue;
            }

            report.invoked += 1;
            if let Err(err) = self.invoke(binding, event) {
                report.failed += 1;
                self.error_sink.report(&err);
            }
        }

        tracing::trace!(
            event = type_name::<E>(),
            invoked = report.invoked,
            skipped = report.skipped,
            failed = report.failed,
            "event dispatched"
        );
        report
    }

    fn ordered<E: Event>(&self) -> Option<Vec<Arc<HandlerBinding>>> {
        let mut bindings = self.registry.snapshot(&TypeId::of::<E>())?;
        bindings.sort_by_key(|b| b.order_key());
        Some(bindings)
    }

    fn invoke(&self, binding: &HandlerBinding, event: &mut dyn Any) -> DispatchResult<()> {
        if !self.config.catch_panics {
            return binding.invoke(event);
        }

        match panic::catch_unwind(AssertUnwindSafe(|| binding.invoke(event))) {
            Ok(result) => result,
            Err(payload) => Err(DispatchError::HandlerPanicked {
                context: binding.context(),
                message: panic_message(payload.as_ref()),
            }),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
