//! 处理器绑定（HandlerBinding）
//!
//! 注册表中存储的最小单元：某个监听器实例针对某一事件类型的一个回调，
//! 附带优先级、`ignore_cancelled` 标记与注册序号。
//!
use crate::error::{DispatchError, DispatchResult, HandlerContext};
use crate::listener::{HandlerId, HandlerSpec, InvokeError, Listener, ListenerId};
use crate::priority::Priority;
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

type Invoker = Box<dyn Fn(&mut dyn Any) -> Result<(), InvokeError> + Send + Sync>;

pub struct HandlerBinding {
    listener: ListenerId,
    listener_type: &'static str,
    event_type: TypeId,
    event: &'static str,
    handler_id: HandlerId,
    handler: &'static str,
    priority: Priority,
    ignore_cancelled: bool,
    seq: u64,
    invoke: Invoker,
}

impl HandlerBinding {
    pub(crate) fn bind<L: Listener>(listener: &Arc<L>, spec: HandlerSpec<L>, seq: u64) -> Self {
        let HandlerSpec {
            event_type,
            event,
            handler_id,
            handler,
            priority,
            ignore_cancelled,
            callback,
        } = spec;
        let owner = listener.clone();

        Self {
            listener: ListenerId::of(listener),
            listener_type: type_name::<L>(),
            event_type,
            event,
            handler_id,
            handler,
            priority,
            ignore_cancelled,
            seq,
            invoke: Box::new(move |event| callback(owner.as_ref(), event)),
        }
    }

    pub fn listener(&self) -> ListenerId {
        self.listener
    }

    pub fn listener_type(&self) -> &'static str {
        self.listener_type
    }

    pub fn event_type(&self) -> TypeId {
        self.event_type
    }

    pub fn handler(&self) -> &'static str {
        self.handler
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn ignore_cancelled(&self) -> bool {
        self.ignore_cancelled
    }

    /// 注册序号：同优先级下的确定性次序
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// 分发顺序键：先按优先级数值升序，再按注册序号
    pub(crate) fn order_key(&self) -> (Priority, u64) {
        (self.priority, self.seq)
    }

    /// 同一事件类型集合内的去重键（监听器实例 + 处理器身份）
    pub(crate) fn same_handler(&self, other: &HandlerBinding) -> bool {
        self.listener == other.listener && self.handler_id == other.handler_id
    }

    pub(crate) fn context(&self) -> HandlerContext {
        HandlerContext {
            listener: self.listener,
            listener_type: self.listener_type,
            handler: self.handler,
            event: self.event,
        }
    }

    pub(crate) fn invoke(&self, event: &mut dyn Any) -> DispatchResult<()> {
        (self.invoke)(event).map_err(|err| match err {
            InvokeError::Handler(source) => DispatchError::HandlerFailed {
                context: self.context(),
                source,
            },
            InvokeError::TypeMismatch { expected } => DispatchError::TypeMismatch {
                context: self.context(),
                expected,
            },
        })
    }
}

impl fmt::Debug for HandlerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("listener", &self.listener)
            .field("listener_type", &self.listener_type)
            .field("event", &self.event)
            .field("handler", &self.handler)
            .field("priority", &self.priority)
            .field("ignore_cancelled", &self.ignore_cancelled)
            .field("seq", &self.seq)
            .finish()
    }
}
