//! 监听器与处理器声明
//!
//! 监听器通过 `declare_handlers` 枚举自身的处理器声明，每条声明绑定
//! 一个事件类型、一个回调、一个优先级与 `ignore_cancelled` 标记。
//! 声明既可以手写（`Handlers::on`），也可以由 `#[listener]` 宏在编译期生成。
//!
use crate::error::{HandlerResult, IntoHandlerResult};
use crate::event::Event;
use crate::priority::Priority;
use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 监听器：由宿主应用提供，以 `Arc` 形式注册
///
/// 回调只能拿到 `&self`；需要修改自身状态时请使用内部可变性。
pub trait Listener: Send + Sync + 'static {
    /// 声明本监听器的全部处理器
    fn declare_handlers(&self, handlers: &mut Handlers<Self>)
    where
        Self: Sized;
}

/// 监听器实例标识：取自 `Arc` 分配地址
///
/// 注册表持有该 `Arc` 的克隆，因此实例在注册期间地址不会被复用。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(usize);

impl ListenerId {
    pub fn of<L: ?Sized>(listener: &Arc<L>) -> Self {
        Self(Arc::as_ptr(listener) as *const () as usize)
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: usize) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// 调用失败的原因（crate 内部使用，分发器补全上下文后转为 `DispatchError`）
pub(crate) enum InvokeError {
    Handler(anyhow::Error),
    TypeMismatch { expected: &'static str },
}

pub(crate) type Callback<L> =
    Box<dyn Fn(&L, &mut dyn Any) -> Result<(), InvokeError> + Send + Sync>;

/// 处理器身份：同一监听器在同一事件类型下按此去重
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HandlerId {
    /// 零尺寸回调（函数项、无捕获闭包），行为完全由类型决定
    Type(TypeId),
    /// 函数指针或捕获闭包，类型相同也可能指向不同处理器，按声明位置区分
    Slot(usize),
}

/// 一条合法的处理器声明
pub(crate) struct HandlerSpec<L> {
    pub(crate) event_type: TypeId,
    pub(crate) event: &'static str,
    pub(crate) handler_id: HandlerId,
    pub(crate) handler: &'static str,
    pub(crate) priority: Priority,
    pub(crate) ignore_cancelled: bool,
    pub(crate) callback: Callback<L>,
}

pub(crate) enum HandlerDeclaration<L> {
    Valid(HandlerSpec<L>),
    Malformed {
        handler: &'static str,
        reason: Cow<'static, str>,
    },
}

/// 处理器声明收集器
pub struct Handlers<L> {
    declarations: Vec<HandlerDeclaration<L>>,
}

impl<L: Listener> Handlers<L> {
    pub(crate) fn collect(listener: &L) -> Vec<HandlerDeclaration<L>> {
        let mut handlers = Self {
            declarations: Vec::new(),
        };
        listener.declare_handlers(&mut handlers);
        handlers.declarations
    }

    /// 声明一个处理器，名称取自回调的类型名（函数项即为其路径）
    pub fn on<E, F, R>(
        &mut self,
        priority: Priority,
        ignore_cancelled: bool,
        callback: F,
    ) -> &mut Self
    where
        E: Event,
        F: Fn(&L, &mut E) -> R + Send + Sync + 'static,
        R: IntoHandlerResult + 'static,
    {
        self.on_named(type_name::<F>(), priority, ignore_cancelled, callback)
    }

    /// 声明一个具名处理器
    ///
    /// 函数项重复声明同一事件类型只会绑定一次；函数指针与捕获闭包每条声明各自绑定。
    pub fn on_named<E, F, R>(
        &mut self,
        handler: &'static str,
        priority: Priority,
        ignore_cancelled: bool,
        callback: F,
    ) -> &mut Self
    where
        E: Event,
        F: Fn(&L, &mut E) -> R + Send + Sync + 'static,
        R: IntoHandlerResult + 'static,
    {
        let handler_id = if size_of::<F>() == 0 {
            HandlerId::Type(TypeId::of::<F>())
        } else {
            HandlerId::Slot(self.declarations.len())
        };

        let callback: Callback<L> = Box::new(move |listener, event| {
            // 正常情况下 downcast 不会失败（键与闭包同一泛型 E）
            let Some(event) = event.downcast_mut::<E>() else {
                return Err(InvokeError::TypeMismatch {
                    expected: type_name::<E>(),
                });
            };
            let result: HandlerResult = callback(listener, event).into_handler_result();
            result.map_err(InvokeError::Handler)
        });

        self.declarations.push(HandlerDeclaration::Valid(HandlerSpec {
            event_type: TypeId::of::<E>(),
            event: type_name::<E>(),
            handler_id,
            handler,
            priority,
            ignore_cancelled,
            callback,
        }));
        self
    }

    /// 记录一条不合规的声明；注册时会上报并跳过它
    pub fn reject(
        &mut self,
        handler: &'static str,
        reason: impl Into<Cow<'static, str>>,
    ) -> &mut Self {
        self.declarations.push(HandlerDeclaration::Malformed {
            handler,
            reason: reason.into(),
        });
        self
    }
}

/// 闭包监听器：无需定义宿主类型即可订阅单个事件
pub struct FnListener<E, F> {
    callback: F,
    priority: Priority,
    ignore_cancelled: bool,
    _event: PhantomData<fn(&mut E)>,
}

impl<E, F> FnListener<E, F> {
    pub fn new(priority: Priority, ignore_cancelled: bool, callback: F) -> Self {
        Self {
            callback,
            priority,
            ignore_cancelled,
            _event: PhantomData,
        }
    }
}

impl<E, F, R> Listener for FnListener<E, F>
where
    E: Event,
    F: Fn(&mut E) -> R + Send + Sync + 'static,
    R: IntoHandlerResult + 'static,
{
    fn declare_handlers(&self, handlers: &mut Handlers<Self>) {
        handlers.on_named(
            type_name::<F>(),
            self.priority,
            self.ignore_cancelled,
            |listener: &Self, event: &mut E| (listener.callback)(event),
        );
    }
}
