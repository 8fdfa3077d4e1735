//! 事件与可取消能力
//!
use std::any::Any;

/// 事件：由宿主应用定义的值类型
///
/// 注册表以事件的精确类型（`TypeId`）为键，不做任何“父类型”匹配：
/// 为 `A` 注册的处理器不会收到 `B` 事件，即便 `B` 包装或扩展了 `A`。
pub trait Event: Any {
    /// 若事件支持取消，返回其 `Cancelable` 视图
    fn as_cancelable(&self) -> Option<&dyn Cancelable> {
        None
    }
}

/// 可取消能力：处理器可将事件标记为已取消，后续处理器可观察到
pub trait Cancelable {
    fn set_cancelled(&mut self, cancelled: bool);
    fn is_cancelled(&self) -> bool;
}

pub(crate) fn is_cancelled<E: Event>(event: &E) -> bool {
    event.as_cancelable().is_some_and(Cancelable::is_cancelled)
}
