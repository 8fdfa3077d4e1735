//! 处理器注册表（Registry）
//!
//! - 事件类型（`TypeId`）-> 绑定集合，基于 `DashMap` 分片读写；
//! - 所有写操作由一把写锁串行化，写锁同时持有监听器索引与注册序号计数器；
//! - 读取方（分发器）只拿到某一事件类型集合的快照，不持锁执行回调。
//!
use crate::binding::HandlerBinding;
use crate::error::DispatchError;
use crate::listener::{HandlerDeclaration, Handlers, Listener, ListenerId};
use crate::sink::ErrorSink;
use dashmap::DashMap;
use std::any::{TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// 一次注册的结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// 至少绑定了一个处理器
    Bound {
        listener: ListenerId,
        bound: usize,
        rejected: usize,
    },
    /// 该实例已注册，本次为空操作
    AlreadyRegistered { listener: ListenerId },
    /// 没有任何可绑定的处理器，实例未进入注册表
    NothingBound {
        listener: ListenerId,
        rejected: usize,
    },
}

impl Registration {
    pub fn listener_id(&self) -> ListenerId {
        match *self {
            Registration::Bound { listener, .. }
            | Registration::AlreadyRegistered { listener }
            | Registration::NothingBound { listener, .. } => listener,
        }
    }

    /// 本次调用后该实例是否处于注册状态
    pub fn is_registered(&self) -> bool {
        !matches!(self, Registration::NothingBound { .. })
    }
}

#[derive(Default)]
struct ListenerIndex {
    // 监听器 -> 其绑定所在的事件类型
    listeners: HashMap<ListenerId, Vec<TypeId>>,
    next_seq: u64,
}

#[derive(Default)]
pub(crate) struct Registry {
    bindings: DashMap<TypeId, Vec<Arc<HandlerBinding>>>,
    index: Mutex<ListenerIndex>,
}

impl Registry {
    fn lock_index(&self) -> MutexGuard<'_, ListenerIndex> {
        // 回调从不在持锁期间执行，中毒只可能来自本模块自身，直接沿用内部状态
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 注册监听器
    ///
    /// `declare_handlers` 与错误上报都在锁外执行，二者可以安全地回调注册表。
    pub(crate) fn register<L: Listener>(
        &self,
        listener: &Arc<L>,
        sink: &dyn ErrorSink,
    ) -> Registration {
        let id = ListenerId::of(listener);
        if self.contains(id) {
            tracing::trace!(listener = type_name::<L>(), listener_id = %id, "listener already registered");
            return Registration::AlreadyRegistered { listener: id };
        }

        let declarations = Handlers::collect(listener.as_ref());
        let mut malformed = Vec::new();
        let outcome = self.bind_declarations(listener, declarations, &mut malformed);

        for error in &malformed {
            sink.report(error);
        }
        outcome
    }

    fn bind_declarations<L: Listener>(
        &self,
        listener: &Arc<L>,
        declarations: Vec<HandlerDeclaration<L>>,
        malformed: &mut Vec<DispatchError>,
    ) -> Registration {
        let id = ListenerId::of(listener);
        let mut index = self.lock_index();

        // 并发注册同一实例时，只有先拿到写锁的一方生效
        if index.listeners.contains_key(&id) {
            tracing::trace!(listener = type_name::<L>(), listener_id = %id, "listener already registered");
            return Registration::AlreadyRegistered { listener: id };
        }

        let mut bound = 0usize;
        let mut event_types: Vec<TypeId> = Vec::new();

        for declaration in declarations {
            let spec = match declaration {
                HandlerDeclaration::Valid(spec) => spec,
                HandlerDeclaration::Malformed { handler, reason } => {
                    malformed.push(DispatchError::MalformedHandlerDeclaration {
                        listener: type_name::<L>(),
                        handler,
                        reason,
                    });
                    continue;
                }
            };

            let binding = HandlerBinding::bind(listener, spec, index.next_seq);
            let event_type = binding.event_type();
            let mut entry = self.bindings.entry(event_type).or_default();

            // 集合语义：同一监听器的同一处理器在同一事件类型下只保留一份
            if entry.iter().any(|b| b.same_handler(&binding)) {
                tracing::trace!(
                    listener = binding.listener_type(),
                    handler = binding.handler(),
                    "duplicate handler declaration ignored"
                );
                continue;
            }

            tracing::trace!(
                listener = binding.listener_type(),
                handler = binding.handler(),
                priority = %binding.priority(),
                ignore_cancelled = binding.ignore_cancelled(),
                seq = binding.seq(),
                "handler bound"
            );
            entry.push(Arc::new(binding));
            drop(entry);

            index.next_seq += 1;
            bound += 1;
            if !event_types.contains(&event_type) {
                event_types.push(event_type);
            }
        }

        let rejected = malformed.len();
        if bound == 0 {
            tracing::debug!(listener = type_name::<L>(), rejected, "listener declares no bindable handlers");
            return Registration::NothingBound {
                listener: id,
                rejected,
            };
        }

        index.listeners.insert(id, event_types);
        tracing::debug!(
            listener = type_name::<L>(),
            listener_id = %id,
            bound,
            rejected,
            "listener registered"
        );

        Registration::Bound {
            listener: id,
            bound,
            rejected,
        }
    }

    pub(crate) fn unregister(&self, id: ListenerId) -> bool {
        let mut index = self.lock_index();
        let Some(event_types) = index.listeners.remove(&id) else {
            return false;
        };

        let mut removed = 0usize;
        for event_type in event_types {
            if let Some(mut entry) = self.bindings.get_mut(&event_type) {
                let before = entry.len();
                entry.retain(|b| b.listener() != id);
                removed += before - entry.len();
            }
            self.bindings.remove_if(&event_type, |_, v| v.is_empty());
        }

        tracing::debug!(listener_id = %id, removed, "listener unregistered");
        true
    }

    pub(crate) fn contains(&self, id: ListenerId) -> bool {
        self.lock_index().listeners.contains_key(&id)
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.lock_index().listeners.len()
    }

    /// 某一事件类型当前绑定集合的快照（未排序）
    pub(crate) fn snapshot(&self, event_type: &TypeId) -> Option<Vec<Arc<HandlerBinding>>> {
        self.bindings.get(event_type).map(|entry| entry.value().clone())
    }
}
