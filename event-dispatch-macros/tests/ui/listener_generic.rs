use event_dispatch::Dispatcher;
use event_dispatch_macros::{Event, listener};
use std::marker::PhantomData;
use std::sync::Arc;

#[derive(Event)]
struct Ping;

struct Tagged<T> {
    _tag: PhantomData<fn() -> T>,
}

#[listener]
impl<T: 'static> Tagged<T> {
    #[handler]
    fn on_ping(&self, _: &mut Ping) {}

    fn tag_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

struct Empty;

// 空 impl 也应当能生成实现
#[listener]
impl Empty {}

fn main() {
    let dispatcher = Dispatcher::new();
    let tagged = Arc::new(Tagged::<u8> { _tag: PhantomData });
    assert!(dispatcher.register(tagged.clone()).is_registered());
    assert_eq!(tagged.tag_name(), "u8");
    assert!(!dispatcher.register(Arc::new(Empty)).is_registered());
    dispatcher.fire(Ping);
}
