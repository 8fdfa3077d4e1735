use event_dispatch::{Cancelable as _, Event as _};
use event_dispatch_macros::{Cancelable, Event};

#[derive(Event)]
enum Lifecycle {
    Started,
    Stopped,
}

#[derive(Event, Cancelable, Default)]
#[event(cancelable)]
struct Shoot {
    cancelled: bool,
}

#[derive(Event)]
struct Wrapped<T: 'static> {
    inner: T,
}

fn main() {
    assert!(Lifecycle::Started.as_cancelable().is_none());
    let _ = Lifecycle::Stopped;

    let mut shoot = Shoot::default();
    shoot.set_cancelled(true);
    assert!(shoot.as_cancelable().map(|c| c.is_cancelled()).unwrap_or(false));

    let w = Wrapped { inner: 1u8 };
    assert!(w.as_cancelable().is_none());
    assert_eq!(w.inner, 1);
}
