use event_dispatch::{Dispatcher, Priority};
use event_dispatch_macros::{Event, listener};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Event)]
struct Ping {
    data: u32,
}

#[derive(Default)]
struct Total {
    sum: AtomicU32,
}

#[listener]
impl Total {
    #[handler(priority = Monitor)]
    fn on_ping(&self, e: &Ping) {
        self.sum.fetch_add(e.data, Ordering::SeqCst);
    }

    #[handler(priority = Lowest)]
    fn double(&self, e: &mut Ping) -> anyhow::Result<()> {
        e.data *= 2;
        Ok(())
    }
}

fn main() {
    let dispatcher = Dispatcher::new();
    let total = Arc::new(Total::default());
    dispatcher.register(total.clone());

    let ping = dispatcher.fire(Ping { data: 21 });
    assert_eq!(ping.data, 42);
    assert_eq!(total.sum.load(Ordering::SeqCst), 42);
    assert_eq!(dispatcher.bindings::<Ping>()[1].priority(), Priority::Monitor);
}
