use event_dispatch::{
    Cancelable, DispatchError, DispatchReport, Dispatcher, Event, Handlers, Listener, Priority,
    Registration,
};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

struct Ping {
    data: u32,
}
impl Event for Ping {}

#[derive(Default)]
struct ShootEvent {
    cancelled: bool,
}

impl Cancelable for ShootEvent {
    fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
    fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl Event for ShootEvent {
    fn as_cancelable(&self) -> Option<&dyn Cancelable> {
        Some(self)
    }
}

struct ListenerX {
    log: Log,
}
impl ListenerX {
    fn on_ping(&self, e: &mut Ping) {
        self.log.lock().unwrap().push(format!("x:{}", e.data));
    }
}
impl Listener for ListenerX {
    fn declare_handlers(&self, handlers: &mut Handlers<Self>) {
        handlers.on(Priority::Normal, false, Self::on_ping);
    }
}

struct ListenerY {
    log: Log,
}
impl ListenerY {
    fn on_ping(&self, e: &mut Ping) {
        self.log.lock().unwrap().push(format!("y:{}", e.data));
    }
}
impl Listener for ListenerY {
    fn declare_handlers(&self, handlers: &mut Handlers<Self>) {
        handlers.on(Priority::Highest, false, Self::on_ping);
    }
}

struct ListenerA {
    log: Log,
}
impl ListenerA {
    fn on_shoot(&self, e: &mut ShootEvent) {
        self.log.lock().unwrap().push("a".to_string());
        e.set_cancelled(true);
    }
}
impl Listener for ListenerA {
    fn declare_handlers(&self, handlers: &mut Handlers<Self>) {
        handlers.on(Priority::Low, false, Self::on_shoot);
    }
}

struct ListenerB {
    log: Log,
}
impl ListenerB {
    fn on_shoot(&self, _: &mut ShootEvent) {
        self.log.lock().unwrap().push("b".to_string());
    }
}
impl Listener for ListenerB {
    fn declare_handlers(&self, handlers: &mut Handlers<Self>) {
        handlers.on(Priority::High, true, Self::on_shoot);
    }
}

#[test]
fn ping_reaches_normal_before_highest() {
    let dispatcher = Dispatcher::new();
    let log = Log::default();

    // 先注册 HIGHEST，确保顺序来自优先级而非注册次序
    dispatcher.register(Arc::new(ListenerY { log: log.clone() }));
    dispatcher.register(Arc::new(ListenerX { log: log.clone() }));

    let ping = dispatcher.fire(Ping { data: 42 });

    assert_eq!(ping.data, 42);
    assert_eq!(*log.lock().unwrap(), vec!["x:42", "y:42"]);
}

#[test]
fn cancelled_shoot_skips_ignoring_listener() {
    let dispatcher = Dispatcher::new();
    let log = Log::default();
    dispatcher.register(Arc::new(ListenerB { log: log.clone() }));
    dispatcher.register(Arc::new(ListenerA { log: log.clone() }));

    let shoot = dispatcher.fire(ShootEvent::default());

    assert!(shoot.is_cancelled());
    assert_eq!(*log.lock().unwrap(), vec!["a"]);
}

#[test]
fn pre_cancelled_event_skips_from_the_start() {
    let dispatcher = Dispatcher::new();
    let log = Log::default();
    dispatcher.register(Arc::new(ListenerB { log: log.clone() }));

    let mut shoot = ShootEvent { cancelled: true };
    let report = dispatcher.dispatch(&mut shoot);

    assert_eq!(
        report,
        DispatchReport {
            invoked: 0,
            skipped: 1,
            failed: 0
        }
    );
    assert!(log.lock().unwrap().is_empty());
}

struct Flaky {
    log: Log,
}

impl Flaky {
    fn fail(&self, _: &mut Ping) -> Result<(), std::io::Error> {
        Err(std::io::Error::other("socket closed"))
    }

    fn after(&self, e: &mut Ping) {
        self.log.lock().unwrap().push(format!("after:{}", e.data));
    }
}

impl Listener for Flaky {
    fn declare_handlers(&self, handlers: &mut Handlers<Self>) {
        handlers
            .on(Priority::Lowest, false, Self::fail)
            .on(Priority::Monitor, false, Self::after);
    }
}

#[test]
fn broken_listener_is_reported_not_propagated() {
    let reports: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = reports.clone();
    let dispatcher = Dispatcher::builder()
        .error_sink(Arc::new(move |e: &DispatchError| {
            if let Some(ctx) = e.context() {
                sink.lock()
                    .unwrap()
                    .push(format!("{}|{}", ctx.handler, e));
            }
        }))
        .build();
    let log = Log::default();
    let flaky = Arc::new(Flaky { log: log.clone() });

    assert!(matches!(
        dispatcher.register(flaky),
        Registration::Bound { bound: 2, .. }
    ));
    let report = dispatcher.dispatch(&mut Ping { data: 3 });

    assert_eq!(report.failed, 1);
    assert_eq!(*log.lock().unwrap(), vec!["after:3"]);

    let reports = reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].contains("fail"));
    assert!(reports[0].contains("Flaky"));
    assert!(reports[0].contains("socket closed"));
}

#[test]
fn closure_listeners_can_be_unregistered() {
    let dispatcher = Dispatcher::new();
    let log = Log::default();

    let l = log.clone();
    let registration = dispatcher.listen(Priority::Normal, false, move |e: &mut Ping| {
        l.lock().unwrap().push(format!("closure:{}", e.data));
    });
    assert!(registration.is_registered());

    dispatcher.fire(Ping { data: 1 });
    assert!(dispatcher.unregister(registration.listener_id()));
    dispatcher.fire(Ping { data: 2 });

    assert_eq!(*log.lock().unwrap(), vec!["closure:1"]);
    assert_eq!(dispatcher.handler_count::<Ping>(), 0);
}
