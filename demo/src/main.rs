use event_dispatch::{
    Cancelable, Dispatcher, DispatcherConfig, Event, HandlerResult, Priority, listener,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Event)]
struct Ping {
    data: u32,
}

#[derive(Debug, Default, Event, Cancelable)]
#[event(cancelable)]
struct ShootEvent {
    shooter: String,
    cancelled: bool,
}

struct ListenerX;

#[listener]
impl ListenerX {
    #[handler]
    fn on_ping(&self, e: &Ping) {
        println!("  ListenerX (NORMAL)  sees data={}", e.data);
    }
}

struct ListenerY;

#[listener]
impl ListenerY {
    #[handler(priority = Highest)]
    fn on_ping(&self, e: &Ping) {
        println!("  ListenerY (HIGHEST) sees data={}", e.data);
    }
}

/// 禁止玩家开火，并统计拦截次数
#[derive(Default)]
struct SafeZone {
    blocked: AtomicU32,
}

#[listener]
impl SafeZone {
    #[handler(priority = Low)]
    fn on_shoot(&self, e: &mut ShootEvent) {
        println!("  SafeZone (LOW) cancels shot by {}", e.shooter);
        self.blocked.fetch_add(1, Ordering::Relaxed);
        e.set_cancelled(true);
    }
}

struct Gun;

#[listener]
impl Gun {
    #[handler(priority = High, ignore_cancelled)]
    fn on_shoot(&self, e: &mut ShootEvent) {
        println!("  Gun (HIGH) fires for {}", e.shooter);
    }

    #[handler(priority = Monitor)]
    fn audit(&self, e: &ShootEvent) -> HandlerResult {
        if e.shooter.is_empty() {
            anyhow::bail!("shot without a shooter");
        }
        println!("  Gun audit (MONITOR): cancelled={}", e.is_cancelled());
        Ok(())
    }
}

// DEMO_CONFIG='{"catch_panics": true, "log_unhandled": true}'
fn load_config() -> anyhow::Result<DispatcherConfig> {
    match std::env::var("DEMO_CONFIG") {
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(_) => Ok(DispatcherConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("event_dispatch=info".parse()?))
        .init();

    let dispatcher = Dispatcher::builder().config(load_config()?).build();

    println!("== Ping");
    dispatcher.register(Arc::new(ListenerY));
    dispatcher.register(Arc::new(ListenerX));
    let ping = dispatcher.fire(Ping { data: 42 });
    println!("  returned {ping:?}");

    println!("== ShootEvent");
    let zone = Arc::new(SafeZone::default());
    dispatcher.register(zone.clone());
    dispatcher.register(Arc::new(Gun));
    let shot = dispatcher.fire(ShootEvent {
        shooter: "alice".to_string(),
        ..Default::default()
    });
    println!("  returned {shot:?}");

    println!("== ShootEvent without a shooter (audit fails, dispatch continues)");
    let report = dispatcher.dispatch(&mut ShootEvent::default());
    println!("  {report:?}");

    println!("== Unregister SafeZone");
    dispatcher.unregister_listener(&zone);
    dispatcher.fire(ShootEvent {
        shooter: "bob".to_string(),
        ..Default::default()
    });

    println!(
        "blocked shots: {}, listeners: {}, ping handlers: {}, priorities: {:?}",
        zone.blocked.load(Ordering::Relaxed),
        dispatcher.listener_count(),
        dispatcher.handler_count::<Ping>(),
        dispatcher
            .bindings::<ShootEvent>()
            .iter()
            .map(|b| b.priority())
            .collect::<Vec<Priority>>()
    );

    Ok(())
}
