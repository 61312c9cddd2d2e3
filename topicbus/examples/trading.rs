//! Risk checks, notifications, and scoped subscriptions on one bus.
//!
//! Run with `RUST_LOG=topicbus=debug` to see the bus's own logging.

use std::sync::{Arc, Weak, mpsc};

use topicbus::{Bus, Response, Result, SubscriptionGuard, monitors::DispatchStats};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct TradeEvent {
    symbol: String,
    price: f64,
}

impl TradeEvent {
    fn new(symbol: &str, price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            price,
        }
    }
}

#[derive(Debug)]
struct RiskResult {
    allowed: bool,
    reason: &'static str,
}

#[derive(Debug)]
struct Notification {
    message: String,
}

#[derive(Debug)]
struct VoidMessage;

/// Rejects expensive trades. Unsubscribes when dropped.
struct RiskEngine {
    _subscription: SubscriptionGuard,
}

impl RiskEngine {
    fn new(bus: &Bus) -> Self {
        let guard = bus
            .subscription("risk.check")
            .priority(200)
            .scoped(|trade: &TradeEvent| {
                println!("[RiskEngine] Processing {}, price: {}", trade.symbol, trade.price);
                if trade.price > 1000.0 {
                    Response::new(RiskResult {
                        allowed: false,
                        reason: "Price too high",
                    })
                } else {
                    Response::void()
                }
            });
        Self {
            _subscription: guard,
        }
    }
}

/// Turns every trade into an asynchronous notification.
struct Notifier {
    _subscription: SubscriptionGuard,
}

impl Notifier {
    fn new(bus: &Arc<Bus>) -> Self {
        let weak: Weak<Bus> = Arc::downgrade(bus);
        let guard = bus.subscription("trade.*").scoped(move |trade: &TradeEvent| {
            println!("[Notifier] Sending alert for {}", trade.symbol);
            if let Some(bus) = weak.upgrade() {
                bus.post_async(
                    "notification",
                    Notification {
                        message: format!("Trade executed: {}", trade.symbol),
                    },
                );
            }
        });
        Self {
            _subscription: guard,
        }
    }
}

fn main() -> Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bus = Arc::new(Bus::new());
    let stats = DispatchStats::new();
    bus.monitors().add(stats.clone());
    bus.start()?;

    // 1. Basic publish; handlers only see their own message type
    let basic = bus.subscribe("basic.trade", |t: &TradeEvent| {
        println!("Basic handler: {} @ {}", t.symbol, t.price);
    });
    bus.subscribe("basic.trade", |_: &VoidMessage| println!("Void message handler"));
    bus.post("basic.trade", TradeEvent::new("GOOG", 142.56));
    bus.post("basic.trade", VoidMessage);

    // 2. Synchronous call with a response
    let validate = bus.subscribe("trade.validate", |t: &TradeEvent| {
        if t.price <= 0.0 {
            Response::new(RiskResult {
                allowed: false,
                reason: "Invalid price",
            })
        } else {
            Response::new(RiskResult {
                allowed: true,
                reason: "Valid",
            })
        }
    });
    for response in bus.post("trade.validate", TradeEvent::new("AAPL", -1.23)) {
        if let Some(result) = response.get::<RiskResult>() {
            let verdict = if result.allowed { "Approved" } else { "Rejected" };
            println!("Validation: {verdict} - {}", result.reason);
        }
    }

    // 3. Asynchronous handling
    bus.subscribe("notification", |n: &Notification| {
        println!("Notification received: {}", n.message);
    });
    let risk_engine = RiskEngine::new(&bus);
    bus.post_async("risk.check", TradeEvent::new("MSFT", 247.86));

    // 4. Priority: 50 runs before the risk engine's 200
    bus.subscribe_with_priority("risk.check", 50, |t: &TradeEvent| {
        println!("High priority handler for {}, price: {}", t.symbol, t.price);
    });
    let rejected = bus.post("risk.check", TradeEvent::new("BRK.A", 620_000.0));
    println!("Risk responses for BRK.A: {rejected:?}");

    // 5. Wildcard subscription
    let notifier = Notifier::new(&bus);
    bus.post("trade.special", TradeEvent::new("TSLA", 699.20));

    // 6. Concurrent producers
    let producers: Vec<_> = (0..5)
        .map(|i| {
            let bus = bus.clone();
            std::thread::spawn(move || {
                bus.post_async("risk.check", TradeEvent::new("THREAD", 100.0 + i as f64));
            })
        })
        .collect();
    for p in producers {
        let _ = p.join();
    }

    // 7. Unsubscribed handlers are no longer called
    bus.unsubscribe(basic);
    bus.post("basic.trade", TradeEvent::new("UNSUB", 123.45));

    // 8. Handler registered only for the duration of a closure
    let seen = bus.with_subscription(
        "audit.*",
        |t: &TradeEvent| println!("[Audit] {}", t.symbol),
        |id| {
            bus.post("audit.trade", TradeEvent::new("IBM", 181.0));
            id
        },
    );
    println!("Audit subscription {seen} released: {}", !bus.unsubscribe(seen));

    // Wait until the worker has caught up with everything queued so far
    let (done_tx, done_rx) = mpsc::channel();
    let _barrier = bus.subscription("demo.done").scoped(move |_: &()| {
        let _ = done_tx.send(());
    });
    bus.post_async("demo.done", ());
    let _ = done_rx.recv();

    println!("\nSubscriptions:\n{}", bus.to_mermaid());

    drop(notifier);
    drop(risk_engine);
    bus.unsubscribe(validate);
    bus.stop()?;

    println!("\n{stats:?}");
    Ok(())
}
