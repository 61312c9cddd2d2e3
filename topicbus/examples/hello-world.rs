use topicbus::*;

// Any Send + Sync + 'static type can be posted
#[derive(Debug)]
struct Hello(String);

fn main() -> Result {
    let bus = Bus::new();

    // Subscribe to every topic under "greet."
    bus.subscribe("greet.*", |msg: &Hello| {
        println!("Hello, {}!", msg.0);
    });

    // Synchronous: the handler runs before post returns
    bus.post("greet.world", Hello("World".into()));

    // Asynchronous: queued and handled on the worker thread
    let (done_tx, done_rx) = std::sync::mpsc::channel();
    bus.subscribe("greet.async", move |_: &Hello| {
        let _ = done_tx.send(());
    });

    bus.start()?;
    bus.post_async("greet.async", Hello("from the worker".into()));
    let _ = done_rx.recv();

    // Discards anything still queued and joins the worker
    bus.stop()
}
