//! Three subscribers with different delays on one topic.
//!
//! All three enter before any of them leaves; they leave fastest first.

use std::time::Duration;

use eventdispatch::{
    arguments, init_logging, wait_all, Arguments, EventDispatcher, Handler, LoggingConfig,
};

fn subscriber(
    label: &'static str,
    delay: Duration,
) -> Handler {
    Handler::new(move |args: Arguments| async move {
        let value: String = args.require("value")?;
        println!("Enter {label}: {value}");
        tokio::time::sleep(delay).await;
        println!("Leave {label}: {value}");
        Ok::<_, anyhow::Error>(())
    })
    .named(label)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _logging = init_logging(LoggingConfig::load()?).map_err(|e| anyhow::anyhow!("{e}"))?;

    let dispatcher = EventDispatcher::<String>::new();
    dispatcher.subscribe("test", subscriber("fast", Duration::from_millis(100)));
    dispatcher.subscribe("test", subscriber("medium", Duration::from_millis(500)));
    dispatcher.subscribe("test", subscriber("slow", Duration::from_secs(1)));

    let handles = dispatcher.publish("test", arguments!("value" => "foo"));
    tracing::info!(scheduled = handles.len(), "published");

    for result in wait_all(handles).await {
        result?;
    }

    tracing::info!(stats = ?dispatcher.stats(), "done");
    Ok(())
}
