//! A failing subscriber wrapped with `suppress`: its error is logged
//! through `TracingSink` and the invocation still completes.

use std::sync::Arc;

use eventdispatch::{
    arguments, init_logging, suppress, wait_all, Arguments, EventDispatcher, Handler,
    LoggingConfig, TracingSink,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _logging = init_logging(LoggingConfig::load()?).map_err(|e| anyhow::anyhow!("{e}"))?;

    let dispatcher = EventDispatcher::<String>::new();

    let parse_port = suppress(Arc::new(TracingSink), |args: Arguments| async move {
        let raw: String = args.require("port")?;
        let port: u16 = raw.parse()?;
        println!("port = {port}");
        Ok::<_, anyhow::Error>(port)
    });
    dispatcher.subscribe("config", Handler::new(parse_port).named("parse_port"));

    for port in ["8080", "not-a-port"] {
        for result in wait_all(dispatcher.publish("config", arguments!("port" => port))).await {
            result?;
        }
    }

    let failing = Handler::new(|_| async { Err::<(), _>(anyhow::anyhow!("unwrapped failure")) })
        .named("loud");
    dispatcher.subscribe("config", failing);

    for result in wait_all(dispatcher.publish("config", arguments!("port" => "9090"))).await {
        if let Err(err) = result {
            tracing::warn!(error = %err, "handler reported failure");
        }
    }

    Ok(())
}
