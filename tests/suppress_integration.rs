use std::sync::Arc;

use eventdispatch::{
    arguments, suppress, suppress_sync, wait_all, Arguments, CollectingSink, DiagnosticSink,
    EventDispatcher, Handler, Suppressor,
};

/// Тест проверяет, что подавленная ошибка обработчика уходит в sink,
/// а дескриптор вызова завершается успешно.
#[tokio::test]
async fn test_suppressed_handler_reports_to_sink() {
    let sink = Arc::new(CollectingSink::new());
    let dyn_sink: Arc<dyn DiagnosticSink> = sink.clone();

    let quiet = Suppressor::new(dyn_sink)
        .named("billing")
        .wrap(|args: Arguments| async move {
            let amount: i64 = args.require("amount")?;
            anyhow::ensure!(amount > 0, "amount must be positive, got {amount}");
            Ok::<_, anyhow::Error>(amount)
        });

    let dispatcher = EventDispatcher::<String>::new();
    dispatcher.subscribe("charge", Handler::new(quiet).named("billing"));

    for result in wait_all(dispatcher.publish("charge", arguments!("amount" => 10))).await {
        result.unwrap();
    }
    assert!(sink.is_empty());

    for result in wait_all(dispatcher.publish("charge", arguments!("amount" => -5))).await {
        result.unwrap();
    }
    assert_eq!(
        sink.entries(),
        vec![(
            "billing".to_string(),
            "amount must be positive, got -5".to_string()
        )]
    );
}

#[tokio::test]
async fn test_suppressed_sync_handler_hides_panic() {
    let sink = Arc::new(CollectingSink::new());
    let dyn_sink: Arc<dyn DiagnosticSink> = sink.clone();

    let quiet = suppress_sync(dyn_sink, |args: Arguments| -> anyhow::Result<()> {
        if args.contains("explode") {
            panic!("kaboom");
        }
        Ok(())
    });

    let dispatcher = EventDispatcher::<String>::new();
    dispatcher.subscribe("t", Handler::from_sync(quiet));

    for result in wait_all(dispatcher.publish("t", arguments!("explode" => true))).await {
        result.unwrap();
    }
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.entries()[0].1, "panicked: kaboom");
}

#[tokio::test]
async fn test_unsuppressed_handler_still_fails() {
    let sink = Arc::new(CollectingSink::new());
    let dyn_sink: Arc<dyn DiagnosticSink> = sink.clone();

    let dispatcher = EventDispatcher::<String>::new();
    dispatcher.subscribe(
        "t",
        Handler::new(suppress(dyn_sink, |_: Arguments| async {
            Err::<(), _>(anyhow::anyhow!("quiet"))
        })),
    );
    dispatcher.subscribe(
        "t",
        Handler::new(|_| async { Err::<(), _>(anyhow::anyhow!("loud")) }),
    );

    let results = wait_all(dispatcher.publish_empty("t")).await;
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    assert_eq!(sink.len(), 1);
}
