use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use eventdispatch::{arguments, wait_all, EventDispatcher, Handler};
use tokio::runtime::Runtime;

fn bench_publish_no_subscribers(c: &mut Criterion) {
    let dispatcher = EventDispatcher::<String>::new();
    c.bench_function("publish_0_subs", |b| {
        b.iter(|| black_box(dispatcher.publish_empty("chan")))
    });
}

fn bench_publish_fan_out(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("publish_fan_out");

    for n in [1usize, 10, 100] {
        let dispatcher = EventDispatcher::<String>::new().with_runtime(rt.handle().clone());
        for _ in 0..n {
            dispatcher.subscribe("chan", Handler::from_sync(|_| ()));
        }

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.to_async(&rt).iter(|| async {
                let handles = dispatcher.publish("chan", arguments!("value" => 1));
                black_box(wait_all(handles).await)
            })
        });
    }
    group.finish();
}

fn bench_publish_async_handlers(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let dispatcher = EventDispatcher::<String>::new().with_runtime(rt.handle().clone());
    for _ in 0..10 {
        dispatcher.subscribe(
            "chan",
            Handler::new(|_| async {
                tokio::task::yield_now().await;
                Ok::<_, anyhow::Error>(())
            }),
        );
    }

    c.bench_function("publish_10_async_subs", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(wait_all(dispatcher.publish_empty("chan")).await)
        })
    });
}

criterion_group!(
    benches,
    bench_publish_no_subscribers,
    bench_publish_fan_out,
    bench_publish_async_handlers
);
criterion_main!(benches);
