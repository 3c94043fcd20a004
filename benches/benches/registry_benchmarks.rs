use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use eventdispatch::{EventDispatcher, Handler};

fn bench_subscribe_same_handler(c: &mut Criterion) {
    let dispatcher = EventDispatcher::<String>::new();
    let handler = Handler::from_sync(|_| ());
    c.bench_function("subscribe_same_handler", |b| {
        b.iter(|| dispatcher.subscribe(black_box("chan"), handler.clone()))
    });
}

fn bench_subscribe_unsubscribe(c: &mut Criterion) {
    let dispatcher = EventDispatcher::<String>::new();
    let handler = Handler::from_sync(|_| ());
    c.bench_function("subscribe_unsubscribe", |b| {
        b.iter(|| {
            dispatcher.subscribe("chan", handler.clone());
            dispatcher.unsubscribe(black_box("chan"), &handler);
        })
    });
}

fn bench_is_subscribed(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_subscribed");
    for n in [1usize, 16, 256] {
        let dispatcher = EventDispatcher::<String>::new();
        let handlers: Vec<Handler> = (0..n).map(|_| Handler::from_sync(|_| ())).collect();
        for h in &handlers {
            dispatcher.subscribe("chan", h.clone());
        }
        let probe = &handlers[n / 2];
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(dispatcher.is_subscribed("chan", probe)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_subscribe_same_handler,
    bench_subscribe_unsubscribe,
    bench_is_subscribed
);
criterion_main!(benches);
