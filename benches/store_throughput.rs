use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use tokio::runtime::Runtime;
use uniflow::reducer::{self, NewsSink};
use uniflow::store::{Store, StoreConfig};

const BATCH_SIZES: &[usize] = &[64, 256, 1024];

async fn drive_store(total: usize) {
    let store: Store<u64, u64, ()> = Store::builder(0_u64)
        .with_reducer(reducer::from_fn(
            |state: &u64, action: &u64, _news: &mut NewsSink<()>| Ok(state + action),
        ))
        .with_config(StoreConfig::default().with_action_buffer(total))
        .build()
        .expect("store");

    let mut results = store.subscribe();
    for _ in 0..total {
        store.publish(vec![1]).expect("publish");
    }

    loop {
        let result = results.recv().await.expect("result");
        if result.state == total as u64 {
            break;
        }
    }

    store.dispose().await;
}

fn store_throughput(c: &mut Criterion) {
    let runtime = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("store_publish_reduce");

    for &batch in BATCH_SIZES {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &size| {
            b.to_async(&runtime).iter(|| drive_store(size));
        });
    }

    group.finish();
}

criterion_group!(benches, store_throughput);
criterion_main!(benches);
