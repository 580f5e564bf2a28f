use common::{Money, UserId};
use coordinator::{
    CreateOrder, InMemoryOrderCache, InMemoryPublisher, OrderCache, OrderCoordinator, UpdateOrder,
};
use criterion::{Criterion, criterion_group, criterion_main};
use order_store::{InMemoryOrderStore, PageRequest};

type BenchCoordinator =
    OrderCoordinator<InMemoryOrderStore, InMemoryOrderCache, InMemoryPublisher>;

fn new_coordinator() -> BenchCoordinator {
    OrderCoordinator::new(
        InMemoryOrderStore::new(),
        InMemoryOrderCache::new(),
        InMemoryPublisher::new(),
    )
}

fn widget(user_id: UserId) -> CreateOrder {
    CreateOrder::new(user_id, "Widget", 3, Money::from_cents(999))
}

fn bench_create_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("coordinator/create_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                let coordinator = new_coordinator();
                coordinator.create_order(widget(UserId::new())).await.unwrap();
            });
        });
    });
}

fn bench_get_order_hit(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let coordinator = new_coordinator();
    let order = rt.block_on(async {
        coordinator
            .create_order(widget(UserId::new()))
            .await
            .unwrap()
            .value
    });

    c.bench_function("coordinator/get_order_hit", |b| {
        b.iter(|| {
            rt.block_on(async {
                coordinator.get_order(order.id).await.unwrap();
            });
        });
    });
}

fn bench_get_order_miss(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let coordinator = new_coordinator();
    let order = rt.block_on(async {
        coordinator
            .create_order(widget(UserId::new()))
            .await
            .unwrap()
            .value
    });

    c.bench_function("coordinator/get_order_miss", |b| {
        b.iter(|| {
            rt.block_on(async {
                coordinator.cache().remove(order.id).await.unwrap();
                coordinator.get_order(order.id).await.unwrap();
            });
        });
    });
}

fn bench_update_delete_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let coordinator = new_coordinator();
    let user_id = UserId::new();

    c.bench_function("coordinator/create_update_delete", |b| {
        b.iter(|| {
            rt.block_on(async {
                let order = coordinator.create_order(widget(user_id)).await.unwrap().value;
                coordinator
                    .update_order(UpdateOrder::new(
                        order.id,
                        "Gadget",
                        Money::from_cents(1500),
                        2,
                    ))
                    .await
                    .unwrap();
                coordinator.delete_order(order.id).await.unwrap();
            });
        });
    });
}

fn bench_list_orders(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let coordinator = new_coordinator();
    let user_id = UserId::new();
    rt.block_on(async {
        for _ in 0..100 {
            coordinator.create_order(widget(user_id)).await.unwrap();
        }
    });

    c.bench_function("coordinator/list_orders_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                coordinator
                    .list_orders(user_id, PageRequest::new(2, 20))
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_create_order,
    bench_get_order_hit,
    bench_get_order_miss,
    bench_update_delete_cycle,
    bench_list_orders,
);
criterion_main!(benches);
