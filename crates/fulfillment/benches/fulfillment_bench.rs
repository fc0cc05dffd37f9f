use common::{Money, UserId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{NewOrder, NewProduct};
use fulfillment::{AddOrderItem, OrderFulfillment};
use store::{InMemoryStore, OrderStore, ProductStore};

fn bench_add_single_item(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("fulfillment/add_single_item", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryStore::new();
                let product = store
                    .create_product(NewProduct::new("Widget", Money::from_f64(10.0), 5, "tools"))
                    .await
                    .unwrap();
                let order = store
                    .create_order(NewOrder::for_user(UserId::new(1)))
                    .await
                    .unwrap();
                OrderFulfillment::new(store)
                    .add_order_item(AddOrderItem::new(order.id, product.id, 1))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_add_items_to_large_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("fulfillment/add_100_items", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryStore::new();
                let product = store
                    .create_product(NewProduct::new("Widget", Money::from_f64(1.5), 100, "tools"))
                    .await
                    .unwrap();
                let order = store
                    .create_order(NewOrder::for_user(UserId::new(1)))
                    .await
                    .unwrap();
                let workflow = OrderFulfillment::new(store);
                for _ in 0..100 {
                    workflow
                        .add_order_item(AddOrderItem::new(order.id, product.id, 1))
                        .await
                        .unwrap();
                }
            });
        });
    });
}

criterion_group!(benches, bench_add_single_item, bench_add_items_to_large_order);
criterion_main!(benches);
