//! 订单工作流集成测试 - 库存扣减 / 回补 / 订单号 / 状态流转
//!
//! 每个测试使用独立的 RocksDB 临时目录

mod common;

use common::{TestEnv, order_input};
use shared::models::{OrderStatus, StatsPeriod};
use store_server::OrderError;
use store_server::db::models::{OrderCreate, OrderQuery, ProductPatch};
use store_server::db::repository::{CounterRepository, OrderRepository};
use store_server::db::repository::counter::ORDER_NUMBER_SEQUENCE;
use store_server::orders::resolve_filter;

// ========================================================================
// Create
// ========================================================================

#[tokio::test]
async fn test_create_order_snapshots_amount_and_takes_stock() {
    let env = TestEnv::new().await;
    let x = env.product("Silk set", 100.0, 10.0, 5).await;

    let order = env
        .state
        .orders
        .create(order_input(&[(&x.id, 2, "M")]))
        .await
        .unwrap();

    assert_eq!(order.amount, 180.0);
    assert_eq!(order.delivery_price, 20.0);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.order_number, "ORD000001");
    assert_eq!(order.customer_info.full_name, "Amina Benali");
    assert_eq!(order.items.len(), 1);
    let line = &order.items[0];
    assert_eq!(line.product_id, x.id);
    let product = line.product.as_ref().unwrap();
    assert_eq!(product.title, "Silk set");
    assert_eq!(product.category.as_ref().unwrap().name, "Pajamas");

    assert_eq!(env.stock(&x.id).await, 3);
}

#[tokio::test]
async fn test_insufficient_stock_rejected_without_side_effects() {
    let env = TestEnv::new().await;
    let x = env.product("Silk set", 100.0, 0.0, 5).await;

    let err = env
        .state
        .orders
        .create(order_input(&[(&x.id, 6, "M")]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        OrderError::InsufficientStock {
            available: 5,
            requested: 6,
            ..
        }
    ));
    assert!(err.to_string().contains("Available: 5, Requested: 6"));
    assert_eq!(env.stock(&x.id).await, 5);

    // The counter was not advanced by the failed attempt
    let counter = CounterRepository::new(env.state.db.clone());
    assert_eq!(counter.current(ORDER_NUMBER_SEQUENCE).await.unwrap(), 0);
    let order = env
        .state
        .orders
        .create(order_input(&[(&x.id, 5, "M")]))
        .await
        .unwrap();
    assert_eq!(order.order_number, "ORD000001");
    assert_eq!(env.stock(&x.id).await, 0);
}

#[tokio::test]
async fn test_failed_item_leaves_every_product_untouched() {
    let env = TestEnv::new().await;
    let a = env.product("Cotton set", 60.0, 0.0, 4).await;
    let b = env.product("Robe", 80.0, 0.0, 4).await;

    // Second item has a size the product does not come in
    let err = env
        .state
        .orders
        .create(order_input(&[(&a.id, 2, "M"), (&b.id, 1, "XXL")]))
        .await
        .unwrap_err();
    match err {
        OrderError::InvalidSize {
            size, available, ..
        } => {
            assert_eq!(size, "XXL");
            assert_eq!(available, vec!["S", "M", "L"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Unknown product
    let err = env
        .state
        .orders
        .create(order_input(&[(&a.id, 1, "M"), ("missing", 1, "M")]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::ProductNotFound(ref id) if id == "missing"));

    // Same product twice: each line fits, together they do not
    let err = env
        .state
        .orders
        .create(order_input(&[(&a.id, 3, "M"), (&a.id, 3, "L")]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InsufficientStock { .. }));

    assert_eq!(env.stock(&a.id).await, 4);
    assert_eq!(env.stock(&b.id).await, 4);
    let orders = env.state.orders.list(&Default::default()).await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn test_create_validation_errors() {
    let env = TestEnv::new().await;
    let x = env.product("Silk set", 100.0, 0.0, 5).await;

    let err = env
        .state
        .orders
        .create(OrderCreate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::MissingItems));

    let err = env
        .state
        .orders
        .create(order_input(&[]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::MissingItems));

    let err = env
        .state
        .orders
        .create(order_input(&[(&x.id, 0, "M")]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidQuantity(0)));

    let mut input = order_input(&[(&x.id, 1, "M")]);
    input.delivery_price = Some(-5.0);
    let err = env.state.orders.create(input).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidDeliveryPrice(_)));

    let mut input = order_input(&[(&x.id, 1, "M")]);
    input.status = Some("cancelled".into());
    let err = env.state.orders.create(input).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidStatus(_)));

    let mut input = order_input(&[(&x.id, 1, "M")]);
    input.status = Some("refunded".into());
    let err = env.state.orders.create(input).await.unwrap_err();
    assert!(matches!(err, OrderError::InvalidStatus(_)));

    assert_eq!(env.stock(&x.id).await, 5);
}

#[tokio::test]
async fn test_inactive_product_cannot_be_ordered() {
    let env = TestEnv::new().await;
    let x = env.product("Old robe", 50.0, 0.0, 5).await;
    env.products()
        .update(
            &x.id,
            ProductPatch {
                is_active: Some(false),
                updated_at: 1,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = env
        .state
        .orders
        .create(order_input(&[(&x.id, 1, "M")]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::ProductInactive(ref title) if title == "Old robe"));
    assert_eq!(env.stock(&x.id).await, 5);
}

#[tokio::test]
async fn test_admin_order_keeps_requested_status() {
    let env = TestEnv::new().await;
    let x = env.product("Silk set", 100.0, 0.0, 5).await;

    let mut input = order_input(&[(&x.id, 1, "S")]);
    input.status = Some("confirmed".into());
    input.is_admin_order = Some(true);
    input.notes = Some("  phone order  ".into());
    let order = env.state.orders.create(input).await.unwrap();

    assert_eq!(order.status, OrderStatus::Confirmed);
    assert!(order.is_admin_order);
    assert_eq!(order.notes, "phone order");
}

// ========================================================================
// Concurrency and numbering
// ========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_never_oversell() {
    const STOCK: i64 = 5;
    const BUYERS: usize = 8;

    let env = TestEnv::new().await;
    let x = env.product("Last units", 40.0, 0.0, STOCK).await;

    let mut tasks = Vec::new();
    for _ in 0..BUYERS {
        let orders = env.state.orders.clone();
        let input = order_input(&[(&x.id, 1, "M")]);
        tasks.push(tokio::spawn(async move { orders.create(input).await }));
    }

    let mut committed = 0i64;
    for task in tasks {
        match task.await.unwrap() {
            Ok(order) => committed += order.items[0].quantity,
            Err(e) => assert!(
                matches!(e, OrderError::InsufficientStock { .. }),
                "unexpected error: {e:?}"
            ),
        }
    }

    // Write conflicts are retried, so every unit sells and nothing more
    assert_eq!(committed, STOCK);
    assert_eq!(env.stock(&x.id).await, 0);

    let orders = env.state.orders.list(&Default::default()).await.unwrap();
    assert_eq!(orders.len() as i64, STOCK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_on_different_products_all_succeed() {
    const BUYERS: usize = 6;

    let env = TestEnv::new().await;
    let mut products = Vec::new();
    for i in 0..BUYERS {
        products.push(env.product(&format!("Set {i}"), 30.0, 0.0, 10).await);
    }

    let mut tasks = Vec::new();
    for product in &products {
        let orders = env.state.orders.clone();
        let input = order_input(&[(&product.id, 1, "S")]);
        tasks.push(tokio::spawn(async move { orders.create(input).await }));
    }

    let mut numbers = Vec::new();
    for task in tasks {
        let order = task.await.unwrap().expect("independent orders must not fail");
        numbers.push(order.order_number);
    }
    numbers.sort();
    let expected: Vec<String> = (1..=BUYERS).map(|n| format!("ORD{n:06}")).collect();
    assert_eq!(numbers, expected);

    for product in &products {
        assert_eq!(env.stock(&product.id).await, 9);
    }
}

#[tokio::test]
async fn test_order_numbers_are_sequential_and_unique() {
    let env = TestEnv::new().await;
    let x = env.product("Basic tee", 20.0, 0.0, 100).await;

    let mut numbers = Vec::new();
    for _ in 0..5 {
        let order = env
            .state
            .orders
            .create(order_input(&[(&x.id, 1, "L")]))
            .await
            .unwrap();
        numbers.push(order.order_number);
    }

    assert_eq!(
        numbers,
        vec!["ORD000001", "ORD000002", "ORD000003", "ORD000004", "ORD000005"]
    );

    // Purging an order never frees its number
    let last = env.state.orders.get_by_number("ORD000005").await.unwrap();
    env.state.orders.delete(&last.id).await.unwrap();
    let next = env
        .state
        .orders
        .create(order_input(&[(&x.id, 1, "L")]))
        .await
        .unwrap();
    assert_eq!(next.order_number, "ORD000006");
}

#[tokio::test]
async fn test_amount_is_not_recomputed_after_price_change() {
    let env = TestEnv::new().await;
    let x = env.product("Silk set", 100.0, 10.0, 5).await;
    let order = env
        .state
        .orders
        .create(order_input(&[(&x.id, 2, "M")]))
        .await
        .unwrap();

    env.products()
        .update(
            &x.id,
            ProductPatch {
                price: Some(250.0),
                discount_percentage: Some(0.0),
                updated_at: 1,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reloaded = env.state.orders.get(&order.id).await.unwrap();
    assert_eq!(reloaded.amount, 180.0);
    assert_eq!(reloaded.items[0].product.as_ref().unwrap().price, 250.0);
}

// ========================================================================
// Cancellation and status
// ========================================================================

#[tokio::test]
async fn test_cancel_restores_each_line_exactly_once() {
    let env = TestEnv::new().await;
    let p1 = env.product("Cotton set", 60.0, 0.0, 10).await;
    let p2 = env.product("Robe", 80.0, 0.0, 10).await;

    let order = env
        .state
        .orders
        .create(order_input(&[(&p1.id, 2, "M"), (&p2.id, 3, "S")]))
        .await
        .unwrap();
    assert_eq!(env.stock(&p1.id).await, 8);
    assert_eq!(env.stock(&p2.id).await, 7);

    let cancelled = env.state.orders.cancel(&order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(env.stock(&p1.id).await, 10);
    assert_eq!(env.stock(&p2.id).await, 10);

    let err = env.state.orders.cancel(&order.id).await.unwrap_err();
    assert!(matches!(err, OrderError::AlreadyCancelled));
    assert_eq!(env.stock(&p1.id).await, 10);
    assert_eq!(env.stock(&p2.id).await, 10);
}

#[tokio::test]
async fn test_cancel_skips_deleted_products() {
    let env = TestEnv::new().await;
    let kept = env.product("Cotton set", 60.0, 0.0, 10).await;
    let gone = env.product("Robe", 80.0, 0.0, 10).await;

    let order = env
        .state
        .orders
        .create(order_input(&[(&kept.id, 1, "M"), (&gone.id, 1, "M")]))
        .await
        .unwrap();
    env.products().delete(&gone.id).await.unwrap();

    let cancelled = env.state.orders.cancel(&order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(env.stock(&kept.id).await, 10);
    assert!(env.products().find_by_id(&gone.id).await.unwrap().is_none());

    let gone_line = cancelled
        .items
        .iter()
        .find(|line| line.product_id == gone.id)
        .unwrap();
    assert!(gone_line.product.is_none());
}

#[tokio::test]
async fn test_cancel_unknown_order() {
    let env = TestEnv::new().await;
    let err = env.state.orders.cancel("nope").await.unwrap_err();
    assert!(matches!(err, OrderError::OrderNotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cancels_restore_once() {
    let env = TestEnv::new().await;
    let x = env.product("Cotton set", 50.0, 0.0, 10).await;
    let y = env.product("Satin set", 70.0, 0.0, 10).await;
    let order = env
        .state
        .orders
        .create(order_input(&[(&x.id, 2, "M"), (&y.id, 3, "L")]))
        .await
        .unwrap();
    assert_eq!(env.stock(&x.id).await, 8);
    assert_eq!(env.stock(&y.id).await, 7);

    let mut tasks = Vec::new();
    for i in 0..8 {
        let orders = env.state.orders.clone();
        let id = order.id.clone();
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                orders.cancel(&id).await
            } else {
                orders.update_status(&id, "cancelled").await
            }
        }));
    }

    let mut succeeded = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(view) => {
                assert_eq!(view.status, OrderStatus::Cancelled);
                succeeded += 1;
            }
            Err(e) => assert!(
                matches!(e, OrderError::AlreadyCancelled),
                "unexpected error: {e:?}"
            ),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(env.stock(&x.id).await, 10);
    assert_eq!(env.stock(&y.id).await, 10);
}

#[tokio::test]
async fn test_failed_restore_keeps_order_cancelled() {
    let env = TestEnv::new().await;
    let x = env.product("Velvet robe", 90.0, 0.0, 10).await;
    let y = env.product("Lace set", 60.0, 0.0, 3).await;
    let order = env
        .state
        .orders
        .create(order_input(&[(&x.id, 6, "M"), (&y.id, 1, "S")]))
        .await
        .unwrap();

    // Restoring x would bring it to 10, which the field assertion rejects
    env.state
        .db
        .query("DEFINE FIELD quantity ON TABLE product ASSERT $value <= 5")
        .await
        .unwrap()
        .check()
        .unwrap();

    let err = env.state.orders.cancel(&order.id).await.unwrap_err();
    assert!(matches!(err, OrderError::Repo(_)), "unexpected error: {err:?}");

    let stored = OrderRepository::new(env.state.db.clone())
        .find_by_id(&order.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, OrderStatus::Cancelled);

    // The failing line stays as it was; the other line is still restored
    assert_eq!(env.stock(&x.id).await, 4);
    assert_eq!(env.stock(&y.id).await, 3);

    // A retry cannot apply the restore a second time
    let err = env.state.orders.cancel(&order.id).await.unwrap_err();
    assert!(matches!(err, OrderError::AlreadyCancelled));
    assert_eq!(env.stock(&y.id).await, 3);
}

#[tokio::test]
async fn test_status_update_into_cancelled_restores_once() {
    let env = TestEnv::new().await;
    let x = env.product("Silk set", 100.0, 0.0, 5).await;
    let order = env
        .state
        .orders
        .create(order_input(&[(&x.id, 2, "M")]))
        .await
        .unwrap();

    let shipped = env
        .state
        .orders
        .update_status(&order.id, "shipped")
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert_eq!(env.stock(&x.id).await, 3);

    let cancelled = env
        .state
        .orders
        .update_status(&order.id, "cancelled")
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(env.stock(&x.id).await, 5);

    // Neither path restores a second time
    assert!(matches!(
        env.state.orders.update_status(&order.id, "cancelled").await,
        Err(OrderError::AlreadyCancelled)
    ));
    assert!(matches!(
        env.state.orders.cancel(&order.id).await,
        Err(OrderError::AlreadyCancelled)
    ));
    assert_eq!(env.stock(&x.id).await, 5);
}

#[tokio::test]
async fn test_cancelled_order_cannot_be_reopened() {
    let env = TestEnv::new().await;
    let x = env.product("Silk set", 100.0, 0.0, 5).await;
    let order = env
        .state
        .orders
        .create(order_input(&[(&x.id, 2, "M")]))
        .await
        .unwrap();
    env.state.orders.cancel(&order.id).await.unwrap();

    let err = env
        .state
        .orders
        .update_status(&order.id, "pending")
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::ReopenCancelled(OrderStatus::Pending)));

    let err = env
        .state
        .orders
        .update_status(&order.id, "refunded")
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidStatus(_)));

    let reloaded = env.state.orders.get(&order.id).await.unwrap();
    assert_eq!(reloaded.status, OrderStatus::Cancelled);
    assert_eq!(env.stock(&x.id).await, 5);
}

// ========================================================================
// Queries
// ========================================================================

#[tokio::test]
async fn test_list_filters_and_lookups() {
    let env = TestEnv::new().await;
    let x = env.product("Silk set", 100.0, 0.0, 20).await;

    let first = env
        .state
        .orders
        .create(order_input(&[(&x.id, 1, "M")]))
        .await
        .unwrap();
    // distinct created_at for the ordering check
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let mut input = order_input(&[(&x.id, 1, "M")]);
    input.customer_info.as_mut().unwrap().full_name = "Yacine Haddad".into();
    let second = env.state.orders.create(input).await.unwrap();
    env.state
        .orders
        .update_status(&second.id, "delivered")
        .await
        .unwrap();

    let all = env.state.orders.list(&Default::default()).await.unwrap();
    assert_eq!(all.len(), 2);
    // Newest first
    assert_eq!(all[0].id, second.id);

    let query = OrderQuery {
        status: Some("delivered".into()),
        ..Default::default()
    };
    let delivered = env
        .state
        .orders
        .list(&resolve_filter(query, chrono_tz::UTC).unwrap())
        .await
        .unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].id, second.id);

    let query = OrderQuery {
        search: Some("yacine".into()),
        ..Default::default()
    };
    let found = env
        .state
        .orders
        .list(&resolve_filter(query, chrono_tz::UTC).unwrap())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let query = OrderQuery {
        search: Some("ord000001".into()),
        ..Default::default()
    };
    let found = env
        .state
        .orders
        .list(&resolve_filter(query, chrono_tz::UTC).unwrap())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, first.id);

    let by_number = env.state.orders.get_by_number("ORD000002").await.unwrap();
    assert_eq!(by_number.id, second.id);
    assert!(matches!(
        env.state.orders.get_by_number("ORD999999").await,
        Err(OrderError::OrderNotFound(_))
    ));

    let by_ids = env
        .state
        .orders
        .get_by_ids(&[first.id.clone(), "unknown".into()])
        .await
        .unwrap();
    assert_eq!(by_ids.len(), 1);

    env.state.orders.delete(&first.id).await.unwrap();
    assert!(matches!(
        env.state.orders.delete(&first.id).await,
        Err(OrderError::OrderNotFound(_))
    ));
    // Purge does not restore stock
    assert_eq!(env.stock(&x.id).await, 18);
}

// ========================================================================
// Statistics
// ========================================================================

#[tokio::test]
async fn test_today_stats_exclude_cancelled_orders() {
    let env = TestEnv::new().await;
    let a = env.product("Cotton set", 100.0, 0.0, 10).await;
    let b = env.product("Robe", 200.0, 0.0, 10).await;
    let c = env.product("Silk set", 500.0, 0.0, 10).await;

    env.state
        .orders
        .create(order_input(&[(&a.id, 1, "M")]))
        .await
        .unwrap();
    env.state
        .orders
        .create(order_input(&[(&b.id, 1, "M")]))
        .await
        .unwrap();
    let cancelled = env
        .state
        .orders
        .create(order_input(&[(&c.id, 1, "M")]))
        .await
        .unwrap();
    env.state.orders.cancel(&cancelled.id).await.unwrap();

    let report = env.state.stats.advanced(StatsPeriod::Today).await.unwrap();
    assert_eq!(report.revenue, 300.0);
    assert_eq!(report.total_orders, 2);
    assert_eq!(report.average_order_value, 150.0);
    // cost is half the price in the fixtures
    assert_eq!(report.total_cost, 150.0);
    assert_eq!(report.total_delivery_cost, 40.0);
    assert_eq!(report.net_profit, 110.0);
    assert_eq!(report.daily_sales.len(), 7);
    assert_eq!(report.daily_sales[6].orders, 2);
    let cancelled_count = report
        .order_status_stats
        .iter()
        .find(|s| s.status == OrderStatus::Cancelled)
        .unwrap()
        .count;
    assert_eq!(cancelled_count, 1);

    let summary = env.state.stats.summary().await.unwrap();
    assert_eq!(summary.total_orders, 3);
    assert_eq!(summary.pending_orders, 2);
    assert_eq!(summary.total_revenue, 300.0);
    assert_eq!(summary.average_order_value, 100.0);
}

#[tokio::test]
async fn test_product_stats() {
    let env = TestEnv::new().await;
    let a = env.product("Cotton set", 100.0, 0.0, 10).await;
    let b = env.product("Robe", 200.0, 50.0, 3).await;
    env.product("Sold out", 10.0, 0.0, 0).await;

    env.state
        .orders
        .create(order_input(&[(&a.id, 2, "M"), (&b.id, 3, "M")]))
        .await
        .unwrap();

    let stats = env.state.stats.product_stats().await.unwrap();
    assert_eq!(stats.total_products, 3);
    // a: 8 left, b: 0 left, "Sold out": 0
    assert_eq!(stats.in_stock, 1);
    assert_eq!(stats.low_stock, 0);
    assert_eq!(stats.out_of_stock, 2);

    assert_eq!(stats.top_selling.len(), 2);
    assert_eq!(stats.top_selling[0].product_id, b.id);
    assert_eq!(stats.top_selling[0].total_sold, 3);
    assert_eq!(stats.top_selling[0].total_revenue, 300.0);
    assert_eq!(stats.top_selling[1].name, "Cotton set");
}
