use super::*;

use shared::error::DomainError;
use shared::order::OrderStatus;

#[tokio::test]
async fn full_lifecycle_history_chain() {
    let state = create_test_state().await;
    let (_, _, order) = setup_with_order(&state).await;
    let id = order.id.clone().unwrap();

    pay_order(&state, &id).await;
    for target in [
        OrderStatus::Fulfilling,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Completed,
    ] {
        state
            .orders
            .request_transition(&id, target, TransitionContext::default())
            .await
            .unwrap();
    }

    let reloaded = state.orders.get(&id).await.unwrap();
    assert_eq!(reloaded.status, OrderStatus::Completed);

    // N 次成功流转 → N 条历史；相邻条目首尾相接，时间戳不回退
    let entries = reloaded.status_history.entries();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0].from_status, OrderStatus::Pending);
    assert_eq!(entries[0].to_status, OrderStatus::Paid);
    for pair in entries.windows(2) {
        assert_eq!(pair[0].to_status, pair[1].from_status);
        assert!(pair[0].timestamp <= pair[1].timestamp);
    }
}

#[tokio::test]
async fn lifecycle_timestamps_survive_unrelated_updates() {
    let state = create_test_state().await;
    let (_, _, order) = setup_with_order(&state).await;
    let id = order.id.clone().unwrap();

    pay_order(&state, &id).await;
    state
        .orders
        .request_transition(&id, OrderStatus::Fulfilling, TransitionContext::default())
        .await
        .unwrap();
    let shipped = state
        .orders
        .request_transition(
            &id,
            OrderStatus::Shipped,
            TransitionContext {
                tracking_number: Some("SF123456789HK".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .order;
    let shipped_at = shipped.shipped_at.unwrap();
    let paid_at = shipped.paid_at.unwrap();

    // 追加备注、继续流转，已写入的时间戳保持稳定
    state
        .orders
        .add_note(&id, "courier picked up", "admin")
        .await
        .unwrap();
    state
        .orders
        .request_transition(&id, OrderStatus::Delivered, TransitionContext::default())
        .await
        .unwrap();

    let reloaded = state.orders.get(&id).await.unwrap();
    assert_eq!(reloaded.shipped_at, Some(shipped_at));
    assert_eq!(reloaded.paid_at, Some(paid_at));
    assert_eq!(reloaded.tracking_number.as_deref(), Some("SF123456789HK"));
}

#[tokio::test]
async fn notes_accumulate_in_order() {
    let state = create_test_state().await;
    let (_, _, order) = setup_with_order(&state).await;
    let id = order.id.clone().unwrap();

    state
        .orders
        .add_note(&id, "customer asked for gift wrap", "alice")
        .await
        .unwrap();
    let updated = state
        .orders
        .add_note(&id, "wrapped and ready", "bob")
        .await
        .unwrap();

    let notes = updated.admin_notes.entries();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].note, "customer asked for gift wrap");
    assert_eq!(notes[0].author, "alice");
    assert_eq!(notes[1].note, "wrapped and ready");
    assert!(notes[0].timestamp <= notes[1].timestamp);

    let reloaded = state.orders.get(&id).await.unwrap();
    assert_eq!(reloaded.admin_notes.len(), 2);
}

#[tokio::test]
async fn empty_note_is_rejected() {
    let state = create_test_state().await;
    let (_, _, order) = setup_with_order(&state).await;
    let id = order.id.clone().unwrap();

    let err = state.orders.add_note(&id, "   ", "alice").await.unwrap_err();
    assert!(matches!(err, ManagerError::Domain(DomainError::EmptyNote)));

    let reloaded = state.orders.get(&id).await.unwrap();
    assert!(reloaded.admin_notes.is_empty());
}

#[tokio::test]
async fn list_filters_by_status() {
    let state = create_test_state().await;
    let shop = create_shop(&state).await;
    let product = create_product(&state, &shop, "Mug", 80, json!({ "One Size": 20 })).await;

    let mut cancelled_id = None;
    for i in 0..3 {
        let order = state
            .orders
            .create_order(checkout_request(
                &shop,
                vec![cart_line(&product, Some("One Size"), 1)],
            ))
            .await
            .unwrap();
        if i == 0 {
            cancelled_id = order.id.clone();
        }
    }
    state
        .orders
        .request_transition(
            cancelled_id.as_deref().unwrap(),
            OrderStatus::Cancelled,
            TransitionContext::default(),
        )
        .await
        .unwrap();

    let shop_id = shop.id.as_deref().unwrap();
    let all = state.orders.list(Some(shop_id), None, 50, 0).await.unwrap();
    assert_eq!(all.len(), 3);

    let pending = state
        .orders
        .list(Some(shop_id), Some(OrderStatus::Pending), 50, 0)
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);

    let cancelled = state
        .orders
        .list(Some(shop_id), Some(OrderStatus::Cancelled), 50, 0)
        .await
        .unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].id, cancelled_id);
}
