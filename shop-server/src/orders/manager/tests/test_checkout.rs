use super::*;

use shared::error::DomainError;
use shared::order::OrderStatus;

use crate::pricing::compute_quote;

#[tokio::test]
async fn checkout_composes_order_and_commits_stock() {
    let state = create_test_state().await;
    let shop = create_shop(&state).await;
    let product = create_product(&state, &shop, "Canvas Tote", 150, json!({ "M": 10 })).await;

    let order = state
        .orders
        .create_order(checkout_request(
            &shop,
            vec![cart_line(&product, Some("M"), 3)],
        ))
        .await
        .unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert!(order.status_history.is_empty());
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].unit_price, 150);
    assert_eq!(order.items[0].quantity, 3);
    assert_eq!(order.amounts.subtotal, 450);
    // 450 < 600 免运费门槛，九龙上门 40
    assert_eq!(order.amounts.delivery_fee, 40);
    assert_eq!(order.amounts.total, 490);
    assert_eq!(order.amounts.currency, "HKD");
    assert!(order.order_number.starts_with("SL"));

    // 下单即占库存
    assert_eq!(state.inventory.availability(&product, "M").await.unwrap(), 7);
}

#[tokio::test]
async fn persisted_totals_match_the_quote_function() {
    // 报价端点展示的金额与订单持久化的金额同源同值
    let state = create_test_state().await;
    let shop = create_shop(&state).await;
    let product = create_product(&state, &shop, "Canvas Tote", 150, json!({ "M": 10 })).await;

    let mut req = checkout_request(&shop, vec![cart_line(&product, Some("M"), 3)]);
    req.region = Region::OutlyingIslands;
    let order = state.orders.create_order(req).await.unwrap();

    let quote = compute_quote(
        450,
        DeliveryMethod::Home,
        Region::OutlyingIslands,
        &shop.shipping,
        0,
    );
    assert_eq!(quote.shipping_total, 60);
    assert_eq!(order.amounts.delivery_fee, quote.shipping_total);
    assert_eq!(order.amounts.total, quote.total);
    assert_eq!(order.amounts.total, 510);
}

#[tokio::test]
async fn unit_price_is_captured_at_purchase_time() {
    let state = create_test_state().await;
    let shop = create_shop(&state).await;
    let product = create_product(&state, &shop, "Canvas Tote", 150, json!({ "M": 10 })).await;

    let order = state
        .orders
        .create_order(checkout_request(
            &shop,
            vec![cart_line(&product, Some("M"), 1)],
        ))
        .await
        .unwrap();

    // 商品提价不影响已下订单
    crate::db::repository::ProductRepository::new(state.db.clone())
        .update(
            &product,
            shared::models::ProductUpdate {
                price: Some(999),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reloaded = state.orders.get(&order.id.unwrap()).await.unwrap();
    assert_eq!(reloaded.items[0].unit_price, 150);
    assert_eq!(reloaded.amounts.subtotal, 150);
}

#[tokio::test]
async fn insufficient_stock_rejects_whole_checkout() {
    let state = create_test_state().await;
    let shop = create_shop(&state).await;
    let plenty = create_product(&state, &shop, "Mug", 80, json!({ "One Size": 10 })).await;
    let scarce = create_product(&state, &shop, "Limited Print", 300, json!({ "A3": 1 })).await;

    let err = state
        .orders
        .create_order(checkout_request(
            &shop,
            vec![
                cart_line(&plenty, Some("One Size"), 2),
                cart_line(&scarce, Some("A3"), 2),
            ],
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::Inventory(crate::inventory::InventoryError::Domain(
            DomainError::InsufficientStock {
                requested: 2,
                available: 1
            }
        ))
    ));

    // 整单拒绝：第一行已扣的库存被补偿，没有订单落库
    assert_eq!(
        state
            .inventory
            .availability(&plenty, "One Size")
            .await
            .unwrap(),
        10
    );
    let shop_id = shop.id.as_deref().unwrap();
    assert!(state.orders.list(Some(shop_id), None, 50, 0).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_variant_rejects_checkout() {
    let state = create_test_state().await;
    let shop = create_shop(&state).await;
    let product = create_product(&state, &shop, "Tote", 150, json!({ "M": 5 })).await;

    let err = state
        .orders
        .create_order(checkout_request(
            &shop,
            vec![cart_line(&product, Some("XXL"), 1)],
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::Inventory(crate::inventory::InventoryError::Domain(
            DomainError::UnknownVariant { .. }
        ))
    ));
}

#[tokio::test]
async fn order_numbers_are_sequential_per_shop() {
    let state = create_test_state().await;
    let shop = create_shop(&state).await;
    let product = create_product(&state, &shop, "Mug", 80, json!({ "One Size": 10 })).await;

    let first = state
        .orders
        .create_order(checkout_request(
            &shop,
            vec![cart_line(&product, Some("One Size"), 1)],
        ))
        .await
        .unwrap();
    let second = state
        .orders
        .create_order(checkout_request(
            &shop,
            vec![cart_line(&product, Some("One Size"), 1)],
        ))
        .await
        .unwrap();

    assert_ne!(first.order_number, second.order_number);
    let seq = |n: &str| n[n.len() - 4..].parse::<i64>().unwrap();
    assert_eq!(seq(&second.order_number), seq(&first.order_number) + 1);
}

#[tokio::test]
async fn disabled_payment_method_is_rejected() {
    let state = create_test_state().await;
    let shop = create_shop(&state).await;
    let product = create_product(&state, &shop, "Mug", 80, json!({ "One Size": 10 })).await;

    let mut req = checkout_request(&shop, vec![cart_line(&product, Some("One Size"), 1)]);
    req.payment_method = "bank_transfer".to_string();
    let err = state.orders.create_order(req).await.unwrap_err();
    assert!(matches!(err, ManagerError::PaymentMethodNotEnabled(_)));
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let state = create_test_state().await;
    let shop = create_shop(&state).await;

    let err = state
        .orders
        .create_order(checkout_request(&shop, vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::EmptyCart));
}

#[tokio::test]
async fn zero_quantity_is_rejected() {
    let state = create_test_state().await;
    let shop = create_shop(&state).await;
    let product = create_product(&state, &shop, "Mug", 80, json!({ "One Size": 10 })).await;

    let err = state
        .orders
        .create_order(checkout_request(
            &shop,
            vec![cart_line(&product, Some("One Size"), 0)],
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::InvalidQuantity { .. }));
}

#[tokio::test]
async fn discount_is_applied_and_floored() {
    let state = create_test_state().await;
    let shop = create_shop(&state).await;
    let product = create_product(&state, &shop, "Sticker", 10, json!({ "One Size": 10 })).await;

    let mut req = checkout_request(&shop, vec![cart_line(&product, Some("One Size"), 1)]);
    req.delivery_method = DeliveryMethod::Locker;
    req.discount = 500;
    let order = state.orders.create_order(req).await.unwrap();
    // 10 + 30 - 500 → 0，不出现负数
    assert_eq!(order.amounts.total, 0);
    assert_eq!(order.amounts.discount, 500);
}

#[tokio::test]
async fn dual_variant_checkout() {
    let state = create_test_state().await;
    let shop = create_shop(&state).await;
    let product = create_product(
        &state,
        &shop,
        "Logo Tee",
        180,
        json!({
            "dimensions": ["Color", "Size"],
            "options": { "Color": ["Red", "Blue"], "Size": ["S", "M"] },
            "combinations": { "Red|M": 4 }
        }),
    )
    .await;

    let order = state
        .orders
        .create_order(checkout_request(
            &shop,
            vec![cart_line(&product, Some("Red|M"), 2)],
        ))
        .await
        .unwrap();
    assert_eq!(order.items[0].variant_key.as_deref(), Some("Red|M"));
    assert_eq!(
        state
            .inventory
            .availability(&product, "Red|M")
            .await
            .unwrap(),
        2
    );

    // options 里存在但没有条目的组合是缺货，下单报 InsufficientStock
    let err = state
        .orders
        .create_order(checkout_request(
            &shop,
            vec![cart_line(&product, Some("Blue|S"), 1)],
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::Inventory(crate::inventory::InventoryError::Domain(
            DomainError::InsufficientStock {
                requested: 1,
                available: 0
            }
        ))
    ));
}
