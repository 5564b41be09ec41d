use super::*;

use shared::error::DomainError;
use shared::order::OrderStatus;

#[tokio::test]
async fn proof_upload_confirm_enters_paid() {
    let state = create_test_state().await;
    let (_, _, order) = setup_with_order(&state).await;
    let id = order.id.clone().unwrap();
    assert_payment_status(&order, PaymentStatus::Pending);

    let uploaded = state
        .orders
        .upload_payment_proof(&id, "https://cdn.example/fps-receipt.jpg")
        .await
        .unwrap();
    assert_payment_status(&uploaded, PaymentStatus::Uploaded);
    assert_eq!(
        uploaded.payment_proof.as_deref(),
        Some("https://cdn.example/fps-receipt.jpg")
    );

    let confirmed = state
        .orders
        .confirm_payment(&id, "admin@mori")
        .await
        .unwrap();
    assert_payment_status(&confirmed, PaymentStatus::Confirmed);
    assert_eq!(confirmed.status, OrderStatus::Paid);
    assert_eq!(confirmed.payment_confirmed_by.as_deref(), Some("admin@mori"));
    assert!(confirmed.payment_confirmed_at.is_some());
    assert!(confirmed.paid_at.is_some());

    let reloaded = state.orders.get(&id).await.unwrap();
    assert_eq!(reloaded.status, OrderStatus::Paid);
    assert_eq!(reloaded.status_history.len(), 1);
}

#[tokio::test]
async fn confirm_without_upload_fails() {
    let state = create_test_state().await;
    let (_, _, order) = setup_with_order(&state).await;
    let id = order.id.clone().unwrap();

    let err = state.orders.confirm_payment(&id, "admin").await.unwrap_err();
    assert!(matches!(
        err,
        ManagerError::Domain(DomainError::PaymentNotUploaded {
            current: PaymentStatus::Pending
        })
    ));

    let reloaded = state.orders.get(&id).await.unwrap();
    assert_eq!(reloaded.status, OrderStatus::Pending);
    assert_payment_status(&reloaded, PaymentStatus::Pending);
}

#[tokio::test]
async fn reject_appends_reason_note_and_allows_reupload() {
    let state = create_test_state().await;
    let (_, _, order) = setup_with_order(&state).await;
    let id = order.id.clone().unwrap();

    state
        .orders
        .upload_payment_proof(&id, "https://cdn.example/blurry.jpg")
        .await
        .unwrap();
    let rejected = state
        .orders
        .reject_payment(&id, Some("amount does not match"), "admin")
        .await
        .unwrap();
    assert_payment_status(&rejected, PaymentStatus::Rejected);
    assert_eq!(rejected.admin_notes.len(), 1);
    assert!(
        rejected.admin_notes.entries()[0]
            .note
            .contains("amount does not match")
    );
    // 订单状态不受影响
    assert_eq!(rejected.status, OrderStatus::Pending);

    // 拒绝后重新上传，再确认
    state
        .orders
        .upload_payment_proof(&id, "https://cdn.example/clear.jpg")
        .await
        .unwrap();
    let confirmed = state.orders.confirm_payment(&id, "admin").await.unwrap();
    assert_eq!(confirmed.status, OrderStatus::Paid);
}

#[tokio::test]
async fn reject_without_reason_adds_no_note() {
    let state = create_test_state().await;
    let (_, _, order) = setup_with_order(&state).await;
    let id = order.id.clone().unwrap();

    state
        .orders
        .upload_payment_proof(&id, "https://cdn.example/p.jpg")
        .await
        .unwrap();
    let rejected = state
        .orders
        .reject_payment(&id, None, "admin")
        .await
        .unwrap();
    assert!(rejected.admin_notes.is_empty());
}

#[tokio::test]
async fn upload_after_confirmation_is_rejected() {
    let state = create_test_state().await;
    let (_, _, order) = setup_with_order(&state).await;
    let id = order.id.clone().unwrap();

    pay_order(&state, &id).await;
    let err = state
        .orders
        .upload_payment_proof(&id, "https://cdn.example/again.jpg")
        .await
        .unwrap_err();
    assert!(matches!(err, ManagerError::PaymentAlreadyConfirmed(_)));
}

#[tokio::test]
async fn confirm_after_confirmed_order_moved_on_fails() {
    let state = create_test_state().await;
    let (_, _, order) = setup_with_order(&state).await;
    let id = order.id.clone().unwrap();

    pay_order(&state, &id).await;
    // PAID 之后 paymentStatus 已是 confirmed
    let err = state.orders.confirm_payment(&id, "admin").await.unwrap_err();
    assert!(matches!(
        err,
        ManagerError::Domain(DomainError::PaymentNotUploaded {
            current: PaymentStatus::Confirmed
        })
    ));
}

#[tokio::test]
async fn legacy_paid_flow_continues_through_fulfilling() {
    let state = create_test_state().await;
    let (shop, product, order) = setup_with_order(&state).await;
    let id = order.id.clone().unwrap();

    pay_order(&state, &id).await;
    let outcome = state
        .orders
        .request_transition(&id, OrderStatus::Fulfilling, TransitionContext::default())
        .await
        .unwrap();
    assert_eq!(outcome.order.status, OrderStatus::Fulfilling);
    assert!(outcome.order.fulfilling_at.is_some());

    // PAID 也可以直接进入争议并终止
    let disputed_order = state
        .orders
        .create_order(checkout_request(
            &shop,
            vec![cart_line(&product, Some("M"), 1)],
        ))
        .await
        .unwrap();
    let disputed_id = disputed_order.id.clone().unwrap();
    pay_order(&state, &disputed_id).await;
    let outcome = state
        .orders
        .request_transition(&disputed_id, OrderStatus::Disputed, TransitionContext::default())
        .await
        .unwrap();
    assert_eq!(outcome.order.status, OrderStatus::Disputed);
    assert!(outcome.order.disputed_at.is_some());
    assert!(outcome.restock_lines.is_empty());
}
