use super::*;

use serde_json::json;

use shared::models::{ProductCreate, Shop, ShopCreate};
use shared::order::PaymentStatus;

use crate::core::{Config, ServerState};
use crate::db::DbService;
use crate::db::repository::{ProductRepository, ShopRepository};

fn test_config() -> Config {
    Config {
        work_dir: ".".into(),
        http_port: 0,
        environment: "test".into(),
        log_level: "info".into(),
        log_dir: None,
        request_timeout_ms: 5_000,
    }
}

async fn create_test_state() -> ServerState {
    let db = DbService::new_in_memory().await.unwrap().db;
    ServerState::with_db(test_config(), db)
}

async fn create_shop(state: &ServerState) -> Shop {
    ShopRepository::new(state.db.clone())
        .create(ShopCreate {
            name: "Mori Lifestyle".to_string(),
            slug: "mori".to_string(),
            currency: None,
            order_prefix: None,
            shipping: None,
            enabled_payment_methods: None,
        })
        .await
        .unwrap()
}

async fn create_product(
    state: &ServerState,
    shop: &Shop,
    name: &str,
    price: i64,
    sizes: serde_json::Value,
) -> String {
    ProductRepository::new(state.db.clone())
        .create(ProductCreate {
            shop: shop.id.clone().unwrap(),
            name: name.to_string(),
            description: None,
            price,
            sizes: Some(sizes),
            size_system: Some("Size".to_string()),
            sort_order: None,
        })
        .await
        .unwrap()
        .id
        .unwrap()
}

fn cart_line(product: &str, variant_key: Option<&str>, quantity: i32) -> CartLine {
    CartLine {
        product: product.to_string(),
        variant_key: variant_key.map(str::to_string),
        quantity,
    }
}

fn checkout_request(shop: &Shop, items: Vec<CartLine>) -> CreateOrderRequest {
    CreateOrderRequest {
        shop: shop.id.clone().unwrap(),
        items,
        delivery_method: DeliveryMethod::Home,
        region: Region::Kowloon,
        payment_method: "fps".to_string(),
        customer_name: "Chan Tai Man".to_string(),
        customer_contact: "+852 9123 4567".to_string(),
        discount: 0,
    }
}

/// 建店 + 建品 (M 码 10 件) + 下一单两件，返回 (shop, product_id, order)
async fn setup_with_order(state: &ServerState) -> (Shop, String, Order) {
    let shop = create_shop(state).await;
    let product = create_product(state, &shop, "Canvas Tote", 150, json!({ "M": 10 })).await;
    let order = state
        .orders
        .create_order(checkout_request(
            &shop,
            vec![cart_line(&product, Some("M"), 2)],
        ))
        .await
        .unwrap();
    (shop, product, order)
}

/// 把订单推进到已上传付款凭证并确认 (PENDING → PAID)
async fn pay_order(state: &ServerState, order_id: &str) -> Order {
    state
        .orders
        .upload_payment_proof(order_id, "https://cdn.example/proof.jpg")
        .await
        .unwrap();
    state.orders.confirm_payment(order_id, "admin").await.unwrap()
}

fn assert_payment_status(order: &Order, expected: PaymentStatus) {
    assert_eq!(
        order.payment_status, expected,
        "Expected payment status {:?}, got {:?}",
        expected, order.payment_status
    );
}

mod test_checkout;
mod test_flows;
mod test_payment;
