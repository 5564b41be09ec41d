use std::sync::Arc;

use serde_json::json;

use shared::error::DomainError;
use shared::models::ProductCreate;

use super::*;
use crate::db::DbService;
use crate::db::repository::ProductRepository;

async fn setup() -> (Arc<InventoryService>, ProductRepository) {
    let db = DbService::new_in_memory().await.unwrap().db;
    (
        Arc::new(InventoryService::new(db.clone())),
        ProductRepository::new(db),
    )
}

async fn create_product(repo: &ProductRepository, sizes: serde_json::Value) -> String {
    let product = repo
        .create(ProductCreate {
            shop: "shop:1".to_string(),
            name: "Tee".to_string(),
            description: None,
            price: 120,
            sizes: Some(sizes),
            size_system: Some("Size".to_string()),
            sort_order: None,
        })
        .await
        .unwrap();
    product.id.unwrap()
}

#[tokio::test]
async fn decrement_then_availability() {
    let (inventory, repo) = setup().await;
    let id = create_product(&repo, json!({ "M": 3 })).await;

    inventory.decrement(&id, "M", 2).await.unwrap();
    assert_eq!(inventory.availability(&id, "M").await.unwrap(), 1);
}

#[tokio::test]
async fn insufficient_stock_leaves_record_unchanged() {
    let (inventory, repo) = setup().await;
    let id = create_product(&repo, json!({ "M": 2 })).await;

    let err = inventory.decrement(&id, "M", 5).await.unwrap_err();
    assert!(matches!(
        err,
        InventoryError::Domain(DomainError::InsufficientStock {
            requested: 5,
            available: 2
        })
    ));
    assert_eq!(inventory.availability(&id, "M").await.unwrap(), 2);
}

#[tokio::test]
async fn concurrent_decrement_of_last_unit() {
    // 两个并发请求抢同一规格的最后一件：恰好一个成功，
    // 另一个拿到 InsufficientStock，最终库存为 0（绝不是 -1）
    let (inventory, repo) = setup().await;
    let id = create_product(
        &repo,
        json!({
            "dimensions": ["Color", "Size"],
            "options": { "Color": ["Red"], "Size": ["M"] },
            "combinations": { "Red|M": 1 }
        }),
    )
    .await;

    let (a, b) = {
        let inv_a = inventory.clone();
        let inv_b = inventory.clone();
        let id_a = id.clone();
        let id_b = id.clone();
        tokio::join!(
            tokio::spawn(async move { inv_a.decrement(&id_a, "Red|M", 1).await }),
            tokio::spawn(async move { inv_b.decrement(&id_b, "Red|M", 1).await }),
        )
    };
    let results = [a.unwrap(), b.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one decrement must win");
    let loser = results.iter().find(|r| r.is_err()).unwrap();
    assert!(matches!(
        loser.as_ref().unwrap_err(),
        InventoryError::Domain(DomainError::InsufficientStock { .. })
    ));

    assert_eq!(inventory.availability(&id, "Red|M").await.unwrap(), 0);
}

#[tokio::test]
async fn malformed_sizes_reads_as_zero_but_rejects_writes() {
    let (inventory, repo) = setup().await;
    let id = create_product(&repo, json!({ "M": "three" })).await;

    // 读路径 fail closed
    assert_eq!(inventory.availability(&id, "M").await.unwrap(), 0);

    // 写路径报 MalformedVariantData
    let err = inventory.decrement(&id, "M", 1).await.unwrap_err();
    assert!(matches!(
        err,
        InventoryError::Domain(DomainError::MalformedVariantData { .. })
    ));
}

#[tokio::test]
async fn cart_decrement_compensates_on_failure() {
    let (inventory, repo) = setup().await;
    let ok_id = create_product(&repo, json!({ "M": 5 })).await;
    let short_id = create_product(&repo, json!({ "L": 1 })).await;

    let lines = [
        StockLine {
            product: ok_id.clone(),
            selection: Some("M".to_string()),
            quantity: 2,
        },
        StockLine {
            product: short_id.clone(),
            selection: Some("L".to_string()),
            quantity: 3,
        },
    ];
    let err = inventory.decrement_lines(&lines).await.unwrap_err();
    assert!(matches!(
        err,
        InventoryError::Domain(DomainError::InsufficientStock { .. })
    ));

    // 第一行已扣的库存必须补回
    assert_eq!(inventory.availability(&ok_id, "M").await.unwrap(), 5);
    assert_eq!(inventory.availability(&short_id, "L").await.unwrap(), 1);
}

#[tokio::test]
async fn restock_lines_returns_cancelled_stock() {
    let (inventory, repo) = setup().await;
    let id = create_product(&repo, json!({ "M": 5 })).await;

    inventory.decrement(&id, "M", 3).await.unwrap();
    inventory
        .restock_lines(&[StockLine {
            product: id.clone(),
            selection: Some("M".to_string()),
            quantity: 3,
        }])
        .await;
    assert_eq!(inventory.availability(&id, "M").await.unwrap(), 5);
}

#[tokio::test]
async fn untracked_lines_are_skipped() {
    let (inventory, _repo) = setup().await;
    // 无规格商品不触发库存操作，也不需要商品存在
    inventory
        .decrement_lines(&[StockLine {
            product: "product:999".to_string(),
            selection: None,
            quantity: 2,
        }])
        .await
        .unwrap();
}
