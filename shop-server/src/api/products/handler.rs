//! Product API Handlers
//!
//! 管理端通过 /variants 读写规范化的规格结构；落盘永远走
//! `VariantData::to_persisted`，三种历史形态只在读取时出现。

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use shared::ApiResponse;
use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::variant::{VariantData, VariantMode, parse_variant_data};

use crate::core::ServerState;
use crate::db::repository::ProductRepository;
use crate::utils::{AppError, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Shop reference ("shop:<id>")
    pub shop: String,
}

/// GET /api/products?shop=shop:... - 获取店铺商品列表
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_all(&query.shop).await?;
    Ok(ok(products))
}

/// GET /api/products/:id - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;
    Ok(ok(product))
}

/// POST /api/products - 创建商品
///
/// 带规格数据时先验证可解析，拒绝写入无法读回的结构
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    if let Some(sizes) = &payload.sizes {
        parse_variant_data(sizes, payload.size_system.as_deref())?;
    }
    if payload.price < 0 {
        return Err(AppError::validation("price cannot be negative"));
    }

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(payload).await?;
    Ok(ok(product))
}

/// PATCH /api/products/:id - 更新商品
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    if matches!(payload.price, Some(p) if p < 0) {
        return Err(AppError::validation("price cannot be negative"));
    }
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.update(&id, payload).await?;
    Ok(ok(product))
}

/// DELETE /api/products/:id - 删除商品
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let repo = ProductRepository::new(state.db.clone());
    let deleted = repo.delete(&id).await?;
    Ok(ok(deleted))
}

/// GET /api/products/:id/variants - 读取规范化规格结构
pub async fn get_variants(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<VariantData>>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;
    let variant = parse_variant_data(&product.sizes, product.size_system.as_deref())?;
    Ok(ok(variant))
}

/// PUT /api/products/:id/variants - 整体替换规格结构
///
/// 管理端编辑器提交规范化形态；这里回写为结构化落盘形态
pub async fn put_variants(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(variant): Json<VariantData>,
) -> AppResult<Json<ApiResponse<VariantData>>> {
    // 往返解析一次，保证写入的结构自洽（双维补齐缺失组合）
    let normalized = parse_variant_data(&variant.to_persisted(), Some(&variant.dimension1))?;

    let size_system = match normalized.mode {
        VariantMode::None => None,
        _ => Some(normalized.dimension1.clone()),
    };
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .replace_sizes(&id, normalized.to_persisted(), size_system)
        .await?;
    let variant = parse_variant_data(&product.sizes, product.size_system.as_deref())?;
    Ok(ok(variant))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Variant key ("M" or "Red|M")
    pub selection: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub selection: String,
    pub available: i64,
}

/// GET /api/products/:id/availability?selection=Red|M - 查询剩余库存
pub async fn availability(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<ApiResponse<AvailabilityResponse>>> {
    let available = state.inventory.availability(&id, &query.selection).await?;
    Ok(ok(AvailabilityResponse {
        selection: query.selection,
        available,
    }))
}
