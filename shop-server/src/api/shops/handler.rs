//! Shop API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::ApiResponse;
use shared::models::{Shop, ShopCreate, ShopSettingsUpdate};

use crate::core::ServerState;
use crate::db::repository::ShopRepository;
use crate::utils::{AppError, AppResult, ok};

/// POST /api/shops - 创建店铺
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ShopCreate>,
) -> AppResult<Json<ApiResponse<Shop>>> {
    let repo = ShopRepository::new(state.db.clone());
    let shop = repo.create(payload).await?;
    Ok(ok(shop))
}

/// GET /api/shops/:id - 获取店铺
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Shop>>> {
    let repo = ShopRepository::new(state.db.clone());
    let shop = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Shop {id}")))?;
    Ok(ok(shop))
}

/// PATCH /api/shops/:id/settings - 更新店铺设置
pub async fn update_settings(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ShopSettingsUpdate>,
) -> AppResult<Json<ApiResponse<Shop>>> {
    let repo = ShopRepository::new(state.db.clone());
    let shop = repo.update_settings(&id, payload).await?;
    Ok(ok(shop))
}
