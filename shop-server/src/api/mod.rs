//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`shops`] - 店铺管理接口
//! - [`products`] - 商品与规格管理接口
//! - [`checkout`] - 结账报价接口
//! - [`orders`] - 订单接口（下单、流转、备注、付款凭证）
//! - [`payments`] - 支付网关回调接口

pub mod checkout;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;
pub mod shops;

use axum::Router;

use crate::core::ServerState;

/// 组装全部路由
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(shops::router())
        .merge(products::router())
        .merge(checkout::router())
        .merge(orders::router())
        .merge(payments::router())
}
