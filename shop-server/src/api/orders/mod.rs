//! Order API Module
//!
//! All mutations go through the OrdersManager; reads come straight from
//! the repository.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).patch(handler::apply_action))
        .route("/{id}/notes", post(handler::add_note))
        .route("/{id}/payment-proof", post(handler::upload_payment_proof))
        .route("/{id}/payment-attempts", get(handler::list_payment_attempts))
}
