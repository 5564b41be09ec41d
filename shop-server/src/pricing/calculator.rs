//! Checkout total computation
//!
//! All amounts are whole HKD. The coupon discount arrives here as an
//! opaque, already-validated number from the coupon service.

use serde::Serialize;

use shared::models::ShippingSettings;
use shared::order::{DeliveryMethod, Region};

/// Fee breakdown for one checkout
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutQuote {
    pub subtotal: i64,
    pub base_shipping: i64,
    pub island_surcharge: i64,
    pub shipping_total: i64,
    pub discount: i64,
    pub total: i64,
    pub free_shipping: bool,
}

/// Compute the checkout totals
///
/// Rules:
/// - subtotal at or above the threshold ships free (and waives the
///   outlying-islands surcharge with it)
/// - the islands surcharge applies to home delivery only
/// - the coupon discount never drives the total below zero
pub fn compute_quote(
    subtotal: i64,
    delivery_method: DeliveryMethod,
    region: Region,
    shipping: &ShippingSettings,
    discount: i64,
) -> CheckoutQuote {
    let free_shipping = subtotal >= shipping.free_shipping_threshold;

    let base_shipping = if free_shipping {
        0
    } else {
        match delivery_method {
            DeliveryMethod::Home => shipping.home_base_fee,
            DeliveryMethod::Locker => shipping.locker_base_fee,
        }
    };

    let island_surcharge = if region.is_outlying_islands()
        && delivery_method == DeliveryMethod::Home
        && !free_shipping
    {
        shipping.outlying_island_surcharge
    } else {
        0
    };

    let shipping_total = base_shipping + island_surcharge;
    let total = (subtotal + shipping_total - discount).max(0);

    CheckoutQuote {
        subtotal,
        base_shipping,
        island_surcharge,
        shipping_total,
        discount,
        total,
        free_shipping,
    }
}
