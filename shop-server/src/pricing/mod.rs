//! Checkout pricing
//!
//! 纯函数计费：报价端点和下单落库共用同一套计算，
//! 顾客看到的数字和订单上持久化的数字不可能分叉。

mod calculator;


pub use calculator::{CheckoutQuote, compute_quote};
