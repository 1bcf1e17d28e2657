//! Order creation and read aggregation.

mod pricing;
mod service;

pub use service::OrderService;
