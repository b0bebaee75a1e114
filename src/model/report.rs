//! Results of one-off status queries.

use crate::model::{OrderId, OrderItem};

/// Items of one order that are not ready yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItems {
    pub order: OrderId,
    pub items: Vec<OrderItem>,
}

/// Answer to a status request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    /// The user asked about all orders but tracks none.
    NothingTracked,
    /// The single requested order could not be queried.
    Unavailable(OrderId),
    /// Pending items of the single requested order.
    Order(PendingItems),
    /// Pending items of every tracked order that could be queried, in list order.
    Tracked(Vec<PendingItems>),
}
