//! Identity of an externally tracked order and the items it contains.
//!
//! # Wire Format
//! [`OrderItem`] deserializes directly from the order-status endpoint, which
//! reports one object per product:
//!
//! ```json
//! { "productDefinitionName": "Lahmacun", "foodCourtProductionStateText": "Hazırlanıyor" }
//! ```

use crate::model::UserId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders.
///
/// Kept as the text the user typed; ordering is lexicographic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies at most one active tracker at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackingKey {
    pub user: UserId,
    pub order: OrderId,
}

impl TrackingKey {
    pub fn new(user: UserId, order: OrderId) -> Self {
        Self { user, order }
    }
}

impl Display for TrackingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user, self.order)
    }
}

/// One product line of an order as reported by the order source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "productDefinitionName")]
    pub product: String,
    #[serde(rename = "foodCourtProductionStateText")]
    pub status: String,
}

impl OrderItem {
    pub fn new(product: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            status: status.into(),
        }
    }
}
