//! Point-in-time order state and the set of statuses that count as "ready".

use crate::model::OrderItem;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Canonical status an absent product is assumed to have reached.
pub const DELIVERED_STATUS: &str = "Teslim Edildi";

/// Status variants the order source uses for "ready for pickup" and "delivered".
pub const DEFAULT_READY_STATUSES: [&str; 4] = [
    "Teslime Hazır",
    "Teslime hazır",
    "Teslim Edildi",
    "Teslim edildi",
];

/// Complete mapping of product name to status text for one order.
///
/// Backed by a `BTreeMap`, so iteration is always in product-name order.
/// A snapshot is never edited; each poll builds a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSnapshot {
    items: BTreeMap<String, String>,
}

impl StatusSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from the order source's item list.
    ///
    /// Product names are unique within an order; if the source repeats one,
    /// the last reported status wins.
    pub fn from_items(items: &[OrderItem]) -> Self {
        let mut map = BTreeMap::new();
        for item in items {
            if let Some(previous) = map.insert(item.product.clone(), item.status.clone()) {
                debug!(product = %item.product, %previous, "Duplicate product in order");
            }
        }
        Self { items: map }
    }

    pub fn get(&self, product: &str) -> Option<&str> {
        self.items.get(product).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `(product, status)` pairs in product-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().map(|(p, s)| (p.as_str(), s.as_str()))
    }
}

impl<P: Into<String>, S: Into<String>> FromIterator<(P, S)> for StatusSnapshot {
    fn from_iter<I: IntoIterator<Item = (P, S)>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(|(p, s)| (p.into(), s.into())).collect(),
        }
    }
}

/// The fixed set of statuses considered terminal for a product.
///
/// Matching ignores surrounding whitespace and letter case, so "Teslime Hazır"
/// and "Teslime hazır" are the same status. Built once from configuration and
/// shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadySet {
    statuses: HashSet<String>,
    delivered: String,
}

impl ReadySet {
    /// Creates a set from the given statuses.
    ///
    /// `delivered` is the status synthesized for products that disappear from
    /// an order; it is always part of the set.
    pub fn new<I, S>(statuses: I, delivered: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let delivered = delivered.into();
        let mut normalized: HashSet<String> =
            statuses.into_iter().map(|s| normalize(s.as_ref())).collect();
        normalized.insert(normalize(&delivered));
        Self {
            statuses: normalized,
            delivered,
        }
    }

    pub fn contains(&self, status: &str) -> bool {
        self.statuses.contains(&normalize(status))
    }

    /// The status an absent product is assumed to have.
    pub fn delivered(&self) -> &str {
        &self.delivered
    }

    /// True when the snapshot has items and every one of them is ready.
    pub fn all_ready(&self, snapshot: &StatusSnapshot) -> bool {
        !snapshot.is_empty() && snapshot.iter().all(|(_, status)| self.contains(status))
    }
}

impl Default for ReadySet {
    fn default() -> Self {
        Self::new(DEFAULT_READY_STATUSES, DELIVERED_STATUS)
    }
}

fn normalize(status: &str) -> String {
    status.trim().to_lowercase()
}
