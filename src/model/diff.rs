//! # Status Diff
//!
//! Compares two snapshots of the same order and decides what the user should
//! hear about.
//!
//! ## Rules
//!
//! 1. A product present in `current` whose status changed (or which is new) and
//!    whose new status is ready produces [`StatusEvent::ItemReady`].
//! 2. A product present in `previous` but missing from `current` is treated as
//!    if it now carried [`ReadySet::delivered`]. If that differs from its old
//!    status it produces [`StatusEvent::ItemReady`] as well.
//! 3. [`StatusEvent::OrderComplete`] follows when every product, after folding
//!    in the synthesized statuses, is ready. An empty `current` counts as
//!    complete.
//!
//! `ItemReady` events come out in product-name order and `OrderComplete`, if
//! any, is always last.
//!
//! Missing products are assumed delivered even though the source might also
//! drop a product that was removed from the order. The two cases cannot be
//! told apart from the data we get.

use crate::model::{ReadySet, StatusSnapshot};
use std::collections::BTreeMap;

/// Something about an order worth notifying the user of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    /// The named product became ready since the previous snapshot.
    ItemReady(String),
    /// Every product of the order is ready.
    OrderComplete,
}

/// Computes the events between two consecutive snapshots.
///
/// Pure and deterministic: equal inputs always produce equal output.
pub fn diff(previous: &StatusSnapshot, current: &StatusSnapshot, ready: &ReadySet) -> Vec<StatusEvent> {
    let mut folded: BTreeMap<&str, &str> = current.iter().collect();
    for (product, _) in previous.iter() {
        folded.entry(product).or_insert(ready.delivered());
    }

    let mut events: Vec<StatusEvent> = folded
        .iter()
        .filter(|(product, status)| {
            previous.get(product) != Some(**status) && ready.contains(status)
        })
        .map(|(product, _)| StatusEvent::ItemReady(product.to_string()))
        .collect();

    if folded.values().all(|status| ready.contains(status)) {
        events.push(StatusEvent::OrderComplete);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(pairs: &[(&str, &str)]) -> StatusSnapshot {
        pairs.iter().copied().collect()
    }

    fn ready(product: &str) -> StatusEvent {
        StatusEvent::ItemReady(product.to_string())
    }

    #[test]
    fn test_single_item_becomes_ready_and_completes() {
        let events = diff(
            &snap(&[("A", "Hazırlanıyor")]),
            &snap(&[("A", "Teslime Hazır")]),
            &ReadySet::default(),
        );
        assert_eq!(events, vec![ready("A"), StatusEvent::OrderComplete]);
    }

    #[test]
    fn test_absent_product_is_treated_as_delivered() {
        let events = diff(
            &snap(&[("A", "Hazırlanıyor"), ("B", "Hazırlanıyor")]),
            &snap(&[("A", "Teslime Hazır")]),
            &ReadySet::default(),
        );
        assert_eq!(events, vec![ready("A"), ready("B"), StatusEvent::OrderComplete]);
    }

    #[test]
    fn test_identical_snapshots_yield_nothing() {
        let pending = snap(&[("A", "Hazırlanıyor"), ("B", "Teslime Hazır")]);
        assert!(diff(&pending, &pending, &ReadySet::default()).is_empty());
    }

    #[test]
    fn test_identical_all_ready_snapshots_only_complete() {
        let done = snap(&[("A", "Teslime Hazır"), ("B", "Teslim Edildi")]);
        assert_eq!(
            diff(&done, &done, &ReadySet::default()),
            vec![StatusEvent::OrderComplete]
        );
    }

    #[test]
    fn test_ready_to_delivered_notifies_again() {
        let events = diff(
            &snap(&[("A", "Teslime Hazır"), ("B", "Hazırlanıyor")]),
            &snap(&[("A", "Teslim Edildi"), ("B", "Hazırlanıyor")]),
            &ReadySet::default(),
        );
        assert_eq!(events, vec![ready("A")]);
    }

    #[test]
    fn test_absent_product_already_delivered_is_silent() {
        let events = diff(
            &snap(&[("A", "Teslim Edildi"), ("B", "Hazırlanıyor")]),
            &snap(&[("B", "Hazırlanıyor")]),
            &ReadySet::default(),
        );
        assert!(events.is_empty());
    }

    #[test]
    fn test_new_product_ready_on_arrival() {
        let events = diff(
            &snap(&[("A", "Hazırlanıyor")]),
            &snap(&[("A", "Hazırlanıyor"), ("B", "Teslime hazır")]),
            &ReadySet::default(),
        );
        assert_eq!(events, vec![ready("B")]);
    }

    #[test]
    fn test_empty_current_completes_order() {
        let events = diff(&StatusSnapshot::new(), &StatusSnapshot::new(), &ReadySet::default());
        assert_eq!(events, vec![StatusEvent::OrderComplete]);
    }

    #[test]
    fn test_events_sorted_by_product() {
        let events = diff(
            &snap(&[("Zeytin", "Hazırlanıyor"), ("Ayran", "Hazırlanıyor"), ("Kola", "Hazırlanıyor")]),
            &snap(&[("Zeytin", "Teslime Hazır"), ("Ayran", "Teslime Hazır"), ("Kola", "Hazırlanıyor")]),
            &ReadySet::default(),
        );
        assert_eq!(events, vec![ready("Ayran"), ready("Zeytin")]);
    }
}
