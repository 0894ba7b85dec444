//! Field change detection
//!
//! Pure comparison of current field values against their last-synced
//! markers. This compare is the engine's sole de-duplication guard: once
//! a value has been sent and its marker updated, every later evaluation
//! of the same value detects no change, whichever trigger asks.

use shared::models::{Order, SyncField};

/// Whether a single field is changed and not yet synced.
///
/// A field counts as changed iff its current value is non-empty AND
/// differs from its marker (absent marker compares as empty string).
pub fn field_changed(order: &Order, field: SyncField) -> bool {
    let current = order.field_value(field);
    !current.is_empty() && current != order.sync.marker(field)
}

/// The subset of `candidates` that is changed and not yet synced.
///
/// Side-effect free and idempotent; safe to call on every order mutation.
pub fn changed_fields(order: &Order, candidates: &[SyncField]) -> Vec<SyncField> {
    candidates
        .iter()
        .copied()
        .filter(|field| field_changed(order, *field))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::SyncField;
    use shared::util::now_millis;

    fn order_with(customer: &str, marker: Option<&str>) -> Order {
        let mut order = Order::new(1, "1000", now_millis());
        order.invoice_id = "INV1".into();
        order.member_id = "M1".into();
        order.customer_number = customer.into();
        if let Some(m) = marker {
            order.sync.set_marker(SyncField::CustomerNumber, m);
        }
        order
    }

    #[test]
    fn test_empty_value_is_never_changed() {
        let order = order_with("", None);
        assert!(!field_changed(&order, SyncField::CustomerNumber));
    }

    #[test]
    fn test_new_value_with_absent_marker_is_changed() {
        let order = order_with("C42", None);
        assert!(field_changed(&order, SyncField::CustomerNumber));
    }

    #[test]
    fn test_marker_equality_suppresses_change() {
        let order = order_with("C42", Some("C42"));
        assert!(!field_changed(&order, SyncField::CustomerNumber));
    }

    #[test]
    fn test_marker_mismatch_is_changed() {
        let order = order_with("C43", Some("C42"));
        assert!(field_changed(&order, SyncField::CustomerNumber));
    }

    #[test]
    fn test_detect_is_idempotent() {
        let mut order = order_with("C42", None);
        order.kid_number = "0042".into();

        let first = changed_fields(&order, &SyncField::ALL);
        let second = changed_fields(&order, &SyncField::ALL);
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![SyncField::CustomerNumber, SyncField::KidNumber]
        );
    }

    #[test]
    fn test_detect_after_marker_update_is_empty() {
        let mut order = order_with("C42", None);
        assert_eq!(
            changed_fields(&order, &SyncField::ALL),
            vec![SyncField::CustomerNumber]
        );

        // Simulates the marker write a successful send performs
        order.sync.set_marker(SyncField::CustomerNumber, "C42");
        assert!(changed_fields(&order, &SyncField::ALL).is_empty());
    }

    #[test]
    fn test_candidate_restriction() {
        let mut order = order_with("C42", None);
        order.kid_number = "0042".into();
        assert_eq!(
            changed_fields(&order, &[SyncField::KidNumber]),
            vec![SyncField::KidNumber]
        );
    }
}
