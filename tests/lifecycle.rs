use axum_food_delivery_api::domain::{DeliveryStatus, OrderStatus, PaymentStatus};
use axum_food_delivery_api::services::order_service::{line_total, order_total};
use rust_decimal_macros::dec;

#[test]
fn order_chain_moves_one_step_at_a_time() {
    assert!(OrderStatus::Pending.can_transition(OrderStatus::Confirmed));
    assert!(OrderStatus::Confirmed.can_transition(OrderStatus::Preparing));
    assert!(OrderStatus::Preparing.can_transition(OrderStatus::ReadyForPickup));
    assert!(OrderStatus::ReadyForPickup.can_transition(OrderStatus::OutForDelivery));
    assert!(OrderStatus::OutForDelivery.can_transition(OrderStatus::Delivered));

    // Skipping steps is illegal.
    assert!(!OrderStatus::Pending.can_transition(OrderStatus::Delivered));
    assert!(!OrderStatus::Pending.can_transition(OrderStatus::Preparing));
    assert!(!OrderStatus::Delivered.can_transition(OrderStatus::Pending));
}

#[test]
fn order_cancellation_blocked_only_after_delivery() {
    for status in [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::ReadyForPickup,
        OrderStatus::OutForDelivery,
    ] {
        assert!(status.can_transition(OrderStatus::Cancelled), "{status:?}");
    }
    assert!(!OrderStatus::Delivered.can_transition(OrderStatus::Cancelled));
    assert!(!OrderStatus::Cancelled.can_transition(OrderStatus::Cancelled));
    assert!(!OrderStatus::Refunded.can_transition(OrderStatus::Cancelled));
}

#[test]
fn order_refund_only_from_terminal_states() {
    assert!(OrderStatus::Delivered.can_transition(OrderStatus::Refunded));
    assert!(OrderStatus::Cancelled.can_transition(OrderStatus::Refunded));
    assert!(!OrderStatus::Pending.can_transition(OrderStatus::Refunded));
    assert!(!OrderStatus::Refunded.can_transition(OrderStatus::Refunded));
}

#[test]
fn illegal_order_transition_is_a_conflict() {
    let err = OrderStatus::Pending
        .ensure_transition(OrderStatus::Delivered)
        .unwrap_err();
    assert!(err.to_string().contains("Conflict"));
}

#[test]
fn delivery_chain_and_absorbing_states() {
    assert!(DeliveryStatus::Pending.can_transition(DeliveryStatus::Assigned));
    assert!(DeliveryStatus::Assigned.can_transition(DeliveryStatus::PickedUp));
    assert!(DeliveryStatus::PickedUp.can_transition(DeliveryStatus::OutForDelivery));
    assert!(DeliveryStatus::OutForDelivery.can_transition(DeliveryStatus::Delivered));

    assert!(!DeliveryStatus::Pending.can_transition(DeliveryStatus::Delivered));
    assert!(!DeliveryStatus::Delivered.can_transition(DeliveryStatus::Cancelled));
    assert!(!DeliveryStatus::Cancelled.can_transition(DeliveryStatus::Assigned));

    // Couriers can fail a run they already hold, but a queued delivery
    // cannot fail before anyone touched it.
    assert!(DeliveryStatus::PickedUp.can_transition(DeliveryStatus::Failed));
    assert!(!DeliveryStatus::Pending.can_transition(DeliveryStatus::Failed));
}

#[test]
fn payment_lifecycle_edges() {
    assert!(PaymentStatus::Pending.can_transition(PaymentStatus::Processing));
    assert!(PaymentStatus::Processing.can_transition(PaymentStatus::Completed));
    assert!(PaymentStatus::Processing.can_transition(PaymentStatus::Failed));
    // Gateway "requires action" sends a processing payment back to pending.
    assert!(PaymentStatus::Processing.can_transition(PaymentStatus::Pending));
    // Cash confirmation completes a pending payment directly.
    assert!(PaymentStatus::Pending.can_transition(PaymentStatus::Completed));
    // Expiry sweep.
    assert!(PaymentStatus::Pending.can_transition(PaymentStatus::Cancelled));

    assert!(PaymentStatus::Completed.can_transition(PaymentStatus::Refunded));
    assert!(PaymentStatus::Completed.can_transition(PaymentStatus::PartiallyRefunded));

    assert!(!PaymentStatus::Failed.can_transition(PaymentStatus::Completed));
    assert!(!PaymentStatus::Refunded.can_transition(PaymentStatus::Completed));
    assert!(!PaymentStatus::Pending.can_transition(PaymentStatus::Refunded));
}

#[test]
fn line_total_is_unit_price_times_quantity() {
    assert_eq!(line_total(dec!(5.00), 2), dec!(10.00));
    assert_eq!(line_total(dec!(3.50), 1), dec!(3.50));
    assert_eq!(line_total(dec!(0.99), 3), dec!(2.97));
}

#[test]
fn order_total_sums_line_totals() {
    let lines = [(dec!(5.00), 2), (dec!(3.50), 1)];
    assert_eq!(order_total(&lines), dec!(13.50));

    assert_eq!(order_total(&[]), dec!(0));
}
