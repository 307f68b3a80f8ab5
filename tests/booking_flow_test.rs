use std::sync::Arc;

use chrono::{Duration, Utc};
use movie_booking_system::models::booking::{within_cancellation_window, PaymentStatus};
use movie_booking_system::models::theatre::SeatGrid;
use movie_booking_system::services::payment_service::{
    amount_in_minor_units, sign_order, verify_signature,
};
use movie_booking_system::utils::error::AppError;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

// The Grand-1 walkthrough: a 2x2 show at price 200, booking two seats,
// paying, then cancelling before the cutoff.
#[test]
fn booking_and_cancellation_walkthrough() {
    let price = Decimal::new(200, 0);
    let seats = vec![(0, 0), (0, 1)];
    let mut grid = SeatGrid::with_dimensions(2, 2);

    // Reserve and price server-side
    grid.reserve(&seats).unwrap();
    let total_price = price * Decimal::from(seats.len() as u64);
    assert_eq!(total_price, Decimal::new(400, 0));
    assert_eq!(grid.0, vec![vec![true, true], vec![false, false]]);

    // Payment capture is a legal transition, and only once
    let status = PaymentStatus::Pending;
    assert!(status.can_transition_to(PaymentStatus::Completed));
    let status = PaymentStatus::Completed;
    assert!(!status.can_transition_to(PaymentStatus::Completed));

    // Pre-cutoff cancellation releases every seat and refunds the total
    let now = Utc::now();
    assert!(within_cancellation_window(now + Duration::hours(5), now));
    assert!(status.can_transition_to(PaymentStatus::Cancelled));
    grid.release(&seats);
    assert_eq!(grid.0, vec![vec![false, false], vec![false, false]]);

    // A second cancel has nothing left to transition
    assert!(!PaymentStatus::Cancelled.can_transition_to(PaymentStatus::Cancelled));
}

#[test]
fn identical_rebooking_fails_without_mutating_the_grid() {
    let seats = vec![(0, 0), (0, 1)];
    let mut grid = SeatGrid::with_dimensions(2, 2);
    grid.reserve(&seats).unwrap();
    let occupied = grid.clone();

    let err = grid.reserve(&seats).unwrap_err();
    assert!(matches!(err, AppError::SeatConflict(_)));
    assert_eq!(grid, occupied);
}

#[test]
fn cancellation_is_rejected_inside_the_cutoff() {
    let now = Utc::now();
    assert!(!within_cancellation_window(now + Duration::minutes(90), now));
}

// Many concurrent attempts for one seat: exactly one booking wins. The
// mutex stands in for the per-theatre compare-and-swap, which serializes
// writers the same way.
#[tokio::test]
async fn concurrent_reservations_admit_exactly_one_winner() {
    let grid = Arc::new(Mutex::new(SeatGrid::default()));
    let mut join_set = JoinSet::new();

    for _ in 0..10 {
        let grid = grid.clone();
        join_set.spawn(async move {
            let mut grid = grid.lock().await;
            grid.reserve(&[(0, 0), (0, 1)]).is_ok()
        });
    }

    let mut successful_bookings = 0;
    while let Some(result) = join_set.join_next().await {
        if result.unwrap() {
            successful_bookings += 1;
        }
    }

    assert_eq!(successful_bookings, 1, "Only one booking should succeed");
    let grid = grid.lock().await;
    assert!(grid.is_booked(0, 0));
    assert!(grid.is_booked(0, 1));
}

#[test]
fn gateway_settlement_verifies_the_signature_before_trusting_it() {
    let order_id = "order_42_deadbeef";
    let payment_id = "pay_91";
    let signature = sign_order("server-secret", order_id, payment_id).unwrap();

    assert!(verify_signature("server-secret", order_id, payment_id, &signature).is_ok());
    assert!(matches!(
        verify_signature("server-secret", order_id, "pay_92", &signature),
        Err(AppError::VerificationFailed(_))
    ));

    // Order amount is quoted in minor units
    assert_eq!(
        amount_in_minor_units(Decimal::new(400, 0)).unwrap(),
        40000
    );
}
