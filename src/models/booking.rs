use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use strum_macros::{Display, EnumString};
use validator::Validate;

use crate::models::movie::MovieSummary;
use crate::models::theatre::{SeatCoord, TheatreSummary};
use crate::models::user::UserSummary;

/// Hours before showtime after which a booking can no longer be cancelled.
pub const CANCELLATION_CUTOFF_HOURS: i64 = 2;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    JsonSchema,
    sqlx::Type,
    Display,
    EnumString,
)]
#[sqlx(type_name = "ENUM", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    /// The booking state machine: pending -> completed | failed | cancelled,
    /// completed -> cancelled. Nothing leaves cancelled or failed.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Completed)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Pending, PaymentStatus::Cancelled)
                | (PaymentStatus::Completed, PaymentStatus::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMethod {
    Wallet,
    Gateway,
}

/// True while the booking may still be cancelled: at least the cutoff
/// remains before showtime.
pub fn within_cancellation_window(showtime: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    showtime - now >= Duration::hours(CANCELLATION_CUTOFF_HOURS)
}

#[derive(Debug, sqlx::FromRow)]
pub struct BookingRecord {
    pub booking_id: i32,
    pub user_id: i32,
    pub movie_id: i32,
    pub theatre_id: i32,
    pub show_id: String,
    pub seats: Json<Vec<SeatCoord>>,
    pub total_price: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_id: String,
    pub booking_time: DateTime<Utc>,
    pub showtime: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Booking {
    pub booking_id: i32,
    pub user_id: i32,
    pub movie_id: i32,
    pub theatre_id: i32,
    pub show_id: String,
    pub seats: Vec<SeatCoord>,
    pub total_price: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_id: String,
    pub booking_time: DateTime<Utc>,
    pub showtime: DateTime<Utc>,
}

impl From<BookingRecord> for Booking {
    fn from(record: BookingRecord) -> Self {
        Booking {
            booking_id: record.booking_id,
            user_id: record.user_id,
            movie_id: record.movie_id,
            theatre_id: record.theatre_id,
            show_id: record.show_id,
            seats: record.seats.0,
            total_price: record.total_price,
            payment_status: record.payment_status,
            payment_id: record.payment_id,
            booking_time: record.booking_time,
            showtime: record.showtime,
        }
    }
}

/// A booking joined with movie/theatre summaries (and the owning user on
/// admin reads), mirroring what list pages need in one response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub movie: Option<MovieSummary>,
    pub theatre: Option<TheatreSummary>,
    pub user: Option<UserSummary>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema, Validate)]
pub struct CreateBookingRequest {
    pub movie_id: i32,
    pub theatre_id: i32,
    pub show_id: String,
    #[validate(length(min = 1, message = "at least one seat must be selected"))]
    pub seats: Vec<SeatCoord>,
    /// Client-echoed total, verified against the server-computed price.
    pub total_price: Option<Decimal>,
    /// Client-echoed showtime; the authoritative snapshot is taken from
    /// the show itself at creation time.
    pub showtime: Option<DateTime<Utc>>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_complete_fail_or_cancel() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Completed));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Failed));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Cancelled));
    }

    #[test]
    fn completed_can_only_cancel() {
        assert!(PaymentStatus::Completed.can_transition_to(PaymentStatus::Cancelled));
        assert!(!PaymentStatus::Completed.can_transition_to(PaymentStatus::Completed));
        assert!(!PaymentStatus::Completed.can_transition_to(PaymentStatus::Failed));
        assert!(!PaymentStatus::Completed.can_transition_to(PaymentStatus::Pending));
    }

    #[test]
    fn cancelled_and_failed_are_terminal() {
        for next in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Cancelled,
        ] {
            assert!(!PaymentStatus::Cancelled.can_transition_to(next));
            assert!(!PaymentStatus::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn cancellation_window_closes_two_hours_before_showtime() {
        let now = Utc::now();

        assert!(within_cancellation_window(now + Duration::hours(3), now));
        assert!(within_cancellation_window(now + Duration::hours(2), now));
        assert!(!within_cancellation_window(
            now + Duration::hours(2) - Duration::seconds(1),
            now
        ));
        assert!(!within_cancellation_window(now - Duration::hours(1), now));
    }

    #[test]
    fn payment_status_round_trips_through_strings() {
        assert_eq!(PaymentStatus::Pending.to_string(), "pending");
        assert_eq!(
            "completed".parse::<PaymentStatus>().unwrap(),
            PaymentStatus::Completed
        );
        assert!("unknown".parse::<PaymentStatus>().is_err());
    }
}
