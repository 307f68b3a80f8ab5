use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::MySqlPool;
use validator::Validate;

use crate::models::booking::{
    within_cancellation_window, Booking, BookingDetails, BookingRecord, CreateBookingRequest,
    PaymentMethod, PaymentStatus, UpdatePaymentRequest,
};
use crate::models::movie::MovieSummary;
use crate::models::theatre::{SeatCoord, TheatreSummary, MAX_SEAT_INDEX};
use crate::models::user::UserSummary;
use crate::services::theatre_service::TheatreService;
use crate::services::user_service::UserService;
use crate::utils::email::Mailer;
use crate::utils::error::{AppError, AppResult};

#[derive(Clone)]
pub struct BookingService {
    pool: MySqlPool,
    theatre_service: TheatreService,
    user_service: UserService,
    mailer: Mailer,
}

impl BookingService {
    pub fn new(pool: MySqlPool) -> Self {
        BookingService {
            theatre_service: TheatreService::new(pool.clone()),
            user_service: UserService::new(pool.clone()),
            mailer: Mailer::from_env(),
            pool,
        }
    }

    pub async fn create_booking(
        &self,
        user_id: i32,
        request: CreateBookingRequest,
    ) -> AppResult<Booking> {
        request
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        validate_seat_coords(&request.seats)?;

        // The total is computed from the show's price, never taken from
        // the client; an echoed total that disagrees is rejected.
        let show = self
            .theatre_service
            .get_show(request.theatre_id, &request.show_id)
            .await?;
        let total_price = show.price * Decimal::from(request.seats.len() as u64);
        if let Some(client_total) = request.total_price {
            if client_total != total_price {
                return Err(AppError::ValidationError(
                    "totalPrice does not match seats and show price".into(),
                ));
            }
        }

        // All-or-nothing seat reservation; a conflict means no booking
        // row is ever inserted.
        let reserved = self
            .theatre_service
            .reserve_seats(request.theatre_id, &request.show_id, &request.seats)
            .await?;

        // movie_id and showtime are denormalized from the same show
        // snapshot the seats were reserved against.
        let insert = sqlx::query(
            "INSERT INTO booking
             (user_id, movie_id, theatre_id, show_id, seats, total_price, payment_status, showtime)
             VALUES (?, ?, ?, ?, ?, ?, 'pending', ?)",
        )
        .bind(user_id)
        .bind(reserved.movie_id)
        .bind(request.theatre_id)
        .bind(&request.show_id)
        .bind(Json(&request.seats))
        .bind(total_price)
        .bind(reserved.showtime)
        .execute(&self.pool)
        .await;
        let booking_id = match insert {
            Ok(result) => result.last_insert_id() as i32,
            Err(err) => {
                // Never leave reserved seats behind a booking that was
                // never written.
                self.theatre_service
                    .release_seats(request.theatre_id, &request.show_id, &request.seats)
                    .await?;
                return Err(err.into());
            }
        };

        if request.payment_method == Some(PaymentMethod::Wallet) {
            self.settle_wallet_at_creation(booking_id, user_id, total_price, &request)
                .await?;
        }

        let record = self.fetch_record(booking_id).await?;
        Ok(Booking::from(record))
    }

    // Wallet checkout requested together with the booking: debit and
    // complete in the same logical operation, or unwind the reservation.
    async fn settle_wallet_at_creation(
        &self,
        booking_id: i32,
        user_id: i32,
        total_price: Decimal,
        request: &CreateBookingRequest,
    ) -> AppResult<()> {
        match self.user_service.debit_wallet(user_id, total_price).await {
            Ok(()) => {
                let payment_id = format!("wallet_{:08x}", rand::random::<u32>());
                self.claim_completed(booking_id, &payment_id).await?;
                self.send_confirmation(booking_id).await;
                Ok(())
            }
            Err(err) => {
                log::warn!(
                    "wallet debit failed for booking {}: {}, releasing seats",
                    booking_id,
                    err
                );
                self.theatre_service
                    .release_seats(request.theatre_id, &request.show_id, &request.seats)
                    .await?;
                sqlx::query(
                    "UPDATE booking SET payment_status = 'failed'
                     WHERE booking_id = ? AND payment_status = 'pending'",
                )
                .bind(booking_id)
                .execute(&self.pool)
                .await?;
                Err(err)
            }
        }
    }

    pub async fn cancel_booking(
        &self,
        booking_id: i32,
        requester_id: i32,
        is_admin: bool,
    ) -> AppResult<()> {
        let booking = self.fetch_record(booking_id).await?;

        if booking.user_id != requester_id && !is_admin {
            return Err(AppError::Forbidden("Not authorized".into()));
        }
        if booking.payment_status == PaymentStatus::Cancelled {
            return Err(AppError::BadRequest("Booking is already cancelled".into()));
        }
        if !within_cancellation_window(booking.showtime, Utc::now()) {
            return Err(AppError::TooLate(
                "Bookings can only be cancelled up to 2 hours before showtime".into(),
            ));
        }

        // Claim the transition first so seats and wallet are touched at
        // most once even under a double-click race.
        let claimed = sqlx::query(
            "UPDATE booking SET payment_status = 'cancelled'
             WHERE booking_id = ? AND payment_status IN ('pending', 'completed')",
        )
        .bind(booking_id)
        .execute(&self.pool)
        .await?;
        if claimed.rows_affected() == 0 {
            return Err(AppError::BadRequest("Booking cannot be cancelled".into()));
        }

        self.theatre_service
            .release_seats(booking.theatre_id, &booking.show_id, &booking.seats.0)
            .await?;

        // Refund only captured payments; a pending booking holds no funds.
        if booking.payment_status == PaymentStatus::Completed {
            self.user_service
                .credit_wallet(booking.user_id, booking.total_price)
                .await?;
            log::info!(
                "refunded {} to user {} wallet for booking {}",
                booking.total_price,
                booking.user_id,
                booking_id
            );
        }

        Ok(())
    }

    pub async fn update_payment_status(
        &self,
        booking_id: i32,
        requester_id: i32,
        is_admin: bool,
        request: UpdatePaymentRequest,
    ) -> AppResult<Booking> {
        let booking = self.fetch_record(booking_id).await?;
        if booking.user_id != requester_id && !is_admin {
            return Err(AppError::Forbidden("Not authorized".into()));
        }

        match request.payment_status {
            PaymentStatus::Completed => {
                if booking.payment_status == PaymentStatus::Completed {
                    return Err(AppError::AlreadyPaid("Booking is already paid".into()));
                }
                if !booking
                    .payment_status
                    .can_transition_to(PaymentStatus::Completed)
                {
                    return Err(AppError::BadRequest(format!(
                        "Cannot complete payment for a {} booking",
                        booking.payment_status
                    )));
                }

                let wallet = request.payment_method == Some(PaymentMethod::Wallet);
                if wallet {
                    self.user_service
                        .debit_wallet(booking.user_id, booking.total_price)
                        .await?;
                }

                let payment_id = request
                    .payment_id
                    .unwrap_or_else(|| format!("wallet_{:08x}", rand::random::<u32>()));
                if let Err(err) = self.claim_completed(booking_id, &payment_id).await {
                    // The debit went through but another request won the
                    // transition; give the money back.
                    if wallet {
                        self.user_service
                            .credit_wallet(booking.user_id, booking.total_price)
                            .await?;
                    }
                    return Err(err);
                }

                self.send_confirmation(booking_id).await;
            }
            PaymentStatus::Failed => {
                let updated = sqlx::query(
                    "UPDATE booking SET payment_status = 'failed'
                     WHERE booking_id = ? AND payment_status = 'pending'",
                )
                .bind(booking_id)
                .execute(&self.pool)
                .await?;
                if updated.rows_affected() == 0 {
                    return Err(AppError::BadRequest(format!(
                        "Cannot fail payment for a {} booking",
                        booking.payment_status
                    )));
                }
            }
            PaymentStatus::Cancelled => {
                return Err(AppError::BadRequest(
                    "Use the cancel endpoint to cancel a booking".into(),
                ));
            }
            PaymentStatus::Pending => {
                return Err(AppError::BadRequest(
                    "A booking cannot be moved back to pending".into(),
                ));
            }
        }

        Ok(Booking::from(self.fetch_record(booking_id).await?))
    }

    /// Move pending -> completed exactly once. A replay, or a race lost
    /// to another settlement, gets `AlreadyPaid`.
    pub async fn claim_completed(&self, booking_id: i32, payment_id: &str) -> AppResult<()> {
        let updated = sqlx::query(
            "UPDATE booking SET payment_status = 'completed', payment_id = ?
             WHERE booking_id = ? AND payment_status = 'pending'",
        )
        .bind(payment_id)
        .bind(booking_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::AlreadyPaid(
                "Payment has already been settled for this booking".into(),
            ));
        }

        Ok(())
    }

    /// Best-effort confirmation email; never affects the caller's result.
    pub async fn send_confirmation(&self, booking_id: i32) {
        match self.get_booking_details(booking_id).await {
            Ok(details) => self.mailer.send_booking_confirmation(&details),
            Err(err) => log::warn!(
                "could not load booking {} for confirmation email: {}",
                booking_id,
                err
            ),
        }
    }

    pub async fn fetch_record(&self, booking_id: i32) -> AppResult<BookingRecord> {
        sqlx::query_as::<_, BookingRecord>(
            "SELECT booking_id, user_id, movie_id, theatre_id, show_id, seats, total_price,
                    payment_status, payment_id, booking_time, showtime
             FROM booking WHERE booking_id = ?",
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".into()))
    }

    pub async fn get_booking_details(&self, booking_id: i32) -> AppResult<BookingDetails> {
        let row = sqlx::query_as::<_, BookingJoinRow>(&format!(
            "{} WHERE b.booking_id = ?",
            BOOKING_JOIN_SELECT
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".into()))?;

        Ok(row.into())
    }

    pub async fn get_booking_for(
        &self,
        booking_id: i32,
        requester_id: i32,
        is_admin: bool,
    ) -> AppResult<BookingDetails> {
        let details = self.get_booking_details(booking_id).await?;
        if details.booking.user_id != requester_id && !is_admin {
            return Err(AppError::Forbidden("Not authorized".into()));
        }

        Ok(details)
    }

    pub async fn get_my_bookings(&self, user_id: i32) -> AppResult<Vec<BookingDetails>> {
        let rows = sqlx::query_as::<_, BookingJoinRow>(&format!(
            "{} WHERE b.user_id = ? ORDER BY b.booking_time DESC",
            BOOKING_JOIN_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BookingDetails::from).collect())
    }

    pub async fn get_all_bookings(&self) -> AppResult<Vec<BookingDetails>> {
        let rows = sqlx::query_as::<_, BookingJoinRow>(&format!(
            "{} ORDER BY b.booking_time DESC",
            BOOKING_JOIN_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BookingDetails::from).collect())
    }
}

fn validate_seat_coords(seats: &[SeatCoord]) -> AppResult<()> {
    for &(row, col) in seats {
        if row >= MAX_SEAT_INDEX || col >= MAX_SEAT_INDEX {
            return Err(AppError::ValidationError(
                "seat coordinate out of range".into(),
            ));
        }
    }
    Ok(())
}

const BOOKING_JOIN_SELECT: &str =
    "SELECT b.booking_id, b.user_id, b.movie_id, b.theatre_id, b.show_id, b.seats,
            b.total_price, b.payment_status, b.payment_id, b.booking_time, b.showtime,
            m.title AS movie_title, m.poster AS movie_poster,
            t.name AS theatre_name, t.location AS theatre_location,
            u.name AS user_name, u.email AS user_email
     FROM booking b
     LEFT JOIN movie m ON m.movie_id = b.movie_id
     LEFT JOIN theatre t ON t.theatre_id = b.theatre_id
     LEFT JOIN user u ON u.id = b.user_id";

#[derive(Debug, sqlx::FromRow)]
struct BookingJoinRow {
    booking_id: i32,
    user_id: i32,
    movie_id: i32,
    theatre_id: i32,
    show_id: String,
    seats: Json<Vec<SeatCoord>>,
    total_price: Decimal,
    payment_status: PaymentStatus,
    payment_id: String,
    booking_time: chrono::DateTime<Utc>,
    showtime: chrono::DateTime<Utc>,
    movie_title: Option<String>,
    movie_poster: Option<String>,
    theatre_name: Option<String>,
    theatre_location: Option<String>,
    user_name: Option<String>,
    user_email: Option<String>,
}

impl From<BookingJoinRow> for BookingDetails {
    fn from(row: BookingJoinRow) -> Self {
        let movie = match (row.movie_title, row.movie_poster) {
            (Some(title), Some(poster)) => Some(MovieSummary {
                movie_id: row.movie_id,
                title,
                poster,
            }),
            _ => None,
        };
        let theatre = match (row.theatre_name, row.theatre_location) {
            (Some(name), Some(location)) => Some(TheatreSummary {
                theatre_id: row.theatre_id,
                name,
                location,
            }),
            _ => None,
        };
        let user = match (row.user_name, row.user_email) {
            (Some(name), Some(email)) => Some(UserSummary {
                id: row.user_id,
                name,
                email,
            }),
            _ => None,
        };

        BookingDetails {
            booking: Booking {
                booking_id: row.booking_id,
                user_id: row.user_id,
                movie_id: row.movie_id,
                theatre_id: row.theatre_id,
                show_id: row.show_id,
                seats: row.seats.0,
                total_price: row.total_price,
                payment_status: row.payment_status,
                payment_id: row.payment_id,
                booking_time: row.booking_time,
                showtime: row.showtime,
            },
            movie,
            theatre,
            user,
        }
    }
}
