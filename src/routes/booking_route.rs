use crate::models::booking::{Booking, BookingDetails, CreateBookingRequest, UpdatePaymentRequest};
use crate::services::booking_service::BookingService;
use crate::utils::error::AppError;
use crate::utils::jwt::{AdminUser, AuthenticatedUser};
use rocket::serde::json::Json;
use rocket::serde::json::{json, Value};
use rocket::State;
use rocket_okapi::openapi;

/// Book seats for a show; seats are reserved atomically with creation
#[openapi(tag = "Bookings")]
#[post("/bookings", format = "json", data = "<request>")]
pub async fn create_booking(
    request: Json<CreateBookingRequest>,
    auth: AuthenticatedUser,
    booking_service: &State<BookingService>,
) -> Result<Json<Booking>, AppError> {
    let booking = booking_service
        .create_booking(auth.user_id, request.into_inner())
        .await?;
    Ok(Json(booking))
}

/// The caller's bookings, newest first
#[openapi(tag = "Bookings")]
#[get("/bookings/mybookings")]
pub async fn get_my_bookings(
    auth: AuthenticatedUser,
    booking_service: &State<BookingService>,
) -> Result<Json<Vec<BookingDetails>>, AppError> {
    let bookings = booking_service.get_my_bookings(auth.user_id).await?;
    Ok(Json(bookings))
}

/// All bookings (admin)
#[openapi(tag = "Bookings")]
#[get("/bookings")]
pub async fn get_all_bookings(
    _admin: AdminUser,
    booking_service: &State<BookingService>,
) -> Result<Json<Vec<BookingDetails>>, AppError> {
    let bookings = booking_service.get_all_bookings().await?;
    Ok(Json(bookings))
}

/// Get a booking by id (owner or admin)
#[openapi(tag = "Bookings")]
#[get("/bookings/<id>")]
pub async fn get_booking_by_id(
    id: i32,
    auth: AuthenticatedUser,
    booking_service: &State<BookingService>,
) -> Result<Json<BookingDetails>, AppError> {
    let booking = booking_service
        .get_booking_for(id, auth.user_id, auth.is_admin())
        .await?;
    Ok(Json(booking))
}

/// Settle or fail the booking's payment
#[openapi(tag = "Bookings")]
#[put("/bookings/<id>/payment", format = "json", data = "<request>")]
pub async fn update_payment_status(
    id: i32,
    request: Json<UpdatePaymentRequest>,
    auth: AuthenticatedUser,
    booking_service: &State<BookingService>,
) -> Result<Json<Booking>, AppError> {
    let booking = booking_service
        .update_payment_status(id, auth.user_id, auth.is_admin(), request.into_inner())
        .await?;
    Ok(Json(booking))
}

/// Cancel a booking, releasing seats and refunding captured payments
#[openapi(tag = "Bookings")]
#[put("/bookings/<id>/cancel")]
pub async fn cancel_booking(
    id: i32,
    auth: AuthenticatedUser,
    booking_service: &State<BookingService>,
) -> Result<Json<Value>, AppError> {
    booking_service
        .cancel_booking(id, auth.user_id, auth.is_admin())
        .await?;
    Ok(Json(json!({ "message": "Booking cancelled successfully" })))
}
