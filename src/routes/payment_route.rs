use crate::models::payment::{
    CheckoutCallbackRequest, CheckoutHashRequest, CheckoutHashResponse, CreateOrderRequest,
    OrderResponse, VerifyPaymentRequest, VerifyPaymentResponse,
};
use crate::services::payment_service::PaymentService;
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedUser;
use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;

/// Create a gateway order for a booking's total
#[openapi(tag = "Payment")]
#[post("/payment/create-order", format = "json", data = "<request>")]
pub async fn create_order(
    request: Json<CreateOrderRequest>,
    _auth: AuthenticatedUser,
    payment_service: &State<PaymentService>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = payment_service.create_order(request.into_inner()).await?;
    Ok(Json(order))
}

/// Verify a gateway payment signature and settle the booking
#[openapi(tag = "Payment")]
#[post("/payment/verify", format = "json", data = "<request>")]
pub async fn verify_payment(
    request: Json<VerifyPaymentRequest>,
    _auth: AuthenticatedUser,
    payment_service: &State<PaymentService>,
) -> Result<Json<VerifyPaymentResponse>, AppError> {
    let response = payment_service.verify_payment(request.into_inner()).await?;
    Ok(Json(response))
}

/// Request hash for the hosted checkout form
#[openapi(tag = "Payment")]
#[post("/payment/hash", format = "json", data = "<request>")]
pub async fn generate_checkout_hash(
    request: Json<CheckoutHashRequest>,
    _auth: AuthenticatedUser,
    payment_service: &State<PaymentService>,
) -> Result<Json<CheckoutHashResponse>, AppError> {
    let response = payment_service
        .generate_checkout_hash(request.into_inner())
        .await?;
    Ok(Json(response))
}

/// Hosted-checkout redirect callback; unauthenticated by design since
/// the gateway posts it directly
#[openapi(tag = "Payment")]
#[post("/payment/response", format = "json", data = "<request>")]
pub async fn checkout_callback(
    request: Json<CheckoutCallbackRequest>,
    payment_service: &State<PaymentService>,
) -> Result<Json<VerifyPaymentResponse>, AppError> {
    let response = payment_service
        .handle_checkout_callback(request.into_inner())
        .await?;
    Ok(Json(response))
}
