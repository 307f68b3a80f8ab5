use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateOrderRequest {
    pub booking_id: i32,
    /// Client-echoed amount in major units; verified against the booking.
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct OrderResponse {
    pub order_id: String,
    /// Amount in minor currency units (paise).
    pub amount: i64,
    pub currency: String,
    pub mock: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VerifyPaymentRequest {
    pub booking_id: i32,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub signature: Option<String>,
    #[serde(default)]
    pub mock: bool,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct VerifyPaymentResponse {
    pub message: String,
    pub success: bool,
    pub mock: bool,
}

/// Fields the gateway hashes on the request leg of a hosted checkout.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CheckoutHashRequest {
    pub txnid: String,
    pub amount: String,
    pub productinfo: String,
    pub firstname: String,
    pub email: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CheckoutHashResponse {
    pub key: String,
    pub hash: String,
}

/// Gateway redirect callback after a hosted checkout attempt.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CheckoutCallbackRequest {
    pub booking_id: i32,
    pub status: String,
    pub mihpayid: Option<String>,
}
