use hmac::{Hmac, Mac};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sha2::{Digest, Sha256, Sha512};
use sqlx::MySqlPool;
use std::env;

use crate::models::booking::PaymentStatus;
use crate::models::payment::{
    CheckoutCallbackRequest, CheckoutHashRequest, CheckoutHashResponse, CreateOrderRequest,
    OrderResponse, VerifyPaymentRequest, VerifyPaymentResponse,
};
use crate::services::booking_service::BookingService;
use crate::utils::error::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Gateway credentials; absent in development, which switches the
/// service into mock mode like the source deployment.
#[derive(Clone)]
pub struct PaymentConfig {
    pub key_id: Option<String>,
    pub secret: Option<String>,
}

impl PaymentConfig {
    pub fn from_env() -> Self {
        PaymentConfig {
            key_id: env::var("PAYMENT_KEY_ID").ok(),
            secret: env::var("PAYMENT_SECRET").ok(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.key_id.is_some() && self.secret.is_some()
    }
}

/// Convert a major-unit price into the gateway's minor units (paise).
pub fn amount_in_minor_units(total: Decimal) -> AppResult<i64> {
    (total * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| AppError::ValidationError("amount out of range".into()))
}

/// HMAC-SHA256 over `order_id|payment_id`, hex-encoded, as the gateway
/// signs its checkout callbacks.
pub fn sign_order(secret: &str, order_id: &str, payment_id: &str) -> AppResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::VerificationFailed("invalid payment secret".into()))?;
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Recompute the signature server-side and compare constant-time.
pub fn verify_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> AppResult<()> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::VerificationFailed("invalid payment secret".into()))?;
    mac.update(format!("{}|{}", order_id, payment_id).as_bytes());

    let provided = hex::decode(signature)
        .map_err(|_| AppError::VerificationFailed("Payment verification failed".into()))?;
    mac.verify_slice(&provided)
        .map_err(|_| AppError::VerificationFailed("Payment verification failed".into()))?;

    Ok(())
}

/// SHA-512 request hash for the hosted-checkout gateway: the pipe-joined
/// field sequence with five unused udf slots and six reserved slots
/// before the salt.
pub fn checkout_request_hash(key: &str, salt: &str, request: &CheckoutHashRequest) -> String {
    let fields = [
        key,
        request.txnid.as_str(),
        request.amount.as_str(),
        request.productinfo.as_str(),
        request.firstname.as_str(),
        request.email.as_str(),
        "", "", "", "", "", // udf1..udf5
        "", "", "", "", "", "", // reserved
        salt,
    ];

    let mut hasher = Sha512::new();
    hasher.update(fields.join("|").as_bytes());
    hex::encode(hasher.finalize())
}

pub struct PaymentService {
    pool: MySqlPool,
    booking_service: BookingService,
    config: PaymentConfig,
}

impl PaymentService {
    pub fn new(pool: MySqlPool) -> Self {
        PaymentService {
            booking_service: BookingService::new(pool.clone()),
            config: PaymentConfig::from_env(),
            pool,
        }
    }

    pub async fn create_order(&self, request: CreateOrderRequest) -> AppResult<OrderResponse> {
        let booking = self
            .booking_service
            .fetch_record(request.booking_id)
            .await?;

        if let Some(amount) = request.amount {
            if amount != booking.total_price {
                return Err(AppError::ValidationError(
                    "amount does not match the booking total".into(),
                ));
            }
        }

        let amount = amount_in_minor_units(booking.total_price)?;
        let mock = !self.config.is_configured();
        let order_id = if mock {
            format!("mock_order_{}_{:08x}", booking.booking_id, rand::random::<u32>())
        } else {
            format!("order_{}_{:08x}", booking.booking_id, rand::random::<u32>())
        };
        if mock {
            log::info!(
                "payment gateway not configured, issuing mock order {} for booking {}",
                order_id,
                booking.booking_id
            );
        }

        Ok(OrderResponse {
            order_id,
            amount,
            currency: "INR".to_string(),
            mock,
        })
    }

    pub async fn verify_payment(
        &self,
        request: VerifyPaymentRequest,
    ) -> AppResult<VerifyPaymentResponse> {
        let booking = self
            .booking_service
            .fetch_record(request.booking_id)
            .await?;

        // Replayed confirmations must not settle, or credit, twice.
        if booking.payment_status == PaymentStatus::Completed {
            return Err(AppError::AlreadyPaid("Booking is already paid".into()));
        }

        let bypass = request.mock || !self.config.is_configured();
        if !bypass {
            let (order_id, payment_id, signature) = match (
                &request.order_id,
                &request.payment_id,
                &request.signature,
            ) {
                (Some(order_id), Some(payment_id), Some(signature)) => {
                    (order_id, payment_id, signature)
                }
                _ => {
                    return Err(AppError::ValidationError(
                        "Missing gateway payment details".into(),
                    ))
                }
            };

            let secret = self
                .config
                .secret
                .as_deref()
                .ok_or_else(|| AppError::VerificationFailed("gateway secret missing".into()))?;
            verify_signature(secret, order_id, payment_id, signature)?;
        }

        let payment_id = request
            .payment_id
            .unwrap_or_else(|| format!("mock_payment_{:08x}", rand::random::<u32>()));
        self.booking_service
            .claim_completed(booking.booking_id, &payment_id)
            .await?;
        self.booking_service
            .send_confirmation(booking.booking_id)
            .await;

        Ok(VerifyPaymentResponse {
            message: "Payment verified successfully".to_string(),
            success: true,
            mock: bypass,
        })
    }

    /// Request-leg hash for the hosted checkout form.
    pub async fn generate_checkout_hash(
        &self,
        request: CheckoutHashRequest,
    ) -> AppResult<CheckoutHashResponse> {
        let (key, salt) = match (&self.config.key_id, &self.config.secret) {
            (Some(key), Some(salt)) => (key.clone(), salt.clone()),
            _ => {
                return Err(AppError::ValidationError(
                    "Payment gateway is not configured".into(),
                ))
            }
        };

        let hash = checkout_request_hash(&key, &salt, &request);
        Ok(CheckoutHashResponse { key, hash })
    }

    /// Redirect callback from the hosted checkout; converges on the same
    /// booking transitions as the verify endpoint.
    pub async fn handle_checkout_callback(
        &self,
        request: CheckoutCallbackRequest,
    ) -> AppResult<VerifyPaymentResponse> {
        let booking = self
            .booking_service
            .fetch_record(request.booking_id)
            .await?;

        if request.status == "success" {
            if booking.payment_status == PaymentStatus::Completed {
                return Err(AppError::AlreadyPaid("Booking is already paid".into()));
            }
            let payment_id = request
                .mihpayid
                .unwrap_or_else(|| format!("payu_{:08x}", rand::random::<u32>()));
            self.booking_service
                .claim_completed(booking.booking_id, &payment_id)
                .await?;
            self.booking_service
                .send_confirmation(booking.booking_id)
                .await;

            Ok(VerifyPaymentResponse {
                message: "Payment verified successfully".to_string(),
                success: true,
                mock: false,
            })
        } else {
            sqlx::query(
                "UPDATE booking SET payment_status = 'failed'
                 WHERE booking_id = ? AND payment_status = 'pending'",
            )
            .bind(booking.booking_id)
            .execute(&self.pool)
            .await?;

            Ok(VerifyPaymentResponse {
                message: "Payment failed".to_string(),
                success: false,
                mock: false,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_round_trips() {
        let signature = sign_order("secret", "order_1", "pay_1").unwrap();
        assert!(verify_signature("secret", "order_1", "pay_1", &signature).is_ok());
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let signature = sign_order("secret", "order_1", "pay_1").unwrap();

        // Flip the first hex digit.
        let mut tampered = signature.clone();
        let flipped = if tampered.starts_with('0') { "1" } else { "0" };
        tampered.replace_range(0..1, flipped);

        assert!(matches!(
            verify_signature("secret", "order_1", "pay_1", &tampered),
            Err(AppError::VerificationFailed(_))
        ));
        assert!(matches!(
            verify_signature("other_secret", "order_1", "pay_1", &signature),
            Err(AppError::VerificationFailed(_))
        ));
        assert!(matches!(
            verify_signature("secret", "order_1", "pay_2", &signature),
            Err(AppError::VerificationFailed(_))
        ));
    }

    #[test]
    fn non_hex_signature_is_rejected() {
        assert!(matches!(
            verify_signature("secret", "order_1", "pay_1", "not-hex!"),
            Err(AppError::VerificationFailed(_))
        ));
    }

    #[test]
    fn minor_units_round_half_up() {
        assert_eq!(amount_in_minor_units(Decimal::new(400, 0)).unwrap(), 40000);
        assert_eq!(amount_in_minor_units(Decimal::new(19999, 2)).unwrap(), 19999);
        // midpoint rounds away from zero: 199.995 -> 20000
        assert_eq!(
            amount_in_minor_units(Decimal::new(199995, 3)).unwrap(),
            20000
        );
    }

    #[test]
    fn checkout_hash_is_deterministic_and_salt_sensitive() {
        let request = CheckoutHashRequest {
            txnid: "42".to_string(),
            amount: "400.00".to_string(),
            productinfo: "tickets".to_string(),
            firstname: "Asha".to_string(),
            email: "asha@example.com".to_string(),
        };

        let first = checkout_request_hash("key", "salt", &request);
        let second = checkout_request_hash("key", "salt", &request);
        let other_salt = checkout_request_hash("key", "pepper", &request);

        assert_eq!(first, second);
        assert_ne!(first, other_salt);
        assert_eq!(first.len(), 128, "SHA-512 hex digest");
    }
}
