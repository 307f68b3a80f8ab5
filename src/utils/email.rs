use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::env;

use crate::models::booking::BookingDetails;

#[derive(Clone)]
struct SmtpConfig {
    server: String,
    username: String,
    password: String,
}

/// Best-effort booking confirmation mailer. Skips silently when SMTP is
/// not configured; delivery failures are logged, never surfaced.
#[derive(Clone)]
pub struct Mailer {
    config: Option<SmtpConfig>,
}

impl Mailer {
    pub fn from_env() -> Self {
        let config = match (env::var("EMAIL_USER"), env::var("EMAIL_PASS")) {
            (Ok(username), Ok(password)) => Some(SmtpConfig {
                server: env::var("SMTP_SERVER").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
                username,
                password,
            }),
            _ => None,
        };

        Mailer { config }
    }

    /// Fire-and-forget confirmation email for a completed booking.
    pub fn send_booking_confirmation(&self, details: &BookingDetails) {
        let Some(config) = self.config.clone() else {
            log::info!(
                "email not configured, skipping confirmation for booking {}",
                details.booking.booking_id
            );
            return;
        };
        let Some(user) = &details.user else {
            log::warn!(
                "no user on booking {}, skipping confirmation",
                details.booking.booking_id
            );
            return;
        };

        let movie_title = details
            .movie
            .as_ref()
            .map(|m| m.title.clone())
            .unwrap_or_else(|| "your movie".to_string());
        let theatre_line = details
            .theatre
            .as_ref()
            .map(|t| format!("{} ({})", t.name, t.location))
            .unwrap_or_else(|| "the theatre".to_string());
        let seats = details
            .booking
            .seats
            .iter()
            .map(|(row, col)| format!("Row {}, Seat {}", row + 1, col + 1))
            .collect::<Vec<_>>()
            .join(", ");

        let body = format!(
            "Dear {},\n\n\
             Your ticket booking has been confirmed!\n\n\
             Movie: {}\n\
             Theatre: {}\n\
             Showtime: {}\n\
             Seats: {}\n\
             Total Amount: {}\n\
             Booking ID: {}\n\n\
             Enjoy your movie!",
            user.name,
            movie_title,
            theatre_line,
            details.booking.showtime,
            seats,
            details.booking.total_price,
            details.booking.booking_id,
        );

        let message = Message::builder()
            .from(match config.username.parse() {
                Ok(mailbox) => mailbox,
                Err(e) => {
                    log::warn!("invalid sender address {}: {}", config.username, e);
                    return;
                }
            })
            .to(match user.email.parse() {
                Ok(mailbox) => mailbox,
                Err(e) => {
                    log::warn!("invalid recipient address {}: {}", user.email, e);
                    return;
                }
            })
            .subject("Your Ticket Confirmation")
            .header(ContentType::TEXT_PLAIN)
            .body(body);

        let message = match message {
            Ok(message) => message,
            Err(e) => {
                log::warn!("failed to build confirmation email: {}", e);
                return;
            }
        };

        let booking_id = details.booking.booking_id;
        let _ = tokio::task::spawn_blocking(move || {
            let transport = match SmtpTransport::relay(&config.server) {
                Ok(builder) => builder
                    .credentials(Credentials::new(config.username, config.password))
                    .build(),
                Err(e) => {
                    log::warn!("failed to connect to SMTP relay: {}", e);
                    return;
                }
            };

            match transport.send(&message) {
                Ok(_) => log::info!("confirmation email sent for booking {}", booking_id),
                Err(e) => log::warn!(
                    "failed to send confirmation email for booking {}: {}",
                    booking_id,
                    e
                ),
            }
        });
    }
}
