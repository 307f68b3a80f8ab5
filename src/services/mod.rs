pub mod booking_service;
pub mod movie_service;
pub mod payment_service;
pub mod review_service;
pub mod theatre_service;
pub mod user_service;
