pub mod booking_route;
pub mod movie_route;
pub mod payment_route;
pub mod review_route;
pub mod theatre_route;
pub mod user_route;
