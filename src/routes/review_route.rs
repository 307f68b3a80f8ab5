use crate::models::review::{Review, ReviewRequest, ReviewUpdateRequest};
use crate::services::review_service::ReviewService;
use crate::utils::error::AppError;
use crate::utils::jwt::AuthenticatedUser;
use rocket::serde::json::Json;
use rocket::serde::json::{json, Value};
use rocket::State;
use rocket_okapi::openapi;

/// Reviews for a movie, newest first
#[openapi(tag = "Reviews")]
#[get("/reviews/movie/<movie_id>")]
pub async fn get_movie_reviews(
    movie_id: i32,
    review_service: &State<ReviewService>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = review_service.get_movie_reviews(movie_id).await?;
    Ok(Json(reviews))
}

/// Add a review; also refreshes the movie's derived rating
#[openapi(tag = "Reviews")]
#[post("/reviews", format = "json", data = "<request>")]
pub async fn add_review(
    request: Json<ReviewRequest>,
    auth: AuthenticatedUser,
    review_service: &State<ReviewService>,
) -> Result<Json<Review>, AppError> {
    let review = review_service
        .add_review(auth.user_id, request.into_inner())
        .await?;
    Ok(Json(review))
}

/// Update the caller's review
#[openapi(tag = "Reviews")]
#[put("/reviews/<id>", format = "json", data = "<request>")]
pub async fn update_review(
    id: i32,
    request: Json<ReviewUpdateRequest>,
    auth: AuthenticatedUser,
    review_service: &State<ReviewService>,
) -> Result<Json<Review>, AppError> {
    let review = review_service
        .update_review(id, auth.user_id, request.into_inner())
        .await?;
    Ok(Json(review))
}

/// Delete the caller's review
#[openapi(tag = "Reviews")]
#[delete("/reviews/<id>")]
pub async fn delete_review(
    id: i32,
    auth: AuthenticatedUser,
    review_service: &State<ReviewService>,
) -> Result<Json<Value>, AppError> {
    review_service.delete_review(id, auth.user_id).await?;
    Ok(Json(json!({ "message": "Review deleted successfully" })))
}
