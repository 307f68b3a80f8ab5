use crate::models::movie::{Movie, MovieRequest, MovieUpdateRequest};
use crate::services::movie_service::MovieService;
use crate::utils::error::AppError;
use crate::utils::jwt::AdminUser;
use rocket::serde::json::Json;
use rocket::serde::json::{json, Value};
use rocket::State;
use rocket_okapi::openapi;

/// List all movies
#[openapi(tag = "Movies")]
#[get("/movies")]
pub async fn get_movies(
    movie_service: &State<MovieService>,
) -> Result<Json<Vec<Movie>>, AppError> {
    let movies = movie_service.get_movies().await?;
    Ok(Json(movies))
}

/// Get a movie by id
#[openapi(tag = "Movies")]
#[get("/movies/<id>")]
pub async fn get_movie_by_id(
    id: i32,
    movie_service: &State<MovieService>,
) -> Result<Json<Movie>, AppError> {
    let movie = movie_service.get_movie_by_id(id).await?;
    Ok(Json(movie))
}

/// Create a movie (admin)
#[openapi(tag = "Movies")]
#[post("/movies", format = "json", data = "<request>")]
pub async fn create_movie(
    request: Json<MovieRequest>,
    _admin: AdminUser,
    movie_service: &State<MovieService>,
) -> Result<Json<Movie>, AppError> {
    let movie = movie_service.create_movie(request.into_inner()).await?;
    Ok(Json(movie))
}

/// Update a movie (admin)
#[openapi(tag = "Movies")]
#[put("/movies/<id>", format = "json", data = "<request>")]
pub async fn update_movie(
    id: i32,
    request: Json<MovieUpdateRequest>,
    _admin: AdminUser,
    movie_service: &State<MovieService>,
) -> Result<Json<Movie>, AppError> {
    let movie = movie_service.update_movie(id, request.into_inner()).await?;
    Ok(Json(movie))
}

/// Delete a movie (admin)
#[openapi(tag = "Movies")]
#[delete("/movies/<id>")]
pub async fn delete_movie(
    id: i32,
    _admin: AdminUser,
    movie_service: &State<MovieService>,
) -> Result<Json<Value>, AppError> {
    movie_service.delete_movie(id).await?;
    Ok(Json(json!({ "message": "Movie deleted successfully" })))
}
